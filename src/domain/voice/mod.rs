//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色身份（内置 / 服务商克隆 / 本地占位）
//! - 克隆注册记录
//! - 上传样本的校验

mod aggregate;
mod errors;
mod registration;
mod value_objects;

pub use aggregate::VoiceIdentity;
pub use errors::VoiceError;
pub use registration::{
    content_type_for_file, AudioSample, CloneRegistration, SampleState, SampleStatus,
};
pub use value_objects::{VoiceId, VoiceName, VoiceOrigin, CLONE_ID_PREFIX};
