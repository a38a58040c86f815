//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Voice Context: 音色身份与克隆注册
//! - Synthesis Context: 合成请求、降级阶梯、合成结果
//! - Payload Context: 服务商响应解码

pub mod payload;
pub mod synthesis;
pub mod voice;
