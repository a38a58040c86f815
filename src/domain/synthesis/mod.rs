//! Synthesis Context - 语音合成限界上下文
//!
//! 职责:
//! - 合成请求校验
//! - 降级阶梯（纯状态机）
//! - 带层级标签的合成结果

pub mod ladder;
mod outcome;
mod request;

pub use ladder::{first_step, next_step, LadderPlan, LadderStep, MAX_TIERS};
pub use outcome::{SynthesisAudio, SynthesisOutcome, SynthesisTier, MPEG_CONTENT_TYPE};
pub use request::{SynthesisRequest, SynthesisRequestError};
