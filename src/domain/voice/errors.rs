//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("无效的音色 ID: {0}")]
    InvalidId(String),

    #[error("无效的音色名称: {0}")]
    InvalidName(String),

    #[error("无效的音频样本: {0}")]
    InvalidSample(String),
}
