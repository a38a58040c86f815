//! Synthesis Context - 合成请求

use thiserror::Error;

use crate::domain::voice::VoiceId;

/// 请求校验错误（发生在任何网络调用之前）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthesisRequestError {
    #[error("Text is empty")]
    EmptyText,

    #[error("Text too long: {len} chars, limit {max}")]
    TextTooLong { len: usize, max: usize },

    #[error("Invalid voice id: {0}")]
    InvalidVoiceId(String),
}

/// 合成请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    text: String,
    voice_id: Option<VoiceId>,
}

impl SynthesisRequest {
    /// 校验并创建请求
    ///
    /// `max_chars` 按字符计数，中文与英文同等对待
    pub fn new(
        text: impl Into<String>,
        voice_id: Option<&str>,
        max_chars: usize,
    ) -> Result<Self, SynthesisRequestError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SynthesisRequestError::EmptyText);
        }
        let len = text.chars().count();
        if len > max_chars {
            return Err(SynthesisRequestError::TextTooLong { len, max: max_chars });
        }

        // 空字符串的 voiceId 视为未指定
        let voice_id = match voice_id.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => Some(
                VoiceId::new(raw)
                    .map_err(|e| SynthesisRequestError::InvalidVoiceId(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self { text, voice_id })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice_id(&self) -> Option<&VoiceId> {
        self.voice_id.as_ref()
    }
}
