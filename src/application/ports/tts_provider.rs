//! TTS Provider Port - 第三方语音服务抽象
//!
//! 定义合成、文件上传、文件内容下载和音色克隆四个远程调用，
//! 具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::voice::{AudioSample, VoiceId};

/// 服务商调用错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// 可重试：超时、连接中断、5xx、限流
    #[error("Transient provider error: {0}")]
    Transient(String),

    /// 不可重试：鉴权失败、参数校验失败等 4xx
    #[error("Permanent provider error: {0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }

    /// 按 HTTP 状态码分类
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {}: {}", status, truncate(body, 512));
        match status {
            408 | 429 | 500..=599 => ProviderError::Transient(message),
            _ => ProviderError::Permanent(message),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// 服务商原始响应（仅 2xx）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ProviderResponse {
    pub fn new(content_type: Option<String>, body: Vec<u8>) -> Self {
        Self { content_type, body }
    }

    pub fn json(value: &Value) -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            body: value.to_string().into_bytes(),
        }
    }

    pub fn audio(body: Vec<u8>) -> Self {
        Self {
            content_type: Some("audio/mpeg".to_string()),
            body,
        }
    }
}

/// TTS Provider Port
#[async_trait]
pub trait TtsProviderPort: Send + Sync {
    /// 文本合成
    async fn synthesize(&self, text: &str, voice_id: &VoiceId)
        -> Result<ProviderResponse, ProviderError>;

    /// 下载文件内容（用于合成响应只给出文件引用的情况）
    async fn fetch_file_content(&self, file_ref: &str) -> Result<ProviderResponse, ProviderError>;

    /// 上传样本文件，返回原始 JSON（不同版本的接口字段名不一致，由调用方解析）
    async fn upload_file(&self, sample: &AudioSample, purpose: &str)
        -> Result<Value, ProviderError>;

    /// 用已上传的文件创建克隆音色
    async fn create_clone(&self, voice_id: &VoiceId, file_ref: &str)
        -> Result<Value, ProviderError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
