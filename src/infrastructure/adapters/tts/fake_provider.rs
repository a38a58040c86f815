//! Fake TTS Provider - 用于测试的脚本化服务商
//!
//! 按调用顺序返回预先写入的响应，不发起任何网络请求。
//! 脚本耗尽后返回 Permanent 错误

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::ports::{ProviderError, ProviderResponse, TtsProviderPort};
use crate::domain::voice::{AudioSample, VoiceId};

/// 生成带 ID3 头的伪 MP3 数据
pub fn fake_mp3(len: usize) -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00".to_vec();
    data.resize(len.max(data.len()), 0x55);
    data
}

type Script<T> = Mutex<VecDeque<Result<T, ProviderError>>>;

/// Fake TTS Provider
#[derive(Default)]
pub struct FakeTtsProvider {
    synthesis: Script<ProviderResponse>,
    file_content: Script<ProviderResponse>,
    uploads: Script<Value>,
    clones: Script<Value>,
    synthesize_calls: Mutex<Vec<String>>,
    file_content_calls: Mutex<Vec<String>>,
    upload_calls: Mutex<Vec<String>>,
    clone_calls: Mutex<Vec<(String, String)>>,
}

impl FakeTtsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_synthesis(self, result: Result<ProviderResponse, ProviderError>) -> Self {
        push(&self.synthesis, result);
        self
    }

    pub fn push_file_content(self, result: Result<ProviderResponse, ProviderError>) -> Self {
        push(&self.file_content, result);
        self
    }

    pub fn push_upload(self, result: Result<Value, ProviderError>) -> Self {
        push(&self.uploads, result);
        self
    }

    pub fn push_clone(self, result: Result<Value, ProviderError>) -> Self {
        push(&self.clones, result);
        self
    }

    /// 每次合成调用使用的音色 ID
    pub fn synthesize_calls(&self) -> Vec<String> {
        snapshot(&self.synthesize_calls)
    }

    pub fn file_content_calls(&self) -> Vec<String> {
        snapshot(&self.file_content_calls)
    }

    /// 每次上传的文件名
    pub fn upload_calls(&self) -> Vec<String> {
        snapshot(&self.upload_calls)
    }

    /// (voice_id, file_ref)
    pub fn clone_calls(&self) -> Vec<(String, String)> {
        snapshot(&self.clone_calls)
    }
}

fn push<T>(script: &Script<T>, result: Result<T, ProviderError>) {
    if let Ok(mut queue) = script.lock() {
        queue.push_back(result);
    }
}

fn next<T>(script: &Script<T>, operation: &str) -> Result<T, ProviderError> {
    script
        .lock()
        .ok()
        .and_then(|mut queue| queue.pop_front())
        .unwrap_or_else(|| {
            Err(ProviderError::Permanent(format!(
                "no scripted response for {}",
                operation
            )))
        })
}

fn record<T>(calls: &Mutex<Vec<T>>, call: T) {
    if let Ok(mut calls) = calls.lock() {
        calls.push(call);
    }
}

fn snapshot<T: Clone>(calls: &Mutex<Vec<T>>) -> Vec<T> {
    calls.lock().map(|c| c.clone()).unwrap_or_default()
}

#[async_trait]
impl TtsProviderPort for FakeTtsProvider {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &VoiceId,
    ) -> Result<ProviderResponse, ProviderError> {
        tracing::debug!(voice_id = %voice_id, text_len = text.len(), "FakeTtsProvider: synthesize");
        record(&self.synthesize_calls, voice_id.to_string());
        next(&self.synthesis, "synthesize")
    }

    async fn fetch_file_content(&self, file_ref: &str) -> Result<ProviderResponse, ProviderError> {
        record(&self.file_content_calls, file_ref.to_string());
        next(&self.file_content, "fetch_file_content")
    }

    async fn upload_file(&self, sample: &AudioSample, _purpose: &str) -> Result<Value, ProviderError> {
        record(&self.upload_calls, sample.file_name().to_string());
        next(&self.uploads, "upload_file")
    }

    async fn create_clone(&self, voice_id: &VoiceId, file_ref: &str) -> Result<Value, ProviderError> {
        record(
            &self.clone_calls,
            (voice_id.to_string(), file_ref.to_string()),
        );
        next(&self.clones, "create_clone")
    }
}
