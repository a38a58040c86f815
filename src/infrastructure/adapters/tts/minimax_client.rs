//! MiniMax Client - 调用 MiniMax 语音服务
//!
//! 实现 TtsProviderPort trait
//!
//! 外部 API（均带 `?GroupId=` 与 Bearer 鉴权）:
//! - POST {base}/v1/t2a_v2            文本合成
//! - POST {base}/v1/files/upload      上传样本（multipart: file + purpose）
//! - GET  {base}/v1/files/{id}/content 下载文件内容
//! - POST {base}/v1/voice_clone       创建克隆音色

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::SharedCredentials;
use crate::application::ports::{
    CredentialsPort, ProviderCredentials, ProviderError, ProviderResponse, TtsProviderPort,
};
use crate::domain::voice::{AudioSample, VoiceId};

/// 合成请求体
#[derive(Debug, Serialize)]
struct T2aRequest<'a> {
    model: &'a str,
    text: &'a str,
    timber_weights: [TimberWeight<'a>; 1],
    voice_setting: VoiceSetting,
    audio_setting: AudioSetting<'a>,
    language_boost: &'static str,
}

#[derive(Debug, Serialize)]
struct TimberWeight<'a> {
    voice_id: &'a str,
    weight: u32,
}

#[derive(Debug, Serialize)]
struct VoiceSetting {
    voice_id: &'static str,
    speed: f32,
    pitch: i32,
    vol: f32,
    latex_read: bool,
}

impl Default for VoiceSetting {
    fn default() -> Self {
        Self {
            voice_id: "",
            speed: 1.0,
            pitch: 0,
            vol: 1.0,
            latex_read: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct AudioSetting<'a> {
    sample_rate: u32,
    bitrate: u32,
    format: &'a str,
}

#[derive(Debug, Serialize)]
struct CloneRequest<'a> {
    voice_id: &'a str,
    file_id: &'a str,
}

/// MiniMax 客户端配置
#[derive(Debug, Clone)]
pub struct MiniMaxClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub group_id: String,
    pub model: String,
    pub sample_rate: u32,
    pub bitrate: u32,
    pub format: String,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for MiniMaxClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.minimaxi.com".to_string(),
            api_key: String::new(),
            group_id: String::new(),
            model: "speech-02-hd".to_string(),
            sample_rate: 32000,
            bitrate: 128000,
            format: "mp3".to_string(),
            timeout_secs: 60,
        }
    }
}

impl MiniMaxClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, group_id: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self.group_id = group_id.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// MiniMax 客户端
///
/// 凭据每次请求时读取，`/api/minimax/config` 更新后无需重建客户端
pub struct MiniMaxClient {
    client: Client,
    config: MiniMaxClientConfig,
    credentials: SharedCredentials,
}

impl MiniMaxClient {
    pub fn new(config: MiniMaxClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Permanent(format!("Failed to build HTTP client: {}", e)))?;
        let credentials =
            SharedCredentials::new(ProviderCredentials::new(&config.api_key, &config.group_id));

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    /// 与客户端共享的凭据句柄
    pub fn credentials(&self) -> SharedCredentials {
        self.credentials.clone()
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/v1/{}?GroupId={}",
            self.config.base_url.trim_end_matches('/'),
            path,
            self.credentials.current().group_id()
        )
    }

    /// 缺少 API Key 时不发起任何网络请求
    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ProviderError> {
        let credentials = self.credentials.current();
        if !credentials.has_api_key() {
            return Err(ProviderError::Permanent(
                "MiniMax API key is not configured".to_string(),
            ));
        }
        Ok(builder.bearer_auth(credentials.api_key()))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<ProviderResponse, ProviderError> {
        let response = builder.send().await.map_err(classify_transport_error)?;
        read_response(response).await
    }

    async fn send_json(&self, builder: RequestBuilder) -> Result<Value, ProviderError> {
        let response = self.send(builder).await?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ProviderError::Permanent(format!("Invalid JSON response: {}", e)))
    }
}

fn classify_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Transient(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        ProviderError::Transient(format!("Cannot connect to MiniMax: {}", e))
    } else if e.is_body() || e.is_request() {
        ProviderError::Transient(e.to_string())
    } else {
        ProviderError::Permanent(e.to_string())
    }
}

async fn read_response(response: Response) -> Result<ProviderResponse, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), &error_text));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .await
        .map_err(|e| ProviderError::Transient(format!("Failed to read response body: {}", e)))?
        .to_vec();

    Ok(ProviderResponse::new(content_type, body))
}

#[async_trait]
impl TtsProviderPort for MiniMaxClient {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &VoiceId,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = T2aRequest {
            model: &self.config.model,
            text,
            timber_weights: [TimberWeight {
                voice_id: voice_id.as_str(),
                weight: 100,
            }],
            voice_setting: VoiceSetting::default(),
            audio_setting: AudioSetting {
                sample_rate: self.config.sample_rate,
                bitrate: self.config.bitrate,
                format: &self.config.format,
            },
            language_boost: "auto",
        };

        tracing::debug!(
            voice_id = %voice_id,
            text_len = text.chars().count(),
            model = %self.config.model,
            "Sending MiniMax synthesis request"
        );

        let builder = self.authorized(self.client.post(self.endpoint("t2a_v2")).json(&request))?;
        let response = self.send(builder).await?;

        tracing::debug!(
            voice_id = %voice_id,
            content_type = ?response.content_type,
            size = response.body.len(),
            "MiniMax synthesis responded"
        );
        Ok(response)
    }

    async fn fetch_file_content(&self, file_ref: &str) -> Result<ProviderResponse, ProviderError> {
        let path = format!("files/{}/content", file_ref);
        tracing::debug!(file_ref, "Fetching MiniMax file content");
        let builder = self.authorized(self.client.get(self.endpoint(&path)))?;
        self.send(builder).await
    }

    async fn upload_file(
        &self,
        sample: &AudioSample,
        purpose: &str,
    ) -> Result<Value, ProviderError> {
        let part = multipart::Part::bytes(sample.data().to_vec())
            .file_name(sample.file_name().to_string())
            .mime_str(sample.content_type())
            .map_err(|e| ProviderError::Permanent(format!("Invalid content type: {}", e)))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("purpose", purpose.to_string());

        tracing::debug!(
            file_name = %sample.file_name(),
            size = sample.data().len(),
            purpose,
            "Uploading sample to MiniMax"
        );

        let builder = self.authorized(self.client.post(self.endpoint("files/upload")).multipart(form))?;
        self.send_json(builder).await
    }

    async fn create_clone(&self, voice_id: &VoiceId, file_ref: &str) -> Result<Value, ProviderError> {
        let request = CloneRequest {
            voice_id: voice_id.as_str(),
            file_id: file_ref,
        };

        tracing::debug!(voice_id = %voice_id, file_ref, "Requesting MiniMax voice clone");

        let builder = self.authorized(self.client.post(self.endpoint("voice_clone")).json(&request))?;
        self.send_json(builder).await
    }

    async fn health_check(&self) -> bool {
        self.credentials.current().has_api_key()
    }
}
