//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{ProviderConfigView, VoiceSummary};
use crate::domain::synthesis::{SynthesisAudio, SynthesisOutcome};
use crate::domain::voice::{CloneRegistration, SampleStatus};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Synthesis DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default, rename = "voiceId", alias = "voice_id")]
    pub voice_id: Option<String>,
}

/// 试听请求，音色必填
#[derive(Debug, Deserialize)]
pub struct TestVoiceRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "voiceId", alias = "voice_id")]
    pub voice_id: String,
}

/// 合成结果（前端同时读取 audioUrl 与 audio_url）
#[derive(Debug, Serialize)]
pub struct SynthesisResponse {
    pub success: bool,
    #[serde(rename = "audioUrl")]
    pub audio_url_camel: Option<String>,
    pub audio_url: Option<String>,
    pub voice_id: Option<String>,
    /// minimax / fallback / local_fallback / browser / failed
    pub source: &'static str,
    pub tier: crate::domain::synthesis::SynthesisTier,
    pub message: String,
    /// 需要客户端自行合成时的原文
    pub fallback_text: Option<String>,
}

impl From<&SynthesisOutcome> for SynthesisResponse {
    fn from(outcome: &SynthesisOutcome) -> Self {
        let audio_url = match outcome.audio() {
            Some(SynthesisAudio::Url(url)) => Some(url.clone()),
            _ => None,
        };
        Self {
            success: outcome.tier().has_audio(),
            audio_url_camel: audio_url.clone(),
            audio_url,
            voice_id: outcome.voice_id().map(|v| v.to_string()),
            source: outcome.tier().source(),
            tier: outcome.tier(),
            message: outcome
                .note()
                .map(str::to_string)
                .unwrap_or_else(|| "语音合成成功".to_string()),
            fallback_text: outcome.fallback_text().map(str::to_string),
        }
    }
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VoiceIdRequest {
    #[serde(rename = "voiceId", alias = "voice_id")]
    pub voice_id: String,
}

#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub voice_id: String,
    pub voice_name: String,
    pub origin: crate::domain::voice::VoiceOrigin,
    pub source: &'static str,
    pub status: &'static str,
    pub note: Option<String>,
    pub is_default: bool,
    pub created_at: String,
}

impl From<VoiceSummary> for VoiceResponse {
    fn from(summary: VoiceSummary) -> Self {
        Self {
            voice_id: summary.voice_id,
            voice_name: summary.voice_name,
            origin: summary.origin,
            source: summary.source,
            status: summary.status,
            note: summary.note,
            is_default: summary.is_default,
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceConfigResponse {
    pub default_voice_id: String,
    pub voice: Option<VoiceResponse>,
}

#[derive(Debug, Serialize)]
pub struct CloneRegistrationResponse {
    pub success: bool,
    pub voice_id: String,
    pub voice_name: String,
    pub origin: crate::domain::voice::VoiceOrigin,
    pub sample_file_refs: Vec<String>,
    pub samples: Vec<SampleStatus>,
    pub message: String,
    pub created_at: String,
}

impl From<CloneRegistration> for CloneRegistrationResponse {
    fn from(registration: CloneRegistration) -> Self {
        let voice = registration.voice();
        let message = registration
            .note()
            .map(str::to_string)
            .unwrap_or_else(|| "语音克隆成功".to_string());
        Self {
            success: voice.origin().is_synthesizable(),
            voice_id: voice.id().to_string(),
            voice_name: voice.display_name().to_string(),
            origin: voice.origin(),
            sample_file_refs: registration.sample_file_refs().to_vec(),
            samples: registration.samples().to_vec(),
            message,
            created_at: registration.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteVoiceResponse {
    pub voice_id: String,
    pub samples_removed: u64,
}

// ============================================================================
// Provider DTOs
// ============================================================================

/// 不实现 Debug，避免 API Key 进入日志
#[derive(Deserialize)]
pub struct ProviderConfigRequest {
    #[serde(default, rename = "apiKey", alias = "api_key")]
    pub api_key: String,
    #[serde(default, rename = "groupId", alias = "group_id")]
    pub group_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigResponse {
    pub platform: &'static str,
    pub group_id: String,
    pub api_key_masked: String,
    pub api_key_format: &'static str,
    pub has_api_key: bool,
}

impl From<ProviderConfigView> for ProviderConfigResponse {
    fn from(view: ProviderConfigView) -> Self {
        Self {
            platform: "minimax",
            group_id: view.group_id,
            api_key_masked: view.api_key_masked,
            api_key_format: view.api_key_format,
            has_api_key: view.has_api_key,
        }
    }
}
