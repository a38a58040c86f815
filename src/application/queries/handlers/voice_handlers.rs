//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::VoiceStorePort;
use crate::application::queries::{GetVoiceConfig, ListVoices};
use crate::domain::voice::{VoiceId, VoiceIdentity, VoiceOrigin};

// ============================================================================
// Response DTOs
// ============================================================================

/// 音色摘要
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSummary {
    pub voice_id: String,
    pub voice_name: String,
    pub origin: VoiceOrigin,
    /// 对外来源标签：system / minimax / local
    pub source: &'static str,
    /// 可用状态：system / ready / local_only
    pub status: &'static str,
    pub note: Option<String>,
    pub is_default: bool,
    pub created_at: String,
}

impl VoiceSummary {
    pub fn from_identity(voice: &VoiceIdentity, default_id: &VoiceId) -> Self {
        let (source, status) = match voice.origin() {
            VoiceOrigin::Builtin => ("system", "system"),
            VoiceOrigin::ProviderClone => ("minimax", "ready"),
            VoiceOrigin::LocalPlaceholder => ("local", "local_only"),
        };
        Self {
            voice_id: voice.id().to_string(),
            voice_name: voice.display_name().to_string(),
            origin: voice.origin(),
            source,
            status,
            note: voice.note().map(str::to_string),
            is_default: voice.id() == default_id,
            created_at: voice.created_at().to_rfc3339(),
        }
    }
}

/// 当前语音配置
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfigView {
    pub default_voice_id: String,
    /// 默认音色未登记时为 None
    pub voice: Option<VoiceSummary>,
}

/// 配置存储中的默认音色，未设置时使用配置文件中的默认值
async fn effective_default(
    voice_store: &dyn VoiceStorePort,
    configured: &VoiceId,
) -> Result<VoiceId, ApplicationError> {
    Ok(voice_store
        .default_voice_id()
        .await?
        .unwrap_or_else(|| configured.clone()))
}

// ============================================================================
// Handlers
// ============================================================================

/// ListVoices Handler
pub struct ListVoicesHandler {
    voice_store: Arc<dyn VoiceStorePort>,
    configured_default: VoiceId,
}

impl ListVoicesHandler {
    pub fn new(voice_store: Arc<dyn VoiceStorePort>, configured_default: VoiceId) -> Self {
        Self {
            voice_store,
            configured_default,
        }
    }

    /// 内置音色在前，其余按创建时间排序
    pub async fn handle(&self, _query: ListVoices) -> Result<Vec<VoiceSummary>, ApplicationError> {
        let default_id = effective_default(self.voice_store.as_ref(), &self.configured_default).await?;
        let voices = self.voice_store.find_all().await?;

        let (mut summaries, others): (Vec<_>, Vec<_>) = voices
            .iter()
            .map(|v| VoiceSummary::from_identity(v, &default_id))
            .partition(|s| s.origin == VoiceOrigin::Builtin);
        summaries.extend(others);
        Ok(summaries)
    }
}

/// GetVoiceConfig Handler
pub struct GetVoiceConfigHandler {
    voice_store: Arc<dyn VoiceStorePort>,
    configured_default: VoiceId,
}

impl GetVoiceConfigHandler {
    pub fn new(voice_store: Arc<dyn VoiceStorePort>, configured_default: VoiceId) -> Self {
        Self {
            voice_store,
            configured_default,
        }
    }

    pub async fn handle(&self, _query: GetVoiceConfig) -> Result<VoiceConfigView, ApplicationError> {
        let default_id = effective_default(self.voice_store.as_ref(), &self.configured_default).await?;
        let voice = self
            .voice_store
            .find_by_id(&default_id)
            .await?
            .map(|v| VoiceSummary::from_identity(&v, &default_id));

        Ok(VoiceConfigView {
            default_voice_id: default_id.to_string(),
            voice,
        })
    }
}
