//! Voice Command Handlers
//!
//! 克隆注册、默认音色切换、克隆删除以及启动时写入内置音色

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::application::commands::{DeleteVoiceClone, RegisterVoiceClone, SetDefaultVoice};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ProviderError, RepositoryError, SampleLibraryPort, TtsProviderPort, VoiceStorePort,
};
use crate::application::retry::RetryPolicy;
use crate::domain::payload::{first_ref, provider_status};
use crate::domain::voice::{
    AudioSample, CloneRegistration, SampleState, SampleStatus, VoiceId, VoiceIdentity, VoiceName,
    VoiceOrigin,
};

/// 单次注册允许的最大样本数
pub const MAX_CLONE_SAMPLES: usize = 10;

const UPLOAD_PURPOSE: &str = "voice_clone";

/// 注册完成前占位记录的备注
const REGISTRATION_PENDING_NOTE: &str = "Clone registration in progress";

/// 上传响应中文件引用的候选路径（不同版本的接口字段名不同）
const UPLOAD_REF_PATHS: &[&[&str]] = &[
    &["file", "file_id"],
    &["data", "file_id"],
    &["file_id"],
    &["id"],
    &["data", "id"],
];

fn parse_voice_id(raw: &str) -> Result<VoiceId, ApplicationError> {
    VoiceId::new(raw).map_err(|e| ApplicationError::validation(format!("voiceId: {}", e)))
}

// ============================================================================
// RegisterVoiceClone
// ============================================================================

/// 服务商侧克隆失败的原因（不向调用方传播）
#[derive(Debug, Error)]
enum CloneFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("provider rejected request with status {code}: {message}")]
    Rejected { code: i64, message: String },

    #[error("upload response carried no file reference")]
    MissingFileRef,
}

/// RegisterVoiceClone Handler
pub struct RegisterVoiceCloneHandler {
    provider: Arc<dyn TtsProviderPort>,
    samples: Arc<dyn SampleLibraryPort>,
    voice_store: Arc<dyn VoiceStorePort>,
    retry: RetryPolicy,
}

impl RegisterVoiceCloneHandler {
    pub fn new(
        provider: Arc<dyn TtsProviderPort>,
        samples: Arc<dyn SampleLibraryPort>,
        voice_store: Arc<dyn VoiceStorePort>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            samples,
            voice_store,
            retry,
        }
    }

    /// 服务商失败时生成本地占位音色，只有参数错误和存储错误会返回 Err
    pub async fn handle(
        &self,
        command: RegisterVoiceClone,
    ) -> Result<CloneRegistration, ApplicationError> {
        if command.samples.is_empty() {
            return Err(ApplicationError::validation("At least one voice sample is required"));
        }
        if command.samples.len() > MAX_CLONE_SAMPLES {
            return Err(ApplicationError::validation(format!(
                "Too many voice samples: {} (limit {})",
                command.samples.len(),
                MAX_CLONE_SAMPLES
            )));
        }

        let now = Utc::now();
        let voice_id = VoiceId::generate_clone(now);
        let display_name = match command
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            Some(name) => name.to_string(),
            None => format!("语音克隆 {}", now.format("%Y-%m-%d")),
        };
        let display_name = VoiceName::new(display_name)
            .map_err(|e| ApplicationError::validation(format!("name: {}", e)))?;

        // 先占用 ID，写样本文件前就能发现冲突
        let reservation = VoiceIdentity::local_placeholder(
            voice_id.clone(),
            display_name.clone(),
            REGISTRATION_PENDING_NOTE,
        );
        self.voice_store.insert(&reservation).await?;

        // 本地样本是占位音色唯一的音频来源
        for (index, sample) in command.samples.iter().enumerate() {
            if let Err(e) = self.samples.save_sample(&voice_id, index, sample).await {
                tracing::warn!(
                    voice_id = %voice_id,
                    file = %sample.file_name(),
                    error = %e,
                    "Failed to keep local copy of voice sample"
                );
            }
        }

        let mut statuses: Vec<SampleStatus> = command
            .samples
            .iter()
            .map(|s| SampleStatus::pending(s.file_name()))
            .collect();

        let (voice, note) = match self
            .clone_remote(&voice_id, &command.samples, &mut statuses)
            .await
        {
            Ok(()) => {
                for status in statuses.iter_mut() {
                    status.advance(SampleState::Ready);
                }
                (VoiceIdentity::provider_clone(voice_id.clone(), display_name), None)
            }
            Err(failure) => {
                tracing::warn!(
                    voice_id = %voice_id,
                    error = %failure,
                    "Provider voice clone failed, registering local placeholder"
                );
                let note = format!(
                    "Provider clone unavailable ({}); synthesis will replay the local recording",
                    failure
                );
                (
                    VoiceIdentity::local_placeholder(voice_id.clone(), display_name, note.clone()),
                    Some(note),
                )
            }
        };

        let registration = CloneRegistration::new(voice.clone(), statuses, note, now);
        self.voice_store.update(&voice).await?;
        self.voice_store.save_registration(&registration).await?;
        if command.make_default {
            self.voice_store.set_default_voice_id(&voice_id).await?;
        }

        tracing::info!(
            voice_id = %voice_id,
            origin = voice.origin().as_str(),
            samples = registration.samples().len(),
            make_default = command.make_default,
            "Voice clone registered"
        );

        Ok(registration)
    }

    /// 逐个上传样本，第一次失败即停止，剩余样本保持 pending
    async fn clone_remote(
        &self,
        voice_id: &VoiceId,
        samples: &[AudioSample],
        statuses: &mut [SampleStatus],
    ) -> Result<(), CloneFailure> {
        for (sample, status) in samples.iter().zip(statuses.iter_mut()) {
            match self.upload(sample).await {
                Ok(file_ref) => {
                    tracing::debug!(file = %sample.file_name(), file_ref = %file_ref, "Sample uploaded");
                    status.mark_uploaded(file_ref);
                }
                Err(failure) => {
                    status.mark_upload_failed(failure.to_string());
                    return Err(failure);
                }
            }
        }

        let file_ref = statuses
            .iter()
            .find_map(|s| s.file_ref.clone())
            .ok_or(CloneFailure::MissingFileRef)?;
        for status in statuses.iter_mut() {
            status.advance(SampleState::CloneRequested);
        }

        let ack = self
            .retry
            .execute(
                "create_clone",
                || self.provider.create_clone(voice_id, &file_ref),
                ProviderError::is_retryable,
            )
            .await?;
        reject_on_status(&ack)
    }

    async fn upload(&self, sample: &AudioSample) -> Result<String, CloneFailure> {
        let response = self
            .retry
            .execute(
                "upload_file",
                || self.provider.upload_file(sample, UPLOAD_PURPOSE),
                ProviderError::is_retryable,
            )
            .await?;
        reject_on_status(&response)?;
        first_ref(&response, UPLOAD_REF_PATHS).ok_or(CloneFailure::MissingFileRef)
    }
}

fn reject_on_status(response: &Value) -> Result<(), CloneFailure> {
    match provider_status(response) {
        Some((code, message)) => Err(CloneFailure::Rejected { code, message }),
        None => Ok(()),
    }
}

// ============================================================================
// SetDefaultVoice
// ============================================================================

/// SetDefaultVoice Handler
pub struct SetDefaultVoiceHandler {
    voice_store: Arc<dyn VoiceStorePort>,
}

impl SetDefaultVoiceHandler {
    pub fn new(voice_store: Arc<dyn VoiceStorePort>) -> Self {
        Self { voice_store }
    }

    pub async fn handle(&self, command: SetDefaultVoice) -> Result<VoiceIdentity, ApplicationError> {
        let voice_id = parse_voice_id(&command.voice_id)?;

        let voice = self
            .voice_store
            .find_by_id(&voice_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", &voice_id))?;

        self.voice_store.set_default_voice_id(&voice_id).await?;

        tracing::info!(
            voice_id = %voice_id,
            name = %voice.display_name(),
            "Default voice set"
        );

        Ok(voice)
    }
}

// ============================================================================
// DeleteVoiceClone
// ============================================================================

/// 删除克隆响应
#[derive(Debug, Clone)]
pub struct DeleteVoiceCloneResponse {
    pub voice_id: VoiceId,
    /// 删除的本地样本文件数
    pub samples_removed: u64,
}

/// DeleteVoiceClone Handler
pub struct DeleteVoiceCloneHandler {
    voice_store: Arc<dyn VoiceStorePort>,
    samples: Arc<dyn SampleLibraryPort>,
}

impl DeleteVoiceCloneHandler {
    pub fn new(voice_store: Arc<dyn VoiceStorePort>, samples: Arc<dyn SampleLibraryPort>) -> Self {
        Self {
            voice_store,
            samples,
        }
    }

    pub async fn handle(
        &self,
        command: DeleteVoiceClone,
    ) -> Result<DeleteVoiceCloneResponse, ApplicationError> {
        let voice_id = parse_voice_id(&command.voice_id)?;

        let voice = self
            .voice_store
            .find_by_id(&voice_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", &voice_id))?;

        if voice.origin() == VoiceOrigin::Builtin {
            return Err(ApplicationError::business_rule(format!(
                "Builtin voice {} cannot be deleted",
                voice_id
            )));
        }
        if self.voice_store.default_voice_id().await?.as_ref() == Some(&voice_id) {
            return Err(ApplicationError::business_rule(format!(
                "Voice {} is the current default voice",
                voice_id
            )));
        }

        self.voice_store.delete(&voice_id).await?;

        let samples_removed = match self.samples.delete_samples(&voice_id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(voice_id = %voice_id, error = %e, "Failed to delete voice samples");
                0
            }
        };

        tracing::info!(
            voice_id = %voice_id,
            name = %voice.display_name(),
            samples_removed,
            "Voice clone deleted"
        );

        Ok(DeleteVoiceCloneResponse {
            voice_id,
            samples_removed,
        })
    }
}

// ============================================================================
// 内置音色
// ============================================================================

/// 把配置的内置音色写入配置存储，已存在的跳过，返回新增数量
pub async fn seed_builtin_voices(
    voice_store: &dyn VoiceStorePort,
    voices: &[(VoiceId, VoiceName)],
) -> Result<usize, ApplicationError> {
    let mut inserted = 0;
    for (id, name) in voices {
        match voice_store
            .insert(&VoiceIdentity::builtin(id.clone(), name.clone()))
            .await
        {
            Ok(()) => inserted += 1,
            Err(RepositoryError::Duplicate(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if inserted > 0 {
        tracing::info!(count = inserted, "Builtin voices seeded");
    }
    Ok(inserted)
}
