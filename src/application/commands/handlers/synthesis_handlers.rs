//! Synthesis Command Handlers - 语音合成编排
//!
//! 按降级阶梯依次尝试：首选音色 → 内置音色 → 本地录音 → 客户端合成。
//! 调用方总是得到一个 SynthesisOutcome，不会收到错误

use std::sync::Arc;
use thiserror::Error;

use crate::application::commands::SynthesizeSpeech;
use crate::application::ports::{
    ArtifactStorePort, ProviderError, SampleLibraryPort, StorageError, StoreMode, StoredArtifact,
    TtsProviderPort, VoiceStorePort,
};
use crate::application::retry::RetryPolicy;
use crate::domain::payload::{AudioPayloadDecoder, DecodeError, DecodedPayload};
use crate::domain::synthesis::{
    first_step, next_step, LadderPlan, LadderStep, SynthesisAudio, SynthesisOutcome,
    SynthesisRequest,
};
use crate::domain::voice::VoiceId;

/// 合成相关设置
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    /// 请求与配置存储都未指定音色时使用
    pub default_voice_id: VoiceId,
    /// 首选音色失败后的兜底内置音色
    pub builtin_voice_id: VoiceId,
    pub max_text_chars: usize,
}

/// 单个层级失败的原因
#[derive(Debug, Error)]
enum TierFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("No local sample recorded for voice {0}")]
    NoLocalSample(VoiceId),
}

/// SynthesizeSpeech Handler
pub struct SynthesizeSpeechHandler {
    provider: Arc<dyn TtsProviderPort>,
    artifacts: Arc<dyn ArtifactStorePort>,
    samples: Arc<dyn SampleLibraryPort>,
    voice_store: Arc<dyn VoiceStorePort>,
    decoder: AudioPayloadDecoder,
    retry: RetryPolicy,
    settings: SynthesisSettings,
}

impl SynthesizeSpeechHandler {
    pub fn new(
        provider: Arc<dyn TtsProviderPort>,
        artifacts: Arc<dyn ArtifactStorePort>,
        samples: Arc<dyn SampleLibraryPort>,
        voice_store: Arc<dyn VoiceStorePort>,
        decoder: AudioPayloadDecoder,
        retry: RetryPolicy,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            provider,
            artifacts,
            samples,
            voice_store,
            decoder,
            retry,
            settings,
        }
    }

    pub async fn handle(&self, command: SynthesizeSpeech) -> SynthesisOutcome {
        let allow_offline_fallback = command.allow_offline_fallback;
        let request = match SynthesisRequest::new(
            command.text,
            command.voice_id.as_deref(),
            self.settings.max_text_chars,
        ) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!(error = %e, "Synthesis request rejected");
                return SynthesisOutcome::failed(e.to_string());
            }
        };

        let voice_id = self.resolve_voice_id(&request).await;
        let plan = self.plan_for(&voice_id).await;
        let text = request.text();
        let mode = command.mode;

        let mut step = first_step(&plan);
        loop {
            if !allow_offline_fallback && !step.uses_provider() {
                tracing::info!(voice_id = %voice_id, "Provider tiers failed, offline fallback disabled");
                return SynthesisOutcome::failed(format!(
                    "音色 {} 与内置音色均合成失败",
                    voice_id
                ));
            }

            let attempt = match step {
                LadderStep::AttemptPrimary => self
                    .synthesize_with(text, &voice_id, mode)
                    .await
                    .map(|audio| SynthesisOutcome::primary(audio, voice_id.clone())),
                LadderStep::AttemptBuiltinFallback => {
                    let builtin = &self.settings.builtin_voice_id;
                    self.synthesize_with(text, builtin, mode)
                        .await
                        .map(|audio| {
                            SynthesisOutcome::builtin_fallback(audio, &voice_id, builtin.clone())
                        })
                }
                LadderStep::AttemptLocalSample => self
                    .replay_local_sample(&voice_id, mode)
                    .await
                    .map(|audio| SynthesisOutcome::local_sample(audio, voice_id.clone())),
                LadderStep::ClientSideInstruction | LadderStep::Done => {
                    tracing::info!(
                        voice_id = %voice_id,
                        tier = ?step.tier(),
                        "All audio tiers failed, instructing client-side synthesis"
                    );
                    return SynthesisOutcome::client_side(text);
                }
            };

            match attempt {
                Ok(outcome) => {
                    tracing::info!(
                        voice_id = %voice_id,
                        tier = ?outcome.tier(),
                        source = outcome.tier().source(),
                        "Speech synthesized"
                    );
                    return outcome;
                }
                Err(failure) => {
                    tracing::warn!(
                        voice_id = %voice_id,
                        tier = ?step.tier(),
                        reason = %failure,
                        "Synthesis tier failed"
                    );
                    step = next_step(step, &plan);
                }
            }
        }
    }

    /// 请求指定 > 配置存储中的默认音色 > 配置文件默认音色
    async fn resolve_voice_id(&self, request: &SynthesisRequest) -> VoiceId {
        if let Some(id) = request.voice_id() {
            return id.clone();
        }
        match self.voice_store.default_voice_id().await {
            Ok(Some(id)) => id,
            Ok(None) => self.settings.default_voice_id.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read default voice, using configured default");
                self.settings.default_voice_id.clone()
            }
        }
    }

    /// 存储中有记录时按 origin 判断，否则按克隆 ID 的命名规则判断
    async fn plan_for(&self, voice_id: &VoiceId) -> LadderPlan {
        let identity = match self.voice_store.find_by_id(voice_id).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(voice_id = %voice_id, error = %e, "Failed to look up voice");
                None
            }
        };

        let (voice_is_clone, voice_is_synthesizable) = match identity {
            Some(voice) => (voice.origin().is_clone(), voice.origin().is_synthesizable()),
            None => (voice_id.has_clone_shape(), true),
        };

        LadderPlan {
            voice_is_clone,
            voice_is_synthesizable,
            voice_is_builtin_fallback: *voice_id == self.settings.builtin_voice_id,
        }
    }

    async fn synthesize_with(
        &self,
        text: &str,
        voice_id: &VoiceId,
        mode: StoreMode,
    ) -> Result<SynthesisAudio, TierFailure> {
        let response = self
            .retry
            .execute(
                "synthesize",
                || self.provider.synthesize(text, voice_id),
                ProviderError::is_retryable,
            )
            .await?;

        let decoded = match self
            .decoder
            .decode(response.content_type.as_deref(), &response.body)?
        {
            DecodedPayload::NeedsFollowUp(file_ref) => {
                tracing::debug!(voice_id = %voice_id, file_ref = %file_ref, "Fetching referenced audio file");
                let follow_up = self
                    .retry
                    .execute(
                        "fetch_file_content",
                        || self.provider.fetch_file_content(&file_ref),
                        ProviderError::is_retryable,
                    )
                    .await?;
                self.decoder
                    .decode_follow_up(follow_up.content_type.as_deref(), &follow_up.body)?
            }
            other => other,
        };

        match decoded {
            DecodedPayload::Bytes(bytes) => match self.artifacts.store(bytes, mode).await? {
                StoredArtifact::Url(url) => Ok(SynthesisAudio::Url(url)),
                StoredArtifact::Buffer(bytes) => Ok(SynthesisAudio::mpeg(bytes)),
            },
            DecodedPayload::Url(url) => Ok(SynthesisAudio::Url(url)),
            DecodedPayload::NeedsFollowUp(file_ref) => {
                Err(DecodeError::UnexpectedFollowUp(file_ref).into())
            }
        }
    }

    async fn replay_local_sample(
        &self,
        voice_id: &VoiceId,
        mode: StoreMode,
    ) -> Result<SynthesisAudio, TierFailure> {
        let sample = self
            .samples
            .find_sample(voice_id)
            .await?
            .ok_or_else(|| TierFailure::NoLocalSample(voice_id.clone()))?;

        tracing::debug!(voice_id = %voice_id, file = %sample.file_name, "Replaying local sample");
        Ok(match mode {
            StoreMode::Persist => SynthesisAudio::Url(sample.url),
            StoreMode::Passthrough => {
                let content_type = sample.content_type();
                SynthesisAudio::bytes(sample.data, content_type)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ProviderResponse;
    use crate::domain::synthesis::SynthesisTier;
    use crate::domain::voice::{AudioSample, VoiceIdentity, VoiceName};
    use crate::infrastructure::adapters::{fake_mp3, FakeTtsProvider, FileArtifactStore, FileSampleLibrary};
    use crate::infrastructure::memory::InMemoryVoiceStore;
    use base64::Engine;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        provider: Arc<FakeTtsProvider>,
        store: Arc<InMemoryVoiceStore>,
        samples: Arc<FileSampleLibrary>,
        handler: SynthesizeSpeechHandler,
    }

    /// 每次写入都失败的产物存储
    struct FullDiskStore;

    #[async_trait::async_trait]
    impl ArtifactStorePort for FullDiskStore {
        async fn store(&self, _bytes: Vec<u8>, _mode: StoreMode) -> Result<StoredArtifact, StorageError> {
            Err(StorageError::IoError("No space left on device".into()))
        }
    }

    fn fixture(provider: FakeTtsProvider) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Arc::new(FileArtifactStore::new(dir.path().join("audio"), "/audio"));
        fixture_in(dir, provider, artifacts)
    }

    fn fixture_in(
        dir: TempDir,
        provider: FakeTtsProvider,
        artifacts: Arc<dyn ArtifactStorePort>,
    ) -> Fixture {
        let provider = Arc::new(provider);
        let store = InMemoryVoiceStore::new().arc();
        let samples = Arc::new(FileSampleLibrary::new(
            dir.path().join("samples"),
            "/uploads/voice_samples",
        ));
        let handler = SynthesizeSpeechHandler::new(
            provider.clone(),
            artifacts,
            samples.clone(),
            store.clone(),
            AudioPayloadDecoder::default(),
            RetryPolicy::new(3, Duration::ZERO),
            SynthesisSettings {
                default_voice_id: VoiceId::new("male-qn-qingse").unwrap(),
                builtin_voice_id: VoiceId::new("male-qn-qingse").unwrap(),
                max_text_chars: 5000,
            },
        );
        Fixture {
            _dir: dir,
            provider,
            store,
            samples,
            handler,
        }
    }

    fn command(text: &str, voice_id: Option<&str>, mode: StoreMode) -> SynthesizeSpeech {
        SynthesizeSpeech {
            text: text.to_string(),
            voice_id: voice_id.map(str::to_string),
            mode,
            allow_offline_fallback: true,
        }
    }

    fn hex_audio_response() -> ProviderResponse {
        ProviderResponse::json(&json!({
            "data": { "audio": hex::encode(fake_mp3(4000)), "status": 2 },
            "base_resp": { "status_code": 0, "status_msg": "success" }
        }))
    }

    fn rejected(code: i64, message: &str) -> ProviderResponse {
        ProviderResponse::json(&json!({
            "base_resp": { "status_code": code, "status_msg": message }
        }))
    }

    async fn record_sample(fixture: &Fixture, voice: &str) {
        let sample = AudioSample::new("me.mp3", None, fake_mp3(3000)).unwrap();
        fixture
            .samples
            .save_sample(&VoiceId::new(voice).unwrap(), 0, &sample)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_primary_clone_succeeds() {
        let fx = fixture(FakeTtsProvider::new().push_synthesis(Ok(hex_audio_response())));

        let outcome = fx
            .handler
            .handle(command("你好", Some("clone_1700000000000"), StoreMode::Persist))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::PrimaryClone);
        assert!(outcome.note().is_none());
        let Some(SynthesisAudio::Url(url)) = outcome.audio() else {
            panic!("expected persisted url");
        };
        assert!(url.starts_with("/audio/synthesis_"));
        assert_eq!(fx.provider.synthesize_calls(), vec!["clone_1700000000000"]);
    }

    #[tokio::test]
    async fn test_provider_status_falls_back_to_builtin_without_retry() {
        let fx = fixture(
            FakeTtsProvider::new()
                .push_synthesis(Ok(rejected(2054, "voice id not exist")))
                .push_synthesis(Ok(hex_audio_response())),
        );

        let outcome = fx
            .handler
            .handle(command("hello", Some("clone_42"), StoreMode::Persist))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::FallbackBuiltinVoice);
        assert_eq!(outcome.voice_id().map(VoiceId::as_str), Some("male-qn-qingse"));
        let note = outcome.note().unwrap();
        assert!(note.contains("clone_42"));
        assert!(note.contains("male-qn-qingse"));
        // 首选音色只调用一次，状态码错误不重试
        assert_eq!(
            fx.provider.synthesize_calls(),
            vec!["clone_42", "male-qn-qingse"]
        );
    }

    #[tokio::test]
    async fn test_clone_voice_replays_local_sample_when_provider_is_down() {
        // 首选与内置音色各 3 次瞬时失败
        let provider = (0..6).fold(FakeTtsProvider::new(), |p, _| {
            p.push_synthesis(Err(ProviderError::Transient("HTTP 503".into())))
        });
        let fx = fixture(provider);
        record_sample(&fx, "clone_7").await;

        let outcome = fx
            .handler
            .handle(command("hello", Some("clone_7"), StoreMode::Persist))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::LocalSample);
        assert_eq!(
            outcome.audio(),
            Some(&SynthesisAudio::Url(
                "/uploads/voice_samples/clone_7_0.mp3".to_string()
            ))
        );
        assert_eq!(fx.provider.synthesize_calls().len(), 6);
    }

    #[tokio::test]
    async fn test_storage_failure_advances_ladder() {
        let provider = FakeTtsProvider::new()
            .push_synthesis(Ok(hex_audio_response()))
            .push_synthesis(Ok(hex_audio_response()));
        let fx = fixture_in(tempfile::tempdir().unwrap(), provider, Arc::new(FullDiskStore));
        record_sample(&fx, "clone_8").await;

        let outcome = fx
            .handler
            .handle(command("hello", Some("clone_8"), StoreMode::Persist))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::LocalSample);
        assert_eq!(
            outcome.audio(),
            Some(&SynthesisAudio::Url(
                "/uploads/voice_samples/clone_8_0.mp3".to_string()
            ))
        );
        // 写盘失败不触发服务商重试
        assert_eq!(
            fx.provider.synthesize_calls(),
            vec!["clone_8", "male-qn-qingse"]
        );
    }

    #[tokio::test]
    async fn test_storage_failure_without_sample_reaches_client_side() {
        let provider = FakeTtsProvider::new().push_synthesis(Ok(hex_audio_response()));
        let fx = fixture_in(tempfile::tempdir().unwrap(), provider, Arc::new(FullDiskStore));

        let outcome = fx
            .handler
            .handle(command("hello", Some("male-qn-qingse"), StoreMode::Persist))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::ClientSideSynthesis);
        assert_eq!(outcome.fallback_text(), Some("hello"));
    }

    #[tokio::test]
    async fn test_provider_only_request_fails_instead_of_replaying() {
        let fx = fixture(
            FakeTtsProvider::new()
                .push_synthesis(Err(ProviderError::Permanent("HTTP 400".into())))
                .push_synthesis(Err(ProviderError::Permanent("HTTP 400".into()))),
        );
        record_sample(&fx, "clone_5").await;

        let outcome = fx
            .handler
            .handle(SynthesizeSpeech {
                allow_offline_fallback: false,
                ..command("hello", Some("clone_5"), StoreMode::Persist)
            })
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::Failed);
        assert!(outcome.note().unwrap().contains("clone_5"));
        assert_eq!(
            fx.provider.synthesize_calls(),
            vec!["clone_5", "male-qn-qingse"]
        );
    }

    #[tokio::test]
    async fn test_builtin_voice_falls_through_to_client_side() {
        let fx = fixture(
            FakeTtsProvider::new().push_synthesis(Err(ProviderError::Permanent("401".into()))),
        );
        let text = "今天天气不错";

        let outcome = fx
            .handler
            .handle(command(text, Some("male-qn-qingse"), StoreMode::Persist))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::ClientSideSynthesis);
        assert!(outcome.audio().is_none());
        assert!(outcome.note().unwrap().contains(text));
        assert_eq!(outcome.fallback_text(), Some(text));
        // 请求的就是内置音色，不再重复尝试
        assert_eq!(fx.provider.synthesize_calls(), vec!["male-qn-qingse"]);
    }

    #[tokio::test]
    async fn test_placeholder_voice_skips_provider() {
        let fx = fixture(FakeTtsProvider::new());
        let id = VoiceId::new("clone_99").unwrap();
        fx.store
            .insert(&VoiceIdentity::local_placeholder(
                id.clone(),
                VoiceName::new("mine").unwrap(),
                "upload failed",
            ))
            .await
            .unwrap();
        record_sample(&fx, "clone_99").await;

        let outcome = fx
            .handler
            .handle(command("hi", Some("clone_99"), StoreMode::Passthrough))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::LocalSample);
        assert!(matches!(
            outcome.audio(),
            Some(SynthesisAudio::Bytes { data, content_type: "audio/mpeg" }) if data.len() == 3000
        ));
        assert!(fx.provider.synthesize_calls().is_empty());
    }

    #[tokio::test]
    async fn test_passthrough_returns_bytes() {
        let audio = fake_mp3(5000);
        let fx = fixture(
            FakeTtsProvider::new().push_synthesis(Ok(ProviderResponse::audio(audio.clone()))),
        );

        let outcome = fx
            .handler
            .handle(command("hi", Some("female-shaonv"), StoreMode::Passthrough))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::PrimaryClone);
        assert_eq!(outcome.into_audio(), Some(SynthesisAudio::mpeg(audio)));
    }

    #[tokio::test]
    async fn test_file_reference_is_followed_once() {
        let fx = fixture(
            FakeTtsProvider::new()
                .push_synthesis(Ok(ProviderResponse::json(&json!({
                    "data": { "file_id": 358210 },
                    "base_resp": { "status_code": 0 }
                }))))
                .push_file_content(Ok(ProviderResponse::audio(fake_mp3(3000)))),
        );

        let outcome = fx
            .handler
            .handle(command("hi", Some("female-shaonv"), StoreMode::Passthrough))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::PrimaryClone);
        assert_eq!(fx.provider.file_content_calls(), vec!["358210"]);
    }

    #[tokio::test]
    async fn test_generic_scan_base64_payload() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(fake_mp3(12_000));
        let fx = fixture(FakeTtsProvider::new().push_synthesis(Ok(ProviderResponse::json(
            &json!({
                "result": { "chunks": [ { "payload": encoded } ] },
                "base_resp": { "status_code": 0 }
            }),
        ))));

        let outcome = fx
            .handler
            .handle(command("hi", Some("female-shaonv"), StoreMode::Passthrough))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::PrimaryClone);
        assert!(matches!(outcome.audio(), Some(SynthesisAudio::Bytes { data, .. }) if data.len() == 12_000));
    }

    #[tokio::test]
    async fn test_undersized_audio_advances_ladder() {
        let fx = fixture(
            FakeTtsProvider::new()
                .push_synthesis(Ok(ProviderResponse::audio(fake_mp3(500))))
                .push_synthesis(Ok(ProviderResponse::audio(fake_mp3(2000)))),
        );

        let outcome = fx
            .handler
            .handle(command("hi", Some("female-shaonv"), StoreMode::Passthrough))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::FallbackBuiltinVoice);
    }

    #[tokio::test]
    async fn test_default_voice_comes_from_store() {
        let fx = fixture(FakeTtsProvider::new().push_synthesis(Ok(hex_audio_response())));
        fx.store
            .set_default_voice_id(&VoiceId::new("female-shaonv").unwrap())
            .await
            .unwrap();

        let outcome = fx
            .handler
            .handle(command("hi", Some("  "), StoreMode::Persist))
            .await;

        assert_eq!(outcome.tier(), SynthesisTier::PrimaryClone);
        assert_eq!(fx.provider.synthesize_calls(), vec!["female-shaonv"]);
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_network() {
        let fx = fixture(FakeTtsProvider::new());

        let empty = fx.handler.handle(command("   ", None, StoreMode::Persist)).await;
        assert_eq!(empty.tier(), SynthesisTier::Failed);

        let long = "字".repeat(5001);
        let too_long = fx.handler.handle(command(&long, None, StoreMode::Persist)).await;
        assert_eq!(too_long.tier(), SynthesisTier::Failed);

        assert!(fx.provider.synthesize_calls().is_empty());
    }
}
