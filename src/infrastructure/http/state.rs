//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    // Command handlers
    DeleteVoiceCloneHandler, RegisterVoiceCloneHandler, SetDefaultVoiceHandler,
    SynthesisSettings, SynthesizeSpeechHandler, UpdateProviderCredentialsHandler,
    // Query handlers
    GetProviderConfigHandler, GetVoiceConfigHandler, ListVoicesHandler,
    // Ports
    ArtifactStorePort, CredentialsPort, RetryPolicy, SampleLibraryPort, TtsProviderPort,
    VoiceStorePort,
};
use crate::domain::payload::AudioPayloadDecoder;

/// 运行参数
#[derive(Clone)]
pub struct AppSettings {
    pub synthesis: SynthesisSettings,
    pub retry: RetryPolicy,
    pub decoder: AudioPayloadDecoder,
    /// 单次合成请求的整体超时，超时后返回客户端合成
    pub request_timeout: Duration,
    /// 单个上传样本的大小上限（字节）
    pub max_sample_bytes: usize,
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub voice_store: Arc<dyn VoiceStorePort>,
    pub tts_provider: Arc<dyn TtsProviderPort>,

    // ========== Command Handlers ==========
    pub synthesize_handler: SynthesizeSpeechHandler,
    pub register_clone_handler: RegisterVoiceCloneHandler,
    pub set_default_handler: SetDefaultVoiceHandler,
    pub delete_clone_handler: DeleteVoiceCloneHandler,
    pub update_credentials_handler: UpdateProviderCredentialsHandler,

    // ========== Query Handlers ==========
    pub list_voices_handler: ListVoicesHandler,
    pub voice_config_handler: GetVoiceConfigHandler,
    pub provider_config_handler: GetProviderConfigHandler,

    pub request_timeout: Duration,
    pub max_sample_bytes: usize,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        tts_provider: Arc<dyn TtsProviderPort>,
        credentials: Arc<dyn CredentialsPort>,
        artifacts: Arc<dyn ArtifactStorePort>,
        samples: Arc<dyn SampleLibraryPort>,
        voice_store: Arc<dyn VoiceStorePort>,
        settings: AppSettings,
    ) -> Self {
        let configured_default = settings.synthesis.default_voice_id.clone();

        Self {
            voice_store: voice_store.clone(),
            tts_provider: tts_provider.clone(),

            // Command handlers
            synthesize_handler: SynthesizeSpeechHandler::new(
                tts_provider.clone(),
                artifacts,
                samples.clone(),
                voice_store.clone(),
                settings.decoder,
                settings.retry,
                settings.synthesis,
            ),
            register_clone_handler: RegisterVoiceCloneHandler::new(
                tts_provider,
                samples.clone(),
                voice_store.clone(),
                settings.retry,
            ),
            set_default_handler: SetDefaultVoiceHandler::new(voice_store.clone()),
            delete_clone_handler: DeleteVoiceCloneHandler::new(voice_store.clone(), samples),
            update_credentials_handler: UpdateProviderCredentialsHandler::new(
                credentials.clone(),
                voice_store.clone(),
            ),

            // Query handlers
            list_voices_handler: ListVoicesHandler::new(
                voice_store.clone(),
                configured_default.clone(),
            ),
            voice_config_handler: GetVoiceConfigHandler::new(voice_store, configured_default),
            provider_config_handler: GetProviderConfigHandler::new(credentials),

            request_timeout: settings.request_timeout,
            max_sample_bytes: settings.max_sample_bytes,
        }
    }
}
