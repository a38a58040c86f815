//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsProvider、ArtifactStore、SampleLibrary、VoiceStore、Credentials）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - retry: 外部调用的有界重试
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod retry;

// Re-exports
pub use commands::{
    handlers::{
        restore_provider_credentials, seed_builtin_voices, DeleteVoiceCloneHandler,
        DeleteVoiceCloneResponse, RegisterVoiceCloneHandler, SetDefaultVoiceHandler,
        SynthesisSettings, SynthesizeSpeechHandler, UpdateProviderCredentialsHandler,
        MAX_CLONE_SAMPLES,
    },
    DeleteVoiceClone, RegisterVoiceClone, SetDefaultVoice, SynthesizeSpeech,
    UpdateProviderCredentials,
};

pub use error::ApplicationError;

pub use ports::{
    ArtifactStorePort, CredentialsPort, LocalSample, ProviderCredentials, ProviderError, ProviderResponse, RepositoryError,
    SampleLibraryPort, StorageError, StoreMode, StoredArtifact, TtsProviderPort, VoiceStorePort,
};

pub use queries::{
    handlers::{
        GetProviderConfigHandler, GetVoiceConfigHandler, ListVoicesHandler, ProviderConfigView,
        VoiceConfigView, VoiceSummary,
    },
    GetProviderConfig, GetVoiceConfig, ListVoices,
};

pub use retry::RetryPolicy;
