//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_store;
mod provider_credentials;
mod sample_library;
mod tts_provider;
mod voice_store;

pub use artifact_store::{ArtifactStorePort, StorageError, StoreMode, StoredArtifact};
pub use provider_credentials::{CredentialsPort, ProviderCredentials};
pub use sample_library::{LocalSample, SampleLibraryPort};
pub use tts_provider::{ProviderError, ProviderResponse, TtsProviderPort};
pub use voice_store::{RepositoryError, VoiceStorePort};
