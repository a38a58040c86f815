//! Voice Store Port - 配置存储
//!
//! 音色身份、克隆注册记录以及默认音色设置。
//! 编排器只通过该端口读写配置，不直接接触文件系统

use async_trait::async_trait;
use thiserror::Error;

use super::ProviderCredentials;
use crate::domain::voice::{CloneRegistration, VoiceId, VoiceIdentity};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Voice Store Port
#[async_trait]
pub trait VoiceStorePort: Send + Sync {
    /// 新增音色，ID 已存在时返回 Duplicate
    async fn insert(&self, voice: &VoiceIdentity) -> Result<(), RepositoryError>;

    /// 覆盖已有音色的名称、来源与备注（创建时间不变），不存在时返回 NotFound
    async fn update(&self, voice: &VoiceIdentity) -> Result<(), RepositoryError>;

    /// 根据 ID 查找音色
    async fn find_by_id(&self, id: &VoiceId) -> Result<Option<VoiceIdentity>, RepositoryError>;

    /// 获取所有音色（按创建时间排序）
    async fn find_all(&self) -> Result<Vec<VoiceIdentity>, RepositoryError>;

    /// 删除音色及其注册记录
    async fn delete(&self, id: &VoiceId) -> Result<(), RepositoryError>;

    /// 保存克隆注册记录
    async fn save_registration(&self, registration: &CloneRegistration)
        -> Result<(), RepositoryError>;

    /// 查找克隆注册记录
    async fn find_registration(
        &self,
        voice_id: &VoiceId,
    ) -> Result<Option<CloneRegistration>, RepositoryError>;

    /// 当前默认音色
    async fn default_voice_id(&self) -> Result<Option<VoiceId>, RepositoryError>;

    /// 设置默认音色
    async fn set_default_voice_id(&self, id: &VoiceId) -> Result<(), RepositoryError>;

    /// 运行时保存过的服务商凭据
    async fn provider_credentials(&self) -> Result<Option<ProviderCredentials>, RepositoryError>;

    async fn save_provider_credentials(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<(), RepositoryError>;
}
