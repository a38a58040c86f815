//! Artifact Store Port - 出站端口
//!
//! 合成音频的落盘 / 直通

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err.to_string())
    }
}

/// 存储方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// 写入音频目录，返回可访问的相对 URL
    Persist,
    /// 不落盘，直接把字节交给调用方写入响应
    Passthrough,
}

/// 存储结果
#[derive(Clone, PartialEq, Eq)]
pub enum StoredArtifact {
    Url(String),
    Buffer(Vec<u8>),
}

impl std::fmt::Debug for StoredArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoredArtifact::Url(url) => write!(f, "Url({})", url),
            StoredArtifact::Buffer(b) => write!(f, "Buffer({} bytes)", b.len()),
        }
    }
}

/// Artifact Store Port
///
/// 不做缓存和去重，每次调用都产生新的产物
#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    async fn store(&self, bytes: Vec<u8>, mode: StoreMode) -> Result<StoredArtifact, StorageError>;
}
