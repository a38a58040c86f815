//! File Artifact Store - 合成音频落盘
//!
//! 实现 ArtifactStorePort trait。
//! 先写入隐藏临时文件再 rename，任务在任意 await 点被取消都不会留下半个文件

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{ArtifactStorePort, StorageError, StoreMode, StoredArtifact};

/// 文件系统产物存储
pub struct FileArtifactStore {
    /// 音频目录
    base_dir: PathBuf,
    /// 对外 URL 前缀
    url_prefix: String,
}

impl FileArtifactStore {
    /// 目录在首次写入时创建
    pub fn new(base_dir: impl AsRef<Path>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            url_prefix,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn artifact_name() -> String {
        let fragment = Uuid::new_v4().simple().to_string();
        format!(
            "synthesis_{}_{}.mp3",
            Utc::now().timestamp_millis(),
            &fragment[..12]
        )
    }

    async fn persist(&self, bytes: &[u8]) -> Result<String, StorageError> {
        fs::create_dir_all(&self.base_dir).await?;

        let file_name = Self::artifact_name();
        let final_path = self.base_dir.join(&file_name);
        let temp_path = self.base_dir.join(format!(".{}.tmp", file_name));

        if let Err(e) = fs::write(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(
            file = %file_name,
            size = bytes.len(),
            "Saved synthesis artifact"
        );

        Ok(format!("{}/{}", self.url_prefix, file_name))
    }
}

#[async_trait]
impl ArtifactStorePort for FileArtifactStore {
    async fn store(&self, bytes: Vec<u8>, mode: StoreMode) -> Result<StoredArtifact, StorageError> {
        match mode {
            StoreMode::Persist => self.persist(&bytes).await.map(StoredArtifact::Url),
            StoreMode::Passthrough => Ok(StoredArtifact::Buffer(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_persist_writes_file_and_returns_url() {
        let temp_dir = tempdir().unwrap();
        let audio_dir = temp_dir.path().join("audio");
        let store = FileArtifactStore::new(&audio_dir, "/audio/");

        let artifact = store.store(vec![7u8; 2048], StoreMode::Persist).await.unwrap();
        let StoredArtifact::Url(url) = artifact else {
            panic!("expected url");
        };
        assert!(url.starts_with("/audio/synthesis_"));
        assert!(url.ends_with(".mp3"));

        let file_name = url.trim_start_matches("/audio/");
        let data = std::fs::read(audio_dir.join(file_name)).unwrap();
        assert_eq!(data.len(), 2048);

        // 没有残留的临时文件
        let leftovers: Vec<_> = std::fs::read_dir(&audio_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_names_do_not_collide() {
        let temp_dir = tempdir().unwrap();
        let store = FileArtifactStore::new(temp_dir.path(), "/audio");

        let a = store.store(vec![1; 10], StoreMode::Persist).await.unwrap();
        let b = store.store(vec![1; 10], StoreMode::Persist).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_passthrough_does_not_touch_disk() {
        let temp_dir = tempdir().unwrap();
        let audio_dir = temp_dir.path().join("never-created");
        let store = FileArtifactStore::new(&audio_dir, "/audio");

        let artifact = store.store(vec![9; 10], StoreMode::Passthrough).await.unwrap();
        assert_eq!(artifact, StoredArtifact::Buffer(vec![9; 10]));
        assert!(!audio_dir.exists());
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_storage_error() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        // 以普通文件作为父目录，create_dir_all 必然失败
        let store = FileArtifactStore::new(blocker.join("audio"), "/audio");

        let err = store.store(vec![1; 10], StoreMode::Persist).await.unwrap_err();
        assert!(matches!(err, StorageError::IoError(_)));
    }
}
