//! File Sample Library - 本地语音样本
//!
//! 实现 SampleLibraryPort trait，文件名为 `{voiceId}_{index}.{ext}`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{LocalSample, SampleLibraryPort, StorageError};
use crate::domain::voice::{AudioSample, VoiceId};

/// 文件系统样本库
pub struct FileSampleLibrary {
    base_dir: PathBuf,
    url_prefix: String,
}

impl FileSampleLibrary {
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

    /// 列出属于该音色的样本文件名（按序号排序）
    async fn list_samples(&self, voice_id: &VoiceId) -> Result<Vec<(usize, String)>, StorageError> {
        if !fs::try_exists(&self.base_dir).await? {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(index) = sample_index(&name, voice_id) {
                found.push((index, name));
            }
        }
        found.sort();
        Ok(found)
    }
}

/// `{voiceId}_{index}.{ext}` → index
fn sample_index(file_name: &str, voice_id: &VoiceId) -> Option<usize> {
    let rest = file_name
        .strip_prefix(voice_id.as_str())?
        .strip_prefix('_')?;
    let (index, ext) = rest.split_once('.')?;
    if ext.is_empty() || ext.contains('.') {
        return None;
    }
    index.parse().ok()
}

#[async_trait]
impl SampleLibraryPort for FileSampleLibrary {
    async fn save_sample(
        &self,
        voice_id: &VoiceId,
        index: usize,
        sample: &AudioSample,
    ) -> Result<String, StorageError> {
        fs::create_dir_all(&self.base_dir).await?;

        let file_name = format!("{}_{}.{}", voice_id, index, sample.extension());
        let temp_path = self.base_dir.join(format!(".{}.tmp", file_name));
        fs::write(&temp_path, sample.data()).await?;
        fs::rename(&temp_path, self.base_dir.join(&file_name)).await?;

        tracing::debug!(
            voice_id = %voice_id,
            file = %file_name,
            size = sample.data().len(),
            "Saved voice sample"
        );
        Ok(file_name)
    }

    async fn find_sample(&self, voice_id: &VoiceId) -> Result<Option<LocalSample>, StorageError> {
        let Some((_, file_name)) = self.list_samples(voice_id).await?.into_iter().next() else {
            return Ok(None);
        };

        let data = fs::read(self.base_dir.join(&file_name)).await?;
        Ok(Some(LocalSample {
            url: format!("{}/{}", self.url_prefix, file_name),
            file_name,
            data,
        }))
    }

    async fn delete_samples(&self, voice_id: &VoiceId) -> Result<u64, StorageError> {
        let mut deleted = 0u64;
        for (_, file_name) in self.list_samples(voice_id).await? {
            fs::remove_file(self.base_dir.join(&file_name)).await?;
            deleted += 1;
        }

        if deleted > 0 {
            tracing::info!(voice_id = %voice_id, files = deleted, "Deleted voice samples");
        }
        Ok(deleted)
    }
}
