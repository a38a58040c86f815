//! Sample Library Port - 本地语音样本
//!
//! 克隆注册时保存原始录音，合成全部失败时作为本地回放的来源

use async_trait::async_trait;

use super::StorageError;
use crate::domain::voice::{content_type_for_file, AudioSample, VoiceId};

/// 本地样本
#[derive(Clone, PartialEq, Eq)]
pub struct LocalSample {
    pub file_name: String,
    /// 可访问的相对 URL
    pub url: String,
    pub data: Vec<u8>,
}

impl LocalSample {
    /// 按扩展名推断的 MIME 类型
    pub fn content_type(&self) -> &'static str {
        content_type_for_file(&self.file_name)
    }
}

impl std::fmt::Debug for LocalSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSample")
            .field("file_name", &self.file_name)
            .field("url", &self.url)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Sample Library Port
#[async_trait]
pub trait SampleLibraryPort: Send + Sync {
    /// 保存样本，返回文件名
    async fn save_sample(
        &self,
        voice_id: &VoiceId,
        index: usize,
        sample: &AudioSample,
    ) -> Result<String, StorageError>;

    /// 查找音色的第一个样本
    async fn find_sample(&self, voice_id: &VoiceId) -> Result<Option<LocalSample>, StorageError>;

    /// 删除音色的全部样本，返回删除数量
    async fn delete_samples(&self, voice_id: &VoiceId) -> Result<u64, StorageError>;
}
