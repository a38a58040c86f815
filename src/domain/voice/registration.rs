//! Voice Context - 克隆注册记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{VoiceError, VoiceIdentity};

const MPEG_CONTENT_TYPE: &str = "audio/mpeg";

/// 允许上传的样本扩展名
const ALLOWED_SAMPLE_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

/// 上传的音频样本
#[derive(Debug, Clone)]
pub struct AudioSample {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

impl AudioSample {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> Result<Self, VoiceError> {
        let file_name = file_name.into();
        let extension = extension_of(&file_name).ok_or_else(|| {
            VoiceError::InvalidSample(format!("{}: 缺少扩展名", file_name))
        })?;
        if !ALLOWED_SAMPLE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(VoiceError::InvalidSample(format!(
                "{}: 仅支持 MP3、WAV、M4A 格式",
                file_name
            )));
        }
        if data.is_empty() {
            return Err(VoiceError::InvalidSample(format!("{}: 文件为空", file_name)));
        }

        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| guess_content_type(&extension).to_string());

        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 小写扩展名（构造时已校验存在）
    pub fn extension(&self) -> String {
        extension_of(&self.file_name).unwrap_or_else(|| "mp3".to_string())
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// 按文件扩展名推断音频 MIME 类型，未知扩展名按 MP3 处理
pub fn content_type_for_file(file_name: &str) -> &'static str {
    extension_of(file_name)
        .map(|ext| guess_content_type(&ext))
        .unwrap_or(MPEG_CONTENT_TYPE)
}

fn guess_content_type(extension: &str) -> &'static str {
    match extension {
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        _ => MPEG_CONTENT_TYPE,
    }
}

/// 单个样本在注册流程中的状态
///
/// pending → uploaded → clone_requested → ready | upload_failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleState {
    Pending,
    Uploaded,
    CloneRequested,
    Ready,
    UploadFailed,
}

/// 样本状态记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStatus {
    pub file_name: String,
    pub state: SampleState,
    pub file_ref: Option<String>,
    pub error: Option<String>,
}

impl SampleStatus {
    pub fn pending(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            state: SampleState::Pending,
            file_ref: None,
            error: None,
        }
    }

    pub fn mark_uploaded(&mut self, file_ref: impl Into<String>) {
        self.state = SampleState::Uploaded;
        self.file_ref = Some(file_ref.into());
    }

    pub fn mark_upload_failed(&mut self, error: impl Into<String>) {
        self.state = SampleState::UploadFailed;
        self.error = Some(error.into());
    }

    /// 仅已上传的样本会推进
    pub fn advance(&mut self, state: SampleState) {
        if matches!(
            self.state,
            SampleState::Uploaded | SampleState::CloneRequested
        ) {
            self.state = state;
        }
    }
}

/// 克隆注册结果
///
/// 返回后不可变；同一说话人的后续注册使用新的音色 ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneRegistration {
    voice: VoiceIdentity,
    sample_file_refs: Vec<String>,
    samples: Vec<SampleStatus>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl CloneRegistration {
    pub fn new(
        voice: VoiceIdentity,
        samples: Vec<SampleStatus>,
        note: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let sample_file_refs = samples
            .iter()
            .filter_map(|s| s.file_ref.clone())
            .collect();
        Self {
            voice,
            sample_file_refs,
            samples,
            note,
            created_at,
        }
    }

    pub fn voice(&self) -> &VoiceIdentity {
        &self.voice
    }

    pub fn sample_file_refs(&self) -> &[String] {
        &self.sample_file_refs
    }

    pub fn samples(&self) -> &[SampleStatus] {
        &self.samples
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::{VoiceId, VoiceName};

    #[test]
    fn test_sample_extension_validation() {
        assert!(AudioSample::new("a.MP3", None, vec![1]).is_ok());
        assert!(AudioSample::new("a.wav", None, vec![1]).is_ok());
        assert!(AudioSample::new("a.ogg", None, vec![1]).is_err());
        assert!(AudioSample::new("noext", None, vec![1]).is_err());
        assert!(AudioSample::new("a.mp3", None, vec![]).is_err());
    }

    #[test]
    fn test_sample_content_type_guess() {
        let sample = AudioSample::new("a.wav", None, vec![1]).unwrap();
        assert_eq!(sample.content_type(), "audio/wav");
        assert_eq!(sample.extension(), "wav");

        let sample = AudioSample::new("a.mp3", Some("audio/x-custom".into()), vec![1]).unwrap();
        assert_eq!(sample.content_type(), "audio/x-custom");
    }

    #[test]
    fn test_content_type_for_stored_file() {
        assert_eq!(content_type_for_file("clone_1_abc_0.wav"), "audio/wav");
        assert_eq!(content_type_for_file("clone_1_abc_0.M4A"), "audio/mp4");
        assert_eq!(content_type_for_file("clone_1_abc_0.mp3"), "audio/mpeg");
        assert_eq!(content_type_for_file("noext"), "audio/mpeg");
    }

    #[test]
    fn test_failed_sample_does_not_advance() {
        let mut status = SampleStatus::pending("a.mp3");
        status.mark_upload_failed("HTTP 500");
        status.advance(SampleState::Ready);
        assert_eq!(status.state, SampleState::UploadFailed);

        let mut status = SampleStatus::pending("b.mp3");
        status.mark_uploaded("file-1");
        status.advance(SampleState::CloneRequested);
        status.advance(SampleState::Ready);
        assert_eq!(status.state, SampleState::Ready);
    }

    #[test]
    fn test_registration_collects_file_refs_in_order() {
        let mut first = SampleStatus::pending("a.mp3");
        first.mark_uploaded("f1");
        let mut second = SampleStatus::pending("b.mp3");
        second.mark_upload_failed("boom");
        let mut third = SampleStatus::pending("c.mp3");
        third.mark_uploaded("f3");

        let voice = VoiceIdentity::provider_clone(
            VoiceId::new("clone_1").unwrap(),
            VoiceName::new("克隆").unwrap(),
        );
        let registration = CloneRegistration::new(voice, vec![first, second, third], None, Utc::now());

        assert_eq!(registration.sample_file_refs(), &["f1".to_string(), "f3".to_string()]);
    }
}
