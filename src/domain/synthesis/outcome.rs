//! Synthesis Context - 合成结果
//!
//! 只能通过具名构造函数创建，保证：
//! - 有音频 ⇔ tier 不是 ClientSideSynthesis / Failed
//! - tier 不是 PrimaryClone 时 note 一定存在

use serde::Serialize;

use crate::domain::voice::VoiceId;

/// 满足请求的降级层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisTier {
    PrimaryClone,
    FallbackBuiltinVoice,
    LocalSample,
    ClientSideSynthesis,
    Failed,
}

impl SynthesisTier {
    /// 对外暴露的来源标签
    pub fn source(&self) -> &'static str {
        match self {
            SynthesisTier::PrimaryClone => "minimax",
            SynthesisTier::FallbackBuiltinVoice => "fallback",
            SynthesisTier::LocalSample => "local_fallback",
            SynthesisTier::ClientSideSynthesis => "browser",
            SynthesisTier::Failed => "failed",
        }
    }

    pub fn has_audio(&self) -> bool {
        !matches!(
            self,
            SynthesisTier::ClientSideSynthesis | SynthesisTier::Failed
        )
    }
}

/// 服务商合成音频的 MIME 类型
pub const MPEG_CONTENT_TYPE: &str = "audio/mpeg";

/// 音频产物
#[derive(Clone, PartialEq, Eq)]
pub enum SynthesisAudio {
    /// 原始字节（直接写入 HTTP 响应）
    Bytes {
        data: Vec<u8>,
        content_type: &'static str,
    },
    /// 可访问的 URL（本地相对路径或服务商 URL）
    Url(String),
}

impl SynthesisAudio {
    /// 服务商返回的 MP3 字节
    pub fn mpeg(data: Vec<u8>) -> Self {
        Self::bytes(data, MPEG_CONTENT_TYPE)
    }

    pub fn bytes(data: Vec<u8>, content_type: &'static str) -> Self {
        SynthesisAudio::Bytes { data, content_type }
    }
}

impl std::fmt::Debug for SynthesisAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthesisAudio::Bytes { data, content_type } => {
                write!(f, "Bytes({} bytes, {})", data.len(), content_type)
            }
            SynthesisAudio::Url(url) => write!(f, "Url({})", url),
        }
    }
}

/// 合成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOutcome {
    tier: SynthesisTier,
    audio: Option<SynthesisAudio>,
    note: Option<String>,
    voice_id: Option<VoiceId>,
    fallback_text: Option<String>,
}

impl SynthesisOutcome {
    /// 首选音色合成成功
    pub fn primary(audio: SynthesisAudio, voice_id: VoiceId) -> Self {
        Self {
            tier: SynthesisTier::PrimaryClone,
            audio: Some(audio),
            note: None,
            voice_id: Some(voice_id),
            fallback_text: None,
        }
    }

    /// 使用内置音色替代
    pub fn builtin_fallback(audio: SynthesisAudio, requested: &VoiceId, builtin: VoiceId) -> Self {
        let note = format!(
            "Voice {} unavailable, synthesized with builtin voice {}",
            requested, builtin
        );
        Self {
            tier: SynthesisTier::FallbackBuiltinVoice,
            audio: Some(audio),
            note: Some(note),
            voice_id: Some(builtin),
            fallback_text: None,
        }
    }

    /// 回放本地原始录音
    pub fn local_sample(audio: SynthesisAudio, voice_id: VoiceId) -> Self {
        let note = format!(
            "Speech service unavailable, playing a local recording of voice {}",
            voice_id
        );
        Self {
            tier: SynthesisTier::LocalSample,
            audio: Some(audio),
            note: Some(note),
            voice_id: Some(voice_id),
            fallback_text: None,
        }
    }

    /// 交由客户端自行合成，note 中包含原文
    pub fn client_side(text: &str) -> Self {
        Self {
            tier: SynthesisTier::ClientSideSynthesis,
            audio: None,
            note: Some(format!(
                "Speech service temporarily unavailable, please use on-device synthesis. Text: {}",
                text
            )),
            voice_id: None,
            fallback_text: Some(text.to_string()),
        }
    }

    /// 请求本身有误，未进行任何合成
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            tier: SynthesisTier::Failed,
            audio: None,
            note: Some(reason.into()),
            voice_id: None,
            fallback_text: None,
        }
    }

    pub fn tier(&self) -> SynthesisTier {
        self.tier
    }

    pub fn audio(&self) -> Option<&SynthesisAudio> {
        self.audio.as_ref()
    }

    pub fn into_audio(self) -> Option<SynthesisAudio> {
        self.audio
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn voice_id(&self) -> Option<&VoiceId> {
        self.voice_id.as_ref()
    }

    pub fn fallback_text(&self) -> Option<&str> {
        self.fallback_text.as_deref()
    }
}
