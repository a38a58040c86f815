//! Voice Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{VoiceId, VoiceName, VoiceOrigin};

/// VoiceIdentity 聚合根
///
/// 不变量:
/// - id 在配置存储中全局唯一
/// - origin 为 LocalPlaceholder 的音色不会提交给服务商合成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceIdentity {
    id: VoiceId,
    display_name: VoiceName,
    origin: VoiceOrigin,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl VoiceIdentity {
    /// 服务商内置音色
    pub fn builtin(id: VoiceId, display_name: VoiceName) -> Self {
        Self::restore(id, display_name, VoiceOrigin::Builtin, None, Utc::now())
    }

    /// 服务商侧克隆成功的音色
    pub fn provider_clone(id: VoiceId, display_name: VoiceName) -> Self {
        Self::restore(id, display_name, VoiceOrigin::ProviderClone, None, Utc::now())
    }

    /// 本地占位克隆
    pub fn local_placeholder(id: VoiceId, display_name: VoiceName, note: impl Into<String>) -> Self {
        Self::restore(
            id,
            display_name,
            VoiceOrigin::LocalPlaceholder,
            Some(note.into()),
            Utc::now(),
        )
    }

    /// 从持久化数据重建
    pub fn restore(
        id: VoiceId,
        display_name: VoiceName,
        origin: VoiceOrigin,
        note: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_name,
            origin,
            note,
            created_at,
        }
    }

    // Getters
    pub fn id(&self) -> &VoiceId {
        &self.id
    }

    pub fn display_name(&self) -> &VoiceName {
        &self.display_name
    }

    pub fn origin(&self) -> VoiceOrigin {
        self.origin
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

    #[test]
    fn test_placeholder_carries_note() {
        let voice = VoiceIdentity::local_placeholder(
            VoiceId::new("clone_1").unwrap(),
            VoiceName::new("本地克隆").unwrap(),
            "use local samples",
        );

        assert_eq!(voice.origin(), VoiceOrigin::LocalPlaceholder);
        assert_eq!(voice.note(), Some("use local samples"));
        assert_eq!(voice.display_name().as_str(), "本地克隆");
    }

    #[test]
    fn test_builtin_has_no_note() {
        let voice = VoiceIdentity::builtin(
            VoiceId::new("male-qn-qingse").unwrap(),
            VoiceName::new("青涩青年音").unwrap(),
        );
        assert_eq!(voice.origin(), VoiceOrigin::Builtin);
        assert!(voice.note().is_none());
    }
}
