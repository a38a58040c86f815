//! Voice Context - Value Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 克隆音色 ID 前缀（与注册流程的命名规则保持一致）
pub const CLONE_ID_PREFIX: &str = "clone_";

/// 音色 ID 最大长度
const MAX_VOICE_ID_LEN: usize = 128;

/// 克隆 ID 随机后缀长度（十六进制字符）
const CLONE_ID_SUFFIX_LEN: usize = 8;

/// 音色唯一标识
///
/// 可以是服务商内置音色代码（如 `male-qn-qingse`），也可以是克隆音色 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Result<Self, &'static str> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("音色 ID 不能为空");
        }
        if trimmed.len() > MAX_VOICE_ID_LEN {
            return Err("音色 ID 长度不能超过128字符");
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
            return Err("音色 ID 不能包含空白或路径分隔符");
        }
        Ok(Self(trimmed.to_string()))
    }

    /// 生成新的克隆音色 ID：`clone_{毫秒}_{随机后缀}`
    ///
    /// 同一毫秒内的并发注册也不会得到相同的 ID
    pub fn generate_clone(now: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}{}_{}",
            CLONE_ID_PREFIX,
            now.timestamp_millis(),
            &suffix[..CLONE_ID_SUFFIX_LEN]
        ))
    }

    /// 是否符合克隆音色的命名规则
    ///
    /// 仅用于配置中不存在记录的音色，已登记的音色以 `VoiceOrigin` 为准
    pub fn has_clone_shape(&self) -> bool {
        self.0.starts_with(CLONE_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音色名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceName(String);

impl VoiceName {
    pub fn new(name: impl Into<String>) -> Result<Self, &'static str> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("音色名称不能为空");
        }
        if name.chars().count() > 100 {
            return Err("音色名称长度不能超过100字符");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音色来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceOrigin {
    /// 服务商内置音色
    Builtin,
    /// 服务商侧已创建的克隆音色
    ProviderClone,
    /// 服务商克隆失败后创建的本地占位记录，只能回放本地样本
    LocalPlaceholder,
}

impl VoiceOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceOrigin::Builtin => "builtin",
            VoiceOrigin::ProviderClone => "provider_clone",
            VoiceOrigin::LocalPlaceholder => "local_placeholder",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "builtin" => Some(VoiceOrigin::Builtin),
            "provider_clone" => Some(VoiceOrigin::ProviderClone),
            "local_placeholder" => Some(VoiceOrigin::LocalPlaceholder),
            _ => None,
        }
    }

    /// 是否为克隆类音色（可回退到本地样本）
    pub fn is_clone(&self) -> bool {
        !matches!(self, VoiceOrigin::Builtin)
    }

    /// 是否可以提交给服务商合成
    pub fn is_synthesizable(&self) -> bool {
        !matches!(self, VoiceOrigin::LocalPlaceholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_voice_id_rejects_empty_and_paths() {
        assert!(VoiceId::new("").is_err());
        assert!(VoiceId::new("   ").is_err());
        assert!(VoiceId::new("../etc/passwd").is_err());
        assert!(VoiceId::new("a b").is_err());
        assert_eq!(VoiceId::new(" male-qn-qingse ").unwrap().as_str(), "male-qn-qingse");
    }

    #[test]
    fn test_generate_clone_id() {
        let now = Utc.timestamp_millis_opt(1_735_000_000_123).unwrap();
        let id = VoiceId::generate_clone(now);
        let suffix = id.as_str().strip_prefix("clone_1735000000123_").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(id.has_clone_shape());
        // 用作样本文件名前缀，不能含路径字符
        assert!(VoiceId::new(id.as_str()).is_ok());
        assert!(!VoiceId::new("female-shaonv").unwrap().has_clone_shape());
    }

    #[test]
    fn test_clone_ids_in_same_millisecond_differ() {
        let now = Utc.timestamp_millis_opt(1_735_000_000_123).unwrap();
        let ids: std::collections::HashSet<VoiceId> =
            (0..64).map(|_| VoiceId::generate_clone(now)).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn test_origin_round_trip_str() {
        for origin in [
            VoiceOrigin::Builtin,
            VoiceOrigin::ProviderClone,
            VoiceOrigin::LocalPlaceholder,
        ] {
            assert_eq!(VoiceOrigin::from_str(origin.as_str()), Some(origin));
        }
        assert_eq!(VoiceOrigin::from_str("unknown"), None);
    }

    #[test]
    fn test_placeholder_is_not_synthesizable() {
        assert!(!VoiceOrigin::LocalPlaceholder.is_synthesizable());
        assert!(VoiceOrigin::LocalPlaceholder.is_clone());
        assert!(VoiceOrigin::ProviderClone.is_synthesizable());
        assert!(!VoiceOrigin::Builtin.is_clone());
    }
}
