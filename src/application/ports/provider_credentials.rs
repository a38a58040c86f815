//! Provider Credentials Port - 服务商凭据
//!
//! API Key 与 Group ID 可以在运行时替换，替换后下一次远程调用立即生效

/// 服务商凭据
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    api_key: String,
    group_id: String,
}

impl ProviderCredentials {
    /// 两端空白会被去掉
    pub fn new(api_key: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            group_id: group_id.into().trim().to_string(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Key 与 Group ID 都已填写
    pub fn is_complete(&self) -> bool {
        self.has_api_key() && !self.group_id.is_empty()
    }

    /// 只保留首尾各 4 个字符
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    }

    /// sk-format / jwt-format / not-set
    pub fn key_format(&self) -> &'static str {
        if !self.has_api_key() {
            "not-set"
        } else if self.api_key.starts_with("sk-") {
            "sk-format"
        } else {
            "jwt-format"
        }
    }
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &self.masked_api_key())
            .field("group_id", &self.group_id)
            .finish()
    }
}

/// Credentials Port
///
/// 读写都是同步的内存操作，持久化由 VoiceStorePort 负责
pub trait CredentialsPort: Send + Sync {
    fn current(&self) -> ProviderCredentials;

    fn replace(&self, credentials: ProviderCredentials);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_trimmed() {
        let credentials = ProviderCredentials::new("  sk-abc  ", "\tg1\n");
        assert_eq!(credentials.api_key(), "sk-abc");
        assert_eq!(credentials.group_id(), "g1");
        assert!(credentials.is_complete());
        assert!(!ProviderCredentials::new("sk-abc", " ").is_complete());
    }

    #[test]
    fn test_masking_never_reveals_short_keys() {
        assert_eq!(ProviderCredentials::default().masked_api_key(), "");
        assert_eq!(ProviderCredentials::new("sk-12345", "g").masked_api_key(), "****");
        assert_eq!(
            ProviderCredentials::new("sk-1234567890abcd", "g").masked_api_key(),
            "sk-1****abcd"
        );
    }

    #[test]
    fn test_key_format() {
        assert_eq!(ProviderCredentials::default().key_format(), "not-set");
        assert_eq!(ProviderCredentials::new("sk-x", "g").key_format(), "sk-format");
        assert_eq!(ProviderCredentials::new("eyJhbGciOi", "g").key_format(), "jwt-format");
    }

    #[test]
    fn test_debug_masks_key() {
        let credentials = ProviderCredentials::new("sk-secret-value-1234", "g1");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("g1"));
    }
}
