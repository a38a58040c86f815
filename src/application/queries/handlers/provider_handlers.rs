//! Provider Query Handlers

use std::sync::Arc;

use crate::application::ports::{CredentialsPort, ProviderCredentials};
use crate::application::queries::GetProviderConfig;

/// 服务商配置视图，不含完整 API Key
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfigView {
    pub group_id: String,
    pub api_key_masked: String,
    /// sk-format / jwt-format / not-set
    pub api_key_format: &'static str,
    pub has_api_key: bool,
}

impl From<&ProviderCredentials> for ProviderConfigView {
    fn from(credentials: &ProviderCredentials) -> Self {
        Self {
            group_id: credentials.group_id().to_string(),
            api_key_masked: credentials.masked_api_key(),
            api_key_format: credentials.key_format(),
            has_api_key: credentials.has_api_key(),
        }
    }
}

/// GetProviderConfig Handler
pub struct GetProviderConfigHandler {
    credentials: Arc<dyn CredentialsPort>,
}

impl GetProviderConfigHandler {
    pub fn new(credentials: Arc<dyn CredentialsPort>) -> Self {
        Self { credentials }
    }

    pub fn handle(&self, _query: GetProviderConfig) -> ProviderConfigView {
        ProviderConfigView::from(&self.credentials.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::SharedCredentials;

    #[test]
    fn test_view_masks_key() {
        let credentials = SharedCredentials::new(ProviderCredentials::new(
            "sk-abcdefghijklmnop",
            "1900000000",
        ));
        let handler = GetProviderConfigHandler::new(Arc::new(credentials));

        let view = handler.handle(GetProviderConfig);

        assert_eq!(view.group_id, "1900000000");
        assert_eq!(view.api_key_masked, "sk-a****mnop");
        assert_eq!(view.api_key_format, "sk-format");
        assert!(view.has_api_key);
    }

    #[test]
    fn test_unset_credentials() {
        let handler = GetProviderConfigHandler::new(Arc::new(SharedCredentials::default()));

        let view = handler.handle(GetProviderConfig);

        assert_eq!(view.api_key_format, "not-set");
        assert!(!view.has_api_key);
        assert!(view.api_key_masked.is_empty());
    }
}
