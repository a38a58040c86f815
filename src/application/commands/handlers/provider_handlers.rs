//! Provider Command Handlers - 服务商凭据的运行时更新

use std::sync::Arc;

use crate::application::commands::UpdateProviderCredentials;
use crate::application::error::ApplicationError;
use crate::application::ports::{CredentialsPort, ProviderCredentials, VoiceStorePort};
use crate::application::queries::handlers::ProviderConfigView;

/// UpdateProviderCredentials Handler
///
/// 先持久化再替换内存中的凭据，写库失败时正在使用的凭据不变
pub struct UpdateProviderCredentialsHandler {
    credentials: Arc<dyn CredentialsPort>,
    voice_store: Arc<dyn VoiceStorePort>,
}

impl UpdateProviderCredentialsHandler {
    pub fn new(credentials: Arc<dyn CredentialsPort>, voice_store: Arc<dyn VoiceStorePort>) -> Self {
        Self {
            credentials,
            voice_store,
        }
    }

    pub async fn handle(
        &self,
        command: UpdateProviderCredentials,
    ) -> Result<ProviderConfigView, ApplicationError> {
        let credentials = ProviderCredentials::new(command.api_key, command.group_id);
        if !credentials.is_complete() {
            return Err(ApplicationError::validation("API密钥和Group ID是必填项"));
        }

        self.voice_store.save_provider_credentials(&credentials).await?;
        self.credentials.replace(credentials.clone());

        tracing::info!(
            group_id = %credentials.group_id(),
            key_format = credentials.key_format(),
            "Provider credentials updated"
        );
        Ok(ProviderConfigView::from(&credentials))
    }
}

/// 启动时用配置存储中保存过的凭据覆盖配置文件中的值
///
/// 存储中的凭据不完整时忽略，返回是否发生了覆盖
pub async fn restore_provider_credentials(
    voice_store: &dyn VoiceStorePort,
    credentials: &dyn CredentialsPort,
) -> Result<bool, ApplicationError> {
    match voice_store.provider_credentials().await? {
        Some(saved) if saved.is_complete() => {
            tracing::info!(group_id = %saved.group_id(), "Using provider credentials saved at runtime");
            credentials.replace(saved);
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::SharedCredentials;
    use crate::infrastructure::memory::InMemoryVoiceStore;

    fn command(api_key: &str, group_id: &str) -> UpdateProviderCredentials {
        UpdateProviderCredentials {
            api_key: api_key.to_string(),
            group_id: group_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_update_persists_and_replaces() {
        let credentials = SharedCredentials::default();
        let store = InMemoryVoiceStore::new().arc();
        let handler =
            UpdateProviderCredentialsHandler::new(Arc::new(credentials.clone()), store.clone());

        let view = handler.handle(command(" sk-0123456789abcdef ", "g1")).await.unwrap();

        assert_eq!(view.api_key_masked, "sk-0****cdef");
        assert_eq!(credentials.current().api_key(), "sk-0123456789abcdef");
        let saved = store.provider_credentials().await.unwrap().unwrap();
        assert_eq!(saved.group_id(), "g1");
    }

    #[tokio::test]
    async fn test_incomplete_credentials_are_rejected() {
        let credentials = SharedCredentials::new(ProviderCredentials::new("sk-keep", "g0"));
        let store = InMemoryVoiceStore::new().arc();
        let handler =
            UpdateProviderCredentialsHandler::new(Arc::new(credentials.clone()), store.clone());

        let err = handler.handle(command("sk-new", "  ")).await.unwrap_err();

        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert_eq!(credentials.current().api_key(), "sk-keep");
        assert!(store.provider_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_prefers_saved_credentials() {
        let credentials = SharedCredentials::new(ProviderCredentials::new("sk-file", "g-file"));
        let store = InMemoryVoiceStore::new();

        assert!(!restore_provider_credentials(&store, &credentials).await.unwrap());
        assert_eq!(credentials.current().api_key(), "sk-file");

        store
            .save_provider_credentials(&ProviderCredentials::new("sk-saved", "g-saved"))
            .await
            .unwrap();
        assert!(restore_provider_credentials(&store, &credentials).await.unwrap());
        assert_eq!(credentials.current().group_id(), "g-saved");
    }
}
