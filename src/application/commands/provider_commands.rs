//! Provider Commands

/// 更新服务商凭据命令
#[derive(Clone)]
pub struct UpdateProviderCredentials {
    pub api_key: String,
    pub group_id: String,
}

impl std::fmt::Debug for UpdateProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateProviderCredentials")
            .field("group_id", &self.group_id)
            .finish_non_exhaustive()
    }
}
