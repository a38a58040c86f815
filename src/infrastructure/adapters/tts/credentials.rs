//! Shared Credentials - 运行时可替换的服务商凭据
//!
//! 客户端与配置接口持有同一份句柄

use std::sync::{Arc, RwLock};

use crate::application::ports::{CredentialsPort, ProviderCredentials};

#[derive(Clone, Default)]
pub struct SharedCredentials {
    inner: Arc<RwLock<ProviderCredentials>>,
}

impl SharedCredentials {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            inner: Arc::new(RwLock::new(credentials)),
        }
    }
}

impl CredentialsPort for SharedCredentials {
    fn current(&self) -> ProviderCredentials {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, credentials: ProviderCredentials) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = credentials;
    }
}
