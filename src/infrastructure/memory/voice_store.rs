//! In-Memory Voice Store Implementation

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

use crate::application::ports::{ProviderCredentials, RepositoryError, VoiceStorePort};
use crate::domain::voice::{CloneRegistration, VoiceId, VoiceIdentity};

/// 内存配置存储
pub struct InMemoryVoiceStore {
    voices: DashMap<VoiceId, VoiceIdentity>,
    registrations: DashMap<VoiceId, CloneRegistration>,
    default_voice: RwLock<Option<VoiceId>>,
    credentials: RwLock<Option<ProviderCredentials>>,
}

impl InMemoryVoiceStore {
    pub fn new() -> Self {
        Self {
            voices: DashMap::new(),
            registrations: DashMap::new(),
            default_voice: RwLock::new(None),
            credentials: RwLock::new(None),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryVoiceStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::DatabaseError("settings lock poisoned".to_string())
}

#[async_trait]
impl VoiceStorePort for InMemoryVoiceStore {
    async fn insert(&self, voice: &VoiceIdentity) -> Result<(), RepositoryError> {
        match self.voices.entry(voice.id().clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(voice.id().to_string())),
            Entry::Vacant(slot) => {
                slot.insert(voice.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, voice: &VoiceIdentity) -> Result<(), RepositoryError> {
        let mut stored = self
            .voices
            .get_mut(voice.id())
            .ok_or_else(|| RepositoryError::NotFound(voice.id().to_string()))?;
        let created_at = stored.created_at();
        *stored = VoiceIdentity::restore(
            voice.id().clone(),
            voice.display_name().clone(),
            voice.origin(),
            voice.note().map(str::to_string),
            created_at,
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &VoiceId) -> Result<Option<VoiceIdentity>, RepositoryError> {
        Ok(self.voices.get(id).map(|v| v.clone()))
    }

    async fn find_all(&self) -> Result<Vec<VoiceIdentity>, RepositoryError> {
        let mut voices: Vec<VoiceIdentity> =
            self.voices.iter().map(|entry| entry.value().clone()).collect();
        voices.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        Ok(voices)
    }

    async fn delete(&self, id: &VoiceId) -> Result<(), RepositoryError> {
        self.registrations.remove(id);
        self.voices
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn save_registration(
        &self,
        registration: &CloneRegistration,
    ) -> Result<(), RepositoryError> {
        self.registrations
            .insert(registration.voice().id().clone(), registration.clone());
        Ok(())
    }

    async fn find_registration(
        &self,
        voice_id: &VoiceId,
    ) -> Result<Option<CloneRegistration>, RepositoryError> {
        Ok(self.registrations.get(voice_id).map(|r| r.clone()))
    }

    async fn default_voice_id(&self) -> Result<Option<VoiceId>, RepositoryError> {
        Ok(self.default_voice.read().map_err(|_| poisoned())?.clone())
    }

    async fn set_default_voice_id(&self, id: &VoiceId) -> Result<(), RepositoryError> {
        *self.default_voice.write().map_err(|_| poisoned())? = Some(id.clone());
        tracing::info!(voice_id = %id, "Default voice updated");
        Ok(())
    }

    async fn provider_credentials(&self) -> Result<Option<ProviderCredentials>, RepositoryError> {
        Ok(self.credentials.read().map_err(|_| poisoned())?.clone())
    }

    async fn save_provider_credentials(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<(), RepositoryError> {
        *self.credentials.write().map_err(|_| poisoned())? = Some(credentials.clone());
        Ok(())
    }
}
