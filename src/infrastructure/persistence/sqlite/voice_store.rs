//! SQLite Voice Store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};

use super::DbPool;
use crate::application::ports::{ProviderCredentials, RepositoryError, VoiceStorePort};
use crate::domain::voice::{CloneRegistration, VoiceId, VoiceIdentity, VoiceName, VoiceOrigin};

/// 默认音色在 settings 表中的键
const DEFAULT_VOICE_KEY: &str = "default_voice_id";
const PROVIDER_API_KEY: &str = "provider_api_key";
const PROVIDER_GROUP_ID_KEY: &str = "provider_group_id";

/// SQLite Voice Store
pub struct SqliteVoiceStore {
    pool: DbPool,
}

impl SqliteVoiceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn serialization_error(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::SerializationError(e.to_string())
}

async fn upsert_setting(
    conn: &mut SqliteConnection,
    key: &str,
    value: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now().to_rfc3339())
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

#[derive(FromRow)]
struct VoiceRow {
    id: String,
    display_name: String,
    origin: String,
    note: Option<String>,
    created_at: String,
}

impl TryFrom<VoiceRow> for VoiceIdentity {
    type Error = RepositoryError;

    fn try_from(row: VoiceRow) -> Result<Self, Self::Error> {
        let origin = VoiceOrigin::from_str(&row.origin)
            .ok_or_else(|| serialization_error(format!("unknown voice origin: {}", row.origin)))?;
        Ok(VoiceIdentity::restore(
            VoiceId::new(row.id).map_err(serialization_error)?,
            VoiceName::new(row.display_name).map_err(serialization_error)?,
            origin,
            row.note,
            DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(serialization_error)?
                .with_timezone(&Utc),
        ))
    }
}

#[async_trait]
impl VoiceStorePort for SqliteVoiceStore {
    async fn insert(&self, voice: &VoiceIdentity) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO voices (id, display_name, origin, note, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(voice.id().as_str())
        .bind(voice.display_name().as_str())
        .bind(voice.origin().as_str())
        .bind(voice.note())
        .bind(voice.created_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Duplicate(voice.id().to_string()));
        }
        Ok(())
    }

    async fn update(&self, voice: &VoiceIdentity) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE voices SET display_name = ?, origin = ?, note = ? WHERE id = ?",
        )
        .bind(voice.display_name().as_str())
        .bind(voice.origin().as_str())
        .bind(voice.note())
        .bind(voice.id().as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(voice.id().to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &VoiceId) -> Result<Option<VoiceIdentity>, RepositoryError> {
        let row: Option<VoiceRow> = sqlx::query_as(
            "SELECT id, display_name, origin, note, created_at FROM voices WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(VoiceIdentity::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<VoiceIdentity>, RepositoryError> {
        let rows: Vec<VoiceRow> = sqlx::query_as(
            "SELECT id, display_name, origin, note, created_at FROM voices ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(VoiceIdentity::try_from).collect()
    }

    async fn delete(&self, id: &VoiceId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM clone_registrations WHERE voice_id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let result = sqlx::query("DELETE FROM voices WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn save_registration(
        &self,
        registration: &CloneRegistration,
    ) -> Result<(), RepositoryError> {
        let payload = serde_json::to_string(registration).map_err(serialization_error)?;

        sqlx::query(
            r#"
            INSERT INTO clone_registrations (voice_id, payload, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(voice_id) DO UPDATE SET
                payload = excluded.payload
            "#,
        )
        .bind(registration.voice().id().as_str())
        .bind(payload)
        .bind(registration.created_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_registration(
        &self,
        voice_id: &VoiceId,
    ) -> Result<Option<CloneRegistration>, RepositoryError> {
        let payload: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM clone_registrations WHERE voice_id = ?")
                .bind(voice_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        payload
            .map(|(json,)| serde_json::from_str(&json).map_err(serialization_error))
            .transpose()
    }

    async fn default_voice_id(&self) -> Result<Option<VoiceId>, RepositoryError> {
        let value: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(DEFAULT_VOICE_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        value
            .map(|(id,)| VoiceId::new(id).map_err(serialization_error))
            .transpose()
    }

    async fn set_default_voice_id(&self, id: &VoiceId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        upsert_setting(&mut conn, DEFAULT_VOICE_KEY, id.as_str()).await?;

        tracing::info!(voice_id = %id, "Default voice updated");
        Ok(())
    }

    async fn provider_credentials(&self) -> Result<Option<ProviderCredentials>, RepositoryError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings WHERE key IN (?, ?)")
                .bind(PROVIDER_API_KEY)
                .bind(PROVIDER_GROUP_ID_KEY)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        if rows.is_empty() {
            return Ok(None);
        }
        let value_of = |key: &str| {
            rows.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .unwrap_or_default()
        };
        Ok(Some(ProviderCredentials::new(
            value_of(PROVIDER_API_KEY),
            value_of(PROVIDER_GROUP_ID_KEY),
        )))
    }

    async fn save_provider_credentials(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        upsert_setting(&mut tx, PROVIDER_API_KEY, credentials.api_key()).await?;
        upsert_setting(&mut tx, PROVIDER_GROUP_ID_KEY, credentials.group_id()).await?;
        tx.commit().await.map_err(db_error)?;

        tracing::info!(group_id = %credentials.group_id(), "Provider credentials saved");
        Ok(())
    }
}
