// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the RecordStore trait.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::debug;

use keyward_config::model::StorageConfig;
use keyward_core::envelope;
use keyward_core::{
    EncryptedRecord, HealthStatus, KeywardError, OwnerId, PluginAdapter, RecordId, RecordStore,
    SealedRecord,
};

use crate::database::{Database, map_tr_err};
use crate::models::{RecordRow, format_timestamp};
use crate::queries;

/// SQLite-backed record store.
///
/// The database is opened lazily on first use, or eagerly through
/// [`SqliteRecordStore::initialize`].
pub struct SqliteRecordStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteRecordStore {
    /// Create a store for the configured database. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and run migrations now.
    pub async fn initialize(&self) -> Result<(), KeywardError> {
        self.db().await.map(|_| ())
    }

    async fn db(&self) -> Result<&Database, KeywardError> {
        self.db
            .get_or_try_init(|| async {
                let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
                debug!(path = %self.config.database_path, "SQLite record store initialized");
                Ok::<_, KeywardError>(db)
            })
            .await
    }
}

#[async_trait]
impl PluginAdapter for SqliteRecordStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, KeywardError> {
        let db = match self.db().await {
            Ok(db) => db,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KeywardError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(
        &self,
        owner: &OwnerId,
        sealed: &SealedRecord,
    ) -> Result<EncryptedRecord, KeywardError> {
        let now = format_timestamp(Utc::now());
        let row = RecordRow {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner.0.clone(),
            envelope: envelope::encode(sealed)?,
            created_at: now.clone(),
            updated_at: now,
        };
        queries::records::insert_record(self.db().await?, &row).await?;
        debug!(record_id = %row.id, "record inserted");
        row.into_record()
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: &RecordId,
        sealed: &SealedRecord,
    ) -> Result<EncryptedRecord, KeywardError> {
        let updated = queries::records::update_envelope(
            self.db().await?,
            &owner.0,
            &id.0,
            envelope::encode(sealed)?,
            format_timestamp(Utc::now()),
        )
        .await?;
        match updated {
            Some(row) => row.into_record(),
            None => Err(KeywardError::not_found(id)),
        }
    }

    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> Result<(), KeywardError> {
        if queries::records::delete_record(self.db().await?, &owner.0, &id.0).await? {
            Ok(())
        } else {
            Err(KeywardError::not_found(id))
        }
    }

    async fn get(&self, owner: &OwnerId, id: &RecordId) -> Result<EncryptedRecord, KeywardError> {
        queries::records::get_record(self.db().await?, &owner.0, &id.0)
            .await?
            .ok_or_else(|| KeywardError::not_found(id))?
            .into_record()
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<EncryptedRecord>, KeywardError> {
        queries::records::list_records(self.db().await?, &owner.0)
            .await?
            .into_iter()
            .map(RecordRow::into_record)
            .collect()
    }
}
