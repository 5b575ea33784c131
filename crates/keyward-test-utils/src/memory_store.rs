// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record store for deterministic testing.
//!
//! `MemoryRecordStore` implements `RecordStore` over a map guarded by a tokio
//! `RwLock`, so tests exercise the session without a database. Writes can be
//! made to fail on demand.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use keyward_core::traits::adapter::PluginAdapter;
use keyward_core::traits::store::RecordStore;
use keyward_core::types::{EncryptedRecord, HealthStatus, OwnerId, RecordId, SealedRecord};
use keyward_core::KeywardError;

/// A record store that keeps everything in process memory.
pub struct MemoryRecordStore {
    records: RwLock<HashMap<RecordId, EncryptedRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `create`/`update`/`delete` return a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a record verbatim, bypassing id assignment. Lets tests plant
    /// blobs sealed under other passphrases or corrupted by hand.
    pub async fn insert_raw(&self, record: EncryptedRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    /// Total number of records across all owners.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), KeywardError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KeywardError::Storage {
                source: "injected write failure".into(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, KeywardError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Degraded("writes are failing".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KeywardError> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(
        &self,
        owner: &OwnerId,
        sealed: &SealedRecord,
    ) -> Result<EncryptedRecord, KeywardError> {
        self.check_writable()?;
        let now = Utc::now();
        let record = EncryptedRecord {
            id: RecordId(uuid::Uuid::new_v4().to_string()),
            owner_id: owner.clone(),
            sealed: sealed.clone(),
            defect: None,
            created_at: now,
            updated_at: now,
        };
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        tracing::debug!(record_id = %record.id, "memory store: created");
        Ok(record)
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: &RecordId,
        sealed: &SealedRecord,
    ) -> Result<EncryptedRecord, KeywardError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        match records.get_mut(id) {
            Some(existing) if existing.owner_id == *owner => {
                existing.sealed = sealed.clone();
                existing.defect = None;
                existing.updated_at = Utc::now();
                Ok(existing.clone())
            }
            _ => Err(KeywardError::not_found(id)),
        }
    }

    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> Result<(), KeywardError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        match records.get(id) {
            Some(existing) if existing.owner_id == *owner => {
                records.remove(id);
                Ok(())
            }
            _ => Err(KeywardError::not_found(id)),
        }
    }

    async fn get(&self, owner: &OwnerId, id: &RecordId) -> Result<EncryptedRecord, KeywardError> {
        self.records
            .read()
            .await
            .get(id)
            .filter(|record| record.owner_id == *owner)
            .cloned()
            .ok_or_else(|| KeywardError::not_found(id))
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<EncryptedRecord>, KeywardError> {
        let mut records: Vec<EncryptedRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.owner_id == *owner)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }
}
