// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault session: the record lifecycle on top of a [`RecordStore`].
//!
//! Records are sealed before they reach the store and opened after they come
//! back. Opened plaintext is cached per record id for the lifetime of the
//! session. The passphrase is passed to every call and never stored; the
//! session keeps only an HMAC of it under a random per-session key, which is
//! enough to notice that a different passphrase is in use and drop the cache.
//! Every passphrase change starts a new cache generation; entries written
//! under an older generation are never served.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use keyward_core::{
    EncryptedRecord, KdfLimits, KdfParams, KeywardError, OwnerId, RecordId, RecordStore,
    VaultRecord,
};
use ring::hmac;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::cipher;
use crate::crypto::generate_random_key;

/// A record opened during this session.
#[derive(Debug, Clone)]
pub struct OpenedRecord {
    pub id: RecordId,
    pub record: Arc<VaultRecord>,
    /// Parameters the stored blob was sealed with.
    pub kdf_params: KdfParams,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record that could not be opened.
#[derive(Debug)]
pub struct OpenFailure {
    pub id: RecordId,
    pub error: KeywardError,
}

/// Result of opening a batch of records. Input order is preserved in both lists.
#[derive(Debug, Default)]
pub struct ListOutcome {
    pub opened: Vec<OpenedRecord>,
    pub failures: Vec<OpenFailure>,
}

struct CachedRecord {
    generation: u64,
    salt: Vec<u8>,
    record: Arc<VaultRecord>,
    kdf_params: KdfParams,
}

/// Client-side vault session for one owner.
pub struct VaultSession {
    store: Arc<dyn RecordStore>,
    owner_id: OwnerId,
    kdf_params: KdfParams,
    open_limits: KdfLimits,
    cache: DashMap<RecordId, CachedRecord>,
    generation: AtomicU64,
    tag_key: hmac::Key,
    passphrase_tag: Mutex<Option<hmac::Tag>>,
}

impl VaultSession {
    /// Start a session. `kdf_params` apply to records sealed from now on, and
    /// bound the work spent opening stored records (see [`KdfLimits`]).
    pub fn new(
        store: Arc<dyn RecordStore>,
        owner_id: OwnerId,
        kdf_params: KdfParams,
    ) -> Result<Self, KeywardError> {
        kdf_params.validate()?;
        let tag_key = hmac::Key::new(hmac::HMAC_SHA256, &generate_random_key()?);
        info!(owner_id = %owner_id, kdf = kdf_params.algorithm(), "vault session started");
        Ok(Self {
            store,
            owner_id,
            kdf_params,
            open_limits: KdfLimits::relative_to(&kdf_params),
            cache: DashMap::new(),
            generation: AtomicU64::new(0),
            tag_key,
            passphrase_tag: Mutex::new(None),
        })
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn kdf_params(&self) -> &KdfParams {
        &self.kdf_params
    }

    /// Drop the cache if `passphrase` differs from the one seen last. Returns
    /// the cache generation that opens under `passphrase` belong to.
    fn observe_passphrase(&self, passphrase: &SecretString) -> u64 {
        let bytes = passphrase.expose_secret().as_bytes();
        let mut current = self
            .passphrase_tag
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let changed = match current.as_ref() {
            Some(tag) => hmac::verify(&self.tag_key, bytes, tag.as_ref()).is_err(),
            None => false,
        };
        if changed {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let dropped = self.cache.len();
            self.cache.clear();
            info!(dropped, "passphrase changed, session cache cleared");
        }
        if changed || current.is_none() {
            *current = Some(hmac::sign(&self.tag_key, bytes));
        }
        self.generation.load(Ordering::SeqCst)
    }

    /// Seal `record` and create it (`id` is `None`) or replace an existing one.
    pub async fn upsert(
        &self,
        id: Option<&RecordId>,
        record: &VaultRecord,
        passphrase: &SecretString,
    ) -> Result<EncryptedRecord, KeywardError> {
        self.observe_passphrase(passphrase);
        let sealed = cipher::seal(record, passphrase, &self.kdf_params)?;

        let stored = match id {
            Some(id) => self.store.update(&self.owner_id, id, &sealed).await?,
            None => self.store.create(&self.owner_id, &sealed).await?,
        };
        self.cache.remove(&stored.id);

        debug!(record_id = %stored.id, created = id.is_none(), "record sealed and stored");
        Ok(stored)
    }

    /// Open one record, serving it from the cache when the entry belongs to
    /// the current generation and its salt still matches.
    fn open_one(
        &self,
        encrypted: &EncryptedRecord,
        passphrase: &SecretString,
        generation: u64,
    ) -> Result<OpenedRecord, KeywardError> {
        if let Some(defect) = &encrypted.defect {
            return Err(defect.to_error());
        }

        let current = self.generation.load(Ordering::SeqCst);
        let hit = self
            .cache
            .get(&encrypted.id)
            .filter(|entry| entry.generation == current && entry.salt == encrypted.sealed.salt)
            .map(|entry| (Arc::clone(&entry.record), entry.kdf_params));

        let (record, kdf_params) = match hit {
            Some(hit) => hit,
            None => {
                let sealed = &encrypted.sealed;
                let record = Arc::new(cipher::open(
                    &sealed.ciphertext,
                    &sealed.salt,
                    passphrase,
                    &self.open_limits,
                )?);
                let kdf_params = cipher::blob_kdf_params(&sealed.ciphertext)
                    .ok_or(KeywardError::DecryptionFailed)?;
                // A stale generation means the passphrase changed while this
                // open ran; its plaintext must not outlive the switch.
                if generation == self.generation.load(Ordering::SeqCst) {
                    self.cache.insert(
                        encrypted.id.clone(),
                        CachedRecord {
                            generation,
                            salt: sealed.salt.clone(),
                            record: Arc::clone(&record),
                            kdf_params,
                        },
                    );
                }
                (record, kdf_params)
            }
        };

        Ok(OpenedRecord {
            id: encrypted.id.clone(),
            record,
            kdf_params,
            created_at: encrypted.created_at,
            updated_at: encrypted.updated_at,
        })
    }

    /// Open every record in `records`. A record that fails to open is reported
    /// in [`ListOutcome::failures`] and does not affect the others.
    pub fn list(&self, records: &[EncryptedRecord], passphrase: &SecretString) -> ListOutcome {
        let generation = self.observe_passphrase(passphrase);

        let mut outcome = ListOutcome::default();
        for encrypted in records {
            match self.open_one(encrypted, passphrase, generation) {
                Ok(opened) => outcome.opened.push(opened),
                Err(error) => {
                    warn!(record_id = %encrypted.id, error = %error, "record could not be opened");
                    outcome.failures.push(OpenFailure {
                        id: encrypted.id.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            opened = outcome.opened.len(),
            failed = outcome.failures.len(),
            "records listed"
        );
        outcome
    }

    /// Load and open all of the owner's records.
    pub async fn fetch(&self, passphrase: &SecretString) -> Result<ListOutcome, KeywardError> {
        let records = self.store.list_by_owner(&self.owner_id).await?;
        Ok(self.list(&records, passphrase))
    }

    /// Load and open a single record.
    pub async fn get(
        &self,
        id: &RecordId,
        passphrase: &SecretString,
    ) -> Result<OpenedRecord, KeywardError> {
        let encrypted = self.store.get(&self.owner_id, id).await?;
        let generation = self.observe_passphrase(passphrase);
        self.open_one(&encrypted, passphrase, generation)
    }

    /// Number of records the owner has in the store, opened or not.
    pub async fn count(&self) -> Result<usize, KeywardError> {
        Ok(self.store.list_by_owner(&self.owner_id).await?.len())
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), KeywardError> {
        self.store.delete(&self.owner_id, id).await?;
        self.cache.remove(id);
        debug!(record_id = %id, "record deleted");
        Ok(())
    }

    /// Re-seal every opened record whose blob uses different KDF parameters
    /// than this session. Returns the number of records rewritten.
    pub async fn reseal_outdated(
        &self,
        outcome: &ListOutcome,
        passphrase: &SecretString,
    ) -> Result<usize, KeywardError> {
        let mut resealed = 0;
        for opened in outcome
            .opened
            .iter()
            .filter(|opened| opened.kdf_params != self.kdf_params)
        {
            self.upsert(Some(&opened.id), &opened.record, passphrase)
                .await?;
            resealed += 1;
        }
        if resealed > 0 {
            info!(resealed, kdf = self.kdf_params.algorithm(), "records re-sealed");
        }
        Ok(resealed)
    }

    /// Drop all cached plaintext and forget the passphrase tag.
    pub fn clear(&self) {
        let mut current = self
            .passphrase_tag
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.clear();
        *current = None;
    }

    /// Number of records currently held in the cache.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("store", &self.store.name())
            .field("owner_id", &self.owner_id)
            .field("kdf_params", &self.kdf_params)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("cached", &self.cache.len())
            .finish()
    }
}
