// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote store collaborator: durable CRUD of sealed records.

use async_trait::async_trait;

use crate::error::KeywardError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EncryptedRecord, OwnerId, RecordId, SealedRecord};

/// Durable, owner-scoped storage of sealed records.
///
/// Stores only ever see [`SealedRecord`]s. Every operation is scoped to an
/// owner: an id that exists but belongs to someone else is reported as
/// [`KeywardError::NotFound`], never as a distinct "forbidden" error.
/// Writes replace the salt and ciphertext together, atomically per record.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Persist a new record and return it with its store-assigned id and timestamps.
    async fn create(
        &self,
        owner: &OwnerId,
        sealed: &SealedRecord,
    ) -> Result<EncryptedRecord, KeywardError>;

    /// Replace the sealed payload of an existing record.
    async fn update(
        &self,
        owner: &OwnerId,
        id: &RecordId,
        sealed: &SealedRecord,
    ) -> Result<EncryptedRecord, KeywardError>;

    /// Remove a record.
    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> Result<(), KeywardError>;

    /// Fetch a single record.
    async fn get(&self, owner: &OwnerId, id: &RecordId) -> Result<EncryptedRecord, KeywardError>;

    /// All records of an owner, newest first.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<EncryptedRecord>, KeywardError>;
}
