// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Keyward password vault.
//!
//! This crate provides the error taxonomy, the vault data model, the wire
//! envelope, and the store collaborator traits shared by every other crate
//! in the workspace.

pub mod envelope;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KeywardError;
pub use types::{
    EncryptedRecord, EnvelopeDefect, HealthStatus, KdfLimits, KdfParams, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH, MIN_SALT_LEN, OwnerId, RecordId, SealedRecord, VaultRecord,
};

pub use traits::{PluginAdapter, RecordStore};
