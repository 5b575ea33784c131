// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Keyward vault.

use thiserror::Error;

/// The primary error type used across the vault core, stores, and CLI.
#[derive(Debug, Error)]
pub enum KeywardError {
    /// The password generator was given a policy it cannot satisfy
    /// (empty alphabet, length out of bounds).
    #[error("invalid password policy: {0}")]
    InvalidPolicy(String),

    /// A salt was shorter than the minimum length or otherwise malformed.
    #[error("invalid salt: {0}")]
    InvalidSalt(String),

    /// Authentication failed while opening a record.
    ///
    /// Covers wrong passphrases, corrupted blobs, and tampering alike. Carries
    /// no detail so callers cannot tell which one happened.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Record id unknown, or not owned by the caller.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// A plaintext record violates the data model (e.g. empty title).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cryptographic primitive failures other than authentication
    /// (CSPRNG unavailable, invalid KDF parameters).
    #[error("vault error: {0}")]
    Vault(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KeywardError {
    /// Shorthand for a [`KeywardError::NotFound`] built from any displayable id.
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}
