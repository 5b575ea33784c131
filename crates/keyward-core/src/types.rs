// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault data model shared by the cipher, the session, and the store adapters.
//!
//! [`VaultRecord`] is the plaintext form and only ever lives in memory.
//! [`SealedRecord`] and [`EncryptedRecord`] are the forms that cross the store
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::KeywardError;

/// Minimum salt length in bytes (128 bits).
pub const MIN_SALT_LEN: usize = 16;

/// Shortest password the generator will produce.
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Longest password the generator will produce.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Opaque record identifier assigned by the store on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Opaque owner identifier. Records are visible and mutable only to their owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// A credential record in plaintext form.
///
/// Every optional field serializes as an empty string rather than being
/// omitted, and deserializes missing keys back to empty strings. The backing
/// buffers are overwritten when the record is dropped.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct VaultRecord {
    pub title: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub secret: String,
}

impl VaultRecord {
    /// Create a record with the given title and empty optional fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            username: String::new(),
            url: String::new(),
            notes: String::new(),
            secret: String::new(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Check the record against the data model before it is sealed.
    pub fn validate(&self) -> Result<(), KeywardError> {
        if self.title.trim().is_empty() {
            return Err(KeywardError::InvalidRecord(
                "title must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for VaultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultRecord")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("url", &self.url)
            .field("notes", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Output of the record cipher: the authenticated blob and the salt its key
/// was derived with. Neither half is meaningful without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedRecord {
    pub ciphertext: Vec<u8>,
    pub salt: Vec<u8>,
}

/// The only persisted form of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub sealed: SealedRecord,
    /// Set when the stored envelope could not be unpacked. `sealed` is then
    /// empty and the record can only be reported or deleted.
    pub defect: Option<EnvelopeDefect>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a stored envelope could not be unpacked into a [`SealedRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeDefect {
    /// Bad magic, bad lengths, or trailing bytes.
    Malformed,
    /// The envelope carried a salt shorter than [`MIN_SALT_LEN`].
    InvalidSalt(String),
}

impl EnvelopeDefect {
    /// Classify an error returned by [`crate::envelope::decode`].
    pub fn from_decode_error(error: &KeywardError) -> Self {
        match error {
            KeywardError::InvalidSalt(message) => Self::InvalidSalt(message.clone()),
            _ => Self::Malformed,
        }
    }

    /// The error a caller opening the record should see.
    pub fn to_error(&self) -> KeywardError {
        match self {
            Self::Malformed => KeywardError::DecryptionFailed,
            Self::InvalidSalt(message) => KeywardError::InvalidSalt(message.clone()),
        }
    }
}

/// Password-based key derivation parameters, recorded inside every blob so
/// the work factor can be raised without breaking older records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfParams {
    /// Argon2id (v0x13). `memory_cost` is in KiB.
    Argon2id {
        memory_cost: u32,
        iterations: u32,
        parallelism: u32,
    },
    /// PBKDF2 with HMAC-SHA256.
    Pbkdf2Sha256 { iterations: u32 },
}

/// Argon2id memory floor in KiB (8 MiB).
pub const ARGON2_MIN_MEMORY_COST: u32 = 8 * 1024;
/// Argon2id memory ceiling in KiB (1 GiB).
pub const ARGON2_MAX_MEMORY_COST: u32 = 1024 * 1024;
pub const ARGON2_MAX_ITERATIONS: u32 = 16;
pub const ARGON2_MAX_PARALLELISM: u32 = 16;
/// PBKDF2-HMAC-SHA256 iteration floor.
pub const PBKDF2_MIN_ITERATIONS: u32 = 10_000;
pub const PBKDF2_MAX_ITERATIONS: u32 = 5_000_000;
/// PBKDF2 iterations used when nothing else is configured.
pub const PBKDF2_DEFAULT_ITERATIONS: u32 = 600_000;

/// How many times the opener's own work factor a stored blob may ask for.
pub const OPEN_WORK_FACTOR: u32 = 4;

impl Default for KdfParams {
    /// Argon2id with 64 MiB, 3 passes, 4 lanes.
    fn default() -> Self {
        Self::Argon2id {
            memory_cost: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Check the parameters against the accepted floors and ceilings.
    pub fn validate(&self) -> Result<(), KeywardError> {
        match *self {
            Self::Argon2id {
                memory_cost,
                iterations,
                parallelism,
            } => {
                if !(ARGON2_MIN_MEMORY_COST..=ARGON2_MAX_MEMORY_COST).contains(&memory_cost) {
                    return Err(KeywardError::Vault(format!(
                        "Argon2id memory cost {memory_cost} KiB outside \
                         {ARGON2_MIN_MEMORY_COST}..={ARGON2_MAX_MEMORY_COST}"
                    )));
                }
                if !(1..=ARGON2_MAX_ITERATIONS).contains(&iterations) {
                    return Err(KeywardError::Vault(format!(
                        "Argon2id iterations {iterations} outside 1..={ARGON2_MAX_ITERATIONS}"
                    )));
                }
                if !(1..=ARGON2_MAX_PARALLELISM).contains(&parallelism) {
                    return Err(KeywardError::Vault(format!(
                        "Argon2id parallelism {parallelism} outside 1..={ARGON2_MAX_PARALLELISM}"
                    )));
                }
                Ok(())
            }
            Self::Pbkdf2Sha256 { iterations } => {
                if !(PBKDF2_MIN_ITERATIONS..=PBKDF2_MAX_ITERATIONS).contains(&iterations) {
                    return Err(KeywardError::Vault(format!(
                        "PBKDF2 iterations {iterations} outside \
                         {PBKDF2_MIN_ITERATIONS}..={PBKDF2_MAX_ITERATIONS}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Short algorithm name, used in logs and CLI output.
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Argon2id { .. } => "argon2id",
            Self::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
        }
    }
}

/// Upper bounds on the derivation work an open may perform.
///
/// Blob headers are read before anything is authenticated, so the parameters
/// they carry are checked against these limits before a key is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfLimits {
    pub max_memory_cost: u32,
    pub max_iterations: u32,
    pub max_parallelism: u32,
    pub max_pbkdf2_iterations: u32,
}

impl KdfLimits {
    /// [`OPEN_WORK_FACTOR`] times `params` for its own algorithm, and times the
    /// defaults for the other one, clamped to the absolute ceilings.
    pub fn relative_to(params: &KdfParams) -> Self {
        let (memory_cost, iterations, parallelism) = match *params {
            KdfParams::Argon2id {
                memory_cost,
                iterations,
                parallelism,
            } => (memory_cost, iterations, parallelism),
            KdfParams::Pbkdf2Sha256 { .. } => match KdfParams::default() {
                KdfParams::Argon2id {
                    memory_cost,
                    iterations,
                    parallelism,
                } => (memory_cost, iterations, parallelism),
                KdfParams::Pbkdf2Sha256 { .. } => (ARGON2_MIN_MEMORY_COST, 1, 1),
            },
        };
        let pbkdf2_iterations = match *params {
            KdfParams::Pbkdf2Sha256 { iterations } => iterations,
            KdfParams::Argon2id { .. } => PBKDF2_DEFAULT_ITERATIONS,
        };
        let scale = |value: u32, ceiling: u32| value.saturating_mul(OPEN_WORK_FACTOR).min(ceiling);

        Self {
            max_memory_cost: scale(memory_cost, ARGON2_MAX_MEMORY_COST),
            max_iterations: scale(iterations, ARGON2_MAX_ITERATIONS),
            max_parallelism: scale(parallelism, ARGON2_MAX_PARALLELISM),
            max_pbkdf2_iterations: scale(pbkdf2_iterations, PBKDF2_MAX_ITERATIONS),
        }
    }

    /// True when `params` are valid and within these limits.
    pub fn allows(&self, params: &KdfParams) -> bool {
        if params.validate().is_err() {
            return false;
        }
        match *params {
            KdfParams::Argon2id {
                memory_cost,
                iterations,
                parallelism,
            } => {
                memory_cost <= self.max_memory_cost
                    && iterations <= self.max_iterations
                    && parallelism <= self.max_parallelism
            }
            KdfParams::Pbkdf2Sha256 { iterations } => iterations <= self.max_pbkdf2_iterations,
        }
    }
}

impl Default for KdfLimits {
    fn default() -> Self {
        Self::relative_to(&KdfParams::default())
    }
}
