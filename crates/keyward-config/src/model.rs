// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Keyward vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use keyward_core::KdfParams;
use keyward_core::types::PBKDF2_DEFAULT_ITERATIONS;
use serde::{Deserialize, Serialize};

/// Top-level Keyward configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeywardConfig {
    /// Logging and process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Key derivation and record ownership settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Default password generator policy.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Local record store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Password-based KDF used when sealing new records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KdfAlgorithm {
    #[default]
    Argon2id,
    Pbkdf2Sha256,
}

/// Vault configuration.
///
/// KDF settings only apply to records sealed from now on; every record keeps
/// the parameters it was sealed with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Owner id under which records are stored.
    #[serde(default = "default_owner_id")]
    pub owner_id: String,

    /// KDF for new records (`argon2id` or `pbkdf2-sha256`).
    #[serde(default)]
    pub kdf_algorithm: KdfAlgorithm,

    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,

    /// PBKDF2-HMAC-SHA256 iteration count (default: 600000).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            owner_id: default_owner_id(),
            kdf_algorithm: KdfAlgorithm::default(),
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
        }
    }
}

impl VaultConfig {
    /// KDF parameters for sealing new records.
    pub fn kdf_params(&self) -> KdfParams {
        match self.kdf_algorithm {
            KdfAlgorithm::Argon2id => KdfParams::Argon2id {
                memory_cost: self.kdf_memory_cost,
                iterations: self.kdf_iterations,
                parallelism: self.kdf_parallelism,
            },
            KdfAlgorithm::Pbkdf2Sha256 => KdfParams::Pbkdf2Sha256 {
                iterations: self.pbkdf2_iterations,
            },
        }
    }
}

fn default_owner_id() -> String {
    "local".to_string()
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

fn default_pbkdf2_iterations() -> u32 {
    PBKDF2_DEFAULT_ITERATIONS
}

/// Default generator policy, applied when the CLI flags do not override it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_true")]
    pub uppercase: bool,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_true")]
    pub digits: bool,
    #[serde(default = "default_true")]
    pub symbols: bool,
    /// Drop visually confusable glyphs such as `0`/`O` and `1`/`l`/`I`.
    #[serde(default = "default_true")]
    pub exclude_lookalikes: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
            exclude_lookalikes: true,
        }
    }
}

fn default_length() -> usize {
    16
}

fn default_true() -> bool {
    true
}

/// Local SQLite record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("keyward").join("vault.db").display().to_string())
        .unwrap_or_else(|| "keyward.db".to_string())
}
