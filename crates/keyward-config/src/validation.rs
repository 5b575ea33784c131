// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as KDF work-factor floors and generator policy bounds.

use keyward_core::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

use crate::diagnostic::ConfigError;
use crate::model::KeywardConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &KeywardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.general.log_level.as_str()) {
        fail(format!(
            "general.log_level `{}` must be one of {}",
            config.general.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.vault.owner_id.trim().is_empty() {
        fail("vault.owner_id must not be empty".to_string());
    }

    if let Err(e) = config.vault.kdf_params().validate() {
        fail(format!("vault KDF parameters rejected: {e}"));
    }

    let generator = &config.generator;
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&generator.length) {
        fail(format!(
            "generator.length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {}",
            generator.length
        ));
    }
    if !(generator.uppercase || generator.lowercase || generator.digits || generator.symbols) {
        fail("generator must enable at least one character class".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
