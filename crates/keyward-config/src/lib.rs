// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Keyward password vault.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use keyward_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("owner: {}", config.vault.owner_id);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::KeywardConfig;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<KeywardConfig, Vec<ConfigError>> {
    let mut sources = Vec::new();
    read_source(Path::new(loader::SYSTEM_CONFIG_PATH), &mut sources);
    if let Some(user) = loader::user_config_path() {
        read_source(&user, &mut sources);
    }
    if let Ok(cwd) = std::env::current_dir() {
        read_source(&cwd.join(loader::LOCAL_CONFIG_FILE), &mut sources);
    }
    finish(loader::load_config(), &sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<KeywardConfig, Vec<ConfigError>> {
    let mut sources = Vec::new();
    read_source(path, &mut sources);
    finish(loader::load_config_from_path(path), &sources)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<KeywardConfig, Vec<ConfigError>> {
    let sources = vec![("<inline>".to_string(), toml_content.to_string())];
    finish(loader::load_config_from_str(toml_content), &sources)
}

#[allow(clippy::result_large_err)]
fn finish(
    loaded: Result<KeywardConfig, figment::Error>,
    sources: &[(String, String)],
) -> Result<KeywardConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(owner = %config.vault.owner_id, "configuration loaded");
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, sources)),
    }
}

/// Collect a TOML source file's content for error span resolution.
fn read_source(path: &Path, sources: &mut Vec<(String, String)>) {
    if let Ok(content) = std::fs::read_to_string(path) {
        sources.push((path.display().to_string(), content));
    }
}
