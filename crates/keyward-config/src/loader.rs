// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./keyward.toml` > `~/.config/keyward/keyward.toml` >
//! `/etc/keyward/keyward.toml` with environment variable overrides via `KEYWARD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KeywardConfig;

/// Config sections that may be overridden from the environment.
const ENV_SECTIONS: &[&str] = &["general", "vault", "generator", "storage"];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/keyward/keyward.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "keyward.toml";

/// The per-user config file under the XDG config directory, if one can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("keyward").join("keyward.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/keyward/keyward.toml` (system-wide)
/// 3. `~/.config/keyward/keyward.toml` (user XDG config)
/// 4. `./keyward.toml` (local directory)
/// 5. `KEYWARD_*` environment variables
pub fn load_config() -> Result<KeywardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<KeywardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeywardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for XDG config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `KEYWARD_<SECTION>_<KEY>` to `section.key`.
///
/// Uses an explicit section map instead of `Env::split("_")` because key names
/// contain underscores: `KEYWARD_VAULT_KDF_MEMORY_COST` must become
/// `vault.kdf_memory_cost`. Variables outside the known sections (such as
/// `KEYWARD_MASTER_PASSPHRASE`) are ignored rather than rejected as unknown keys.
fn env_provider() -> Env {
    Env::prefixed("KEYWARD_")
        .filter(|key| {
            let key_str = key.as_str().to_ascii_lowercase();
            ENV_SECTIONS
                .iter()
                .any(|section| key_str.starts_with(&format!("{section}_")))
        })
        .map(|key| {
            let key_str = key.as_str().to_ascii_lowercase();
            let mapped = ENV_SECTIONS
                .iter()
                .find_map(|section| {
                    key_str
                        .strip_prefix(&format!("{section}_"))
                        .map(|rest| format!("{section}.{rest}"))
                })
                .unwrap_or(key_str);
            mapped.into()
        })
}
