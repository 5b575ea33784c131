// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for vault and store tests.

use keyward_core::{KdfParams, VaultRecord};
use secrecy::SecretString;

/// The cheapest Argon2id parameters the vault accepts. Tests only.
pub fn fast_kdf_params() -> KdfParams {
    KdfParams::Argon2id {
        memory_cost: 8192,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn passphrase(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

/// A record with every field populated.
pub fn sample_record(title: &str) -> VaultRecord {
    VaultRecord::new(title)
        .with_username(format!("{}-user", title.to_lowercase()))
        .with_url(format!("https://{}.example.com", title.to_lowercase()))
        .with_notes(format!("notes for {title}"))
        .with_secret(format!("{title}-s3cret!"))
}
