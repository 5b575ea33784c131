// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side vault protocol for Keyward.
//!
//! Records are encrypted with AES-256-GCM under a key derived from the master
//! passphrase and a per-record salt (Argon2id by default, PBKDF2-HMAC-SHA256
//! optionally). The store only ever sees the resulting blob and salt.
//!
//! - [`generator`]: random passwords and strength scoring
//! - [`kdf`]: passphrase key derivation
//! - [`cipher`]: record sealing and opening
//! - [`session`]: record lifecycle, cache, and re-sealing
//! - [`search`]: filtering opened records

pub mod cipher;
pub mod crypto;
pub mod generator;
pub mod kdf;
pub mod prompt;
pub mod search;
pub mod session;

pub use generator::{PasswordPolicy, StrengthLabel, generate, strength};
pub use prompt::{get_master_passphrase, get_master_passphrase_with_confirm};
pub use search::search;
pub use session::{ListOutcome, OpenFailure, OpenedRecord, VaultSession};
