// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Keyward integration tests.
//!
//! # Components
//!
//! - [`MemoryRecordStore`] - In-memory `RecordStore` with write-failure injection
//! - [`fixtures`] - Fast KDF parameters, passphrases, and sample records

pub mod fixtures;
pub mod memory_store;

pub use fixtures::{fast_kdf_params, passphrase, sample_record};
pub use memory_store::MemoryRecordStore;
