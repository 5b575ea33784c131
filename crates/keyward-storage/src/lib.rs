// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Keyward.
//!
//! Stores sealed records as opaque envelopes in WAL-mode SQLite with embedded
//! migrations and a single-writer connection via `tokio-rusqlite`.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteRecordStore;
pub use database::Database;
