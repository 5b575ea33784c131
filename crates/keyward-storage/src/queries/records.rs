// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record CRUD operations. Every statement is scoped by owner.

use keyward_core::KeywardError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::RecordRow;

const SELECT_COLUMNS: &str = "SELECT id, owner_id, envelope, created_at, updated_at FROM vault_records";

/// Insert a new row.
pub async fn insert_record(db: &Database, row: &RecordRow) -> Result<(), KeywardError> {
    let row = row.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO vault_records (id, owner_id, envelope, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.id, row.owner_id, row.envelope, row.created_at, row.updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the envelope of an owned row. Returns the updated row, or `None`
/// when no row with that id belongs to `owner_id`.
pub async fn update_envelope(
    db: &Database,
    owner_id: &str,
    id: &str,
    envelope: Vec<u8>,
    updated_at: String,
) -> Result<Option<RecordRow>, KeywardError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE vault_records SET envelope = ?1, updated_at = ?2
                 WHERE id = ?3 AND owner_id = ?4",
                params![envelope, updated_at, id, owner_id],
            )?;
            let row = if changed == 0 {
                None
            } else {
                tx.query_row(
                    &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                    params![id],
                    RecordRow::from_row,
                )
                .optional()?
            };
            tx.commit()?;
            Ok(row)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete an owned row. Returns `false` when nothing matched.
pub async fn delete_record(db: &Database, owner_id: &str, id: &str) -> Result<bool, KeywardError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM vault_records WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Get an owned row by id.
pub async fn get_record(
    db: &Database,
    owner_id: &str,
    id: &str,
) -> Result<Option<RecordRow>, KeywardError> {
    let owner_id = owner_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1 AND owner_id = ?2"),
                params![id, owner_id],
                RecordRow::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All rows of an owner, newest first. Rows created within the same
/// microsecond fall back to insertion order, newest first.
pub async fn list_records(db: &Database, owner_id: &str) -> Result<Vec<RecordRow>, KeywardError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], RecordRow::from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}
