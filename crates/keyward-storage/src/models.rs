// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row shape of the `vault_records` table and its mapping to
//! [`EncryptedRecord`].

use chrono::{DateTime, SecondsFormat, Utc};
use keyward_core::envelope;
use keyward_core::{
    EncryptedRecord, EnvelopeDefect, KeywardError, OwnerId, RecordId, SealedRecord,
};
use tracing::warn;

/// One `vault_records` row as stored.
#[derive(Debug, Clone)]
pub struct RecordRow {
    pub id: String,
    pub owner_id: String,
    pub envelope: Vec<u8>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fixed-width UTC timestamp, so lexical order matches time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, KeywardError> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| KeywardError::Storage {
            source: Box::new(e),
        })
}

impl RecordRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            envelope: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    pub fn into_record(self) -> Result<EncryptedRecord, KeywardError> {
        // A bad envelope fails only this record, so the caller can report it
        // and delete it.
        let (sealed, defect) = match envelope::decode(&self.envelope) {
            Ok(sealed) => (sealed, None),
            Err(error) => {
                warn!(record_id = %self.id, error = %error, "stored envelope is malformed");
                let empty = SealedRecord {
                    ciphertext: Vec::new(),
                    salt: Vec::new(),
                };
                (empty, Some(EnvelopeDefect::from_decode_error(&error)))
            }
        };

        Ok(EncryptedRecord {
            id: RecordId(self.id),
            owner_id: OwnerId(self.owner_id),
            sealed,
            defect,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}
