// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search over opened records. Never looks at ciphertext.

use crate::session::OpenedRecord;

/// Records whose title, username, url, or notes contain `query`,
/// case-insensitively. A blank query matches everything. Order is preserved.
pub fn search<'a>(records: &'a [OpenedRecord], query: &str) -> Vec<&'a OpenedRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|opened| {
            let record = &opened.record;
            [&record.title, &record.username, &record.url, &record.notes]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use keyward_core::{KdfParams, RecordId, VaultRecord};

    use super::*;

    fn opened(id: &str, record: VaultRecord) -> OpenedRecord {
        OpenedRecord {
            id: RecordId::from(id),
            record: Arc::new(record),
            kdf_params: KdfParams::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fixture() -> Vec<OpenedRecord> {
        vec![
            opened("1", VaultRecord::new("Bank").with_username("alice")),
            opened(
                "2",
                VaultRecord::new("Mail")
                    .with_url("https://mail.example.com")
                    .with_notes("recovery codes in the BANK drawer"),
            ),
            opened("3", VaultRecord::new("Forum").with_secret("bank")),
        ]
    }

    fn ids(found: &[&OpenedRecord]) -> Vec<String> {
        found.iter().map(|o| o.id.to_string()).collect()
    }

    #[test]
    fn matches_case_insensitively_across_fields() {
        let records = fixture();
        assert_eq!(ids(&search(&records, "bAnK")), ["1", "2"]);
        assert_eq!(ids(&search(&records, "EXAMPLE.com")), ["2"]);
        assert_eq!(ids(&search(&records, "ALICE")), ["1"]);
    }

    #[test]
    fn secret_is_not_searched() {
        let records = vec![opened("3", VaultRecord::new("Forum").with_secret("hunter2"))];
        assert!(search(&records, "hunter2").is_empty());
    }

    #[test]
    fn blank_query_returns_everything() {
        let records = fixture();
        assert_eq!(search(&records, "").len(), 3);
        assert_eq!(search(&records, "   ").len(), 3);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(search(&fixture(), "zzz").is_empty());
    }
}
