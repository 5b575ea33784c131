// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record subcommands: add, edit, show, list, search, delete, reseal.

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use keyward_config::KeywardConfig;
use keyward_core::{KeywardError, OwnerId, RecordId, VaultRecord};
use keyward_storage::SqliteRecordStore;
use keyward_vault::{
    ListOutcome, OpenedRecord, VaultSession, generate, get_master_passphrase,
    get_master_passphrase_with_confirm, search,
};
use secrecy::SecretString;
use tracing::info;

use crate::generate::GeneratorArgs;

/// Fields settable on `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct RecordFields {
    #[arg(short, long)]
    pub username: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Generate the secret instead of prompting for it.
    #[arg(short, long)]
    pub generate: bool,
    #[command(flatten)]
    pub generator: GeneratorArgs,
}

impl RecordFields {
    /// Overwrite the fields given on the command line.
    fn apply(&self, record: &mut VaultRecord) {
        if let Some(username) = &self.username {
            record.username = username.clone();
        }
        if let Some(url) = &self.url {
            record.url = url.clone();
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
    }
}

/// Open the configured store and start a session for the configured owner.
pub async fn open_session(config: &KeywardConfig) -> Result<VaultSession, KeywardError> {
    let store = Arc::new(SqliteRecordStore::new(config.storage.clone()));
    store.initialize().await?;
    VaultSession::new(
        store,
        OwnerId(config.vault.owner_id.clone()),
        config.vault.kdf_params(),
    )
}

/// Secret for a new or edited record: generated, prompted, or `None` to keep
/// the current one.
fn read_secret(
    fields: &RecordFields,
    config: &KeywardConfig,
) -> Result<Option<String>, KeywardError> {
    if fields.generate {
        return generate(&fields.generator.policy(&config.generator)).map(Some);
    }
    if std::io::stdin().is_terminal() {
        let secret = rpassword::prompt_password("Secret (empty to skip): ")
            .map_err(|e| KeywardError::Internal(format!("failed to read secret: {e}")))?;
        return Ok(Some(secret).filter(|s| !s.is_empty()));
    }
    Ok(None)
}

pub async fn run_add(
    config: &KeywardConfig,
    title: String,
    fields: &RecordFields,
) -> Result<(), KeywardError> {
    let session = open_session(config).await?;
    let passphrase = passphrase_for_write(&session).await?;

    let mut record = VaultRecord::new(title);
    fields.apply(&mut record);
    if let Some(secret) = read_secret(fields, config)? {
        record.secret = secret;
    }

    let stored = session.upsert(None, &record, &passphrase).await?;
    println!("{} {}", "added".green(), stored.id);
    Ok(())
}

/// Ask twice when the vault is still empty, so a typo does not become the
/// passphrase for every later record.
async fn passphrase_for_write(session: &VaultSession) -> Result<SecretString, KeywardError> {
    if session.count().await? == 0 {
        get_master_passphrase_with_confirm()
    } else {
        get_master_passphrase()
    }
}

pub async fn run_edit(
    config: &KeywardConfig,
    id: &str,
    title: Option<String>,
    fields: &RecordFields,
) -> Result<(), KeywardError> {
    let session = open_session(config).await?;
    let passphrase = get_master_passphrase()?;
    let id = RecordId::from(id);

    let opened = session.get(&id, &passphrase).await?;
    let mut record = VaultRecord::clone(&opened.record);
    if let Some(title) = title {
        record.title = title;
    }
    fields.apply(&mut record);
    if let Some(secret) = read_secret(fields, config)? {
        record.secret = secret;
    }

    session.upsert(Some(&id), &record, &passphrase).await?;
    println!("{} {id}", "updated".green());
    Ok(())
}

pub async fn run_show(config: &KeywardConfig, id: &str, reveal: bool) -> Result<(), KeywardError> {
    let session = open_session(config).await?;
    let passphrase = get_master_passphrase()?;
    let opened = session.get(&RecordId::from(id), &passphrase).await?;
    print!("{}", render_record(&opened, reveal));
    Ok(())
}

pub async fn run_list(config: &KeywardConfig, query: Option<&str>) -> Result<(), KeywardError> {
    let session = open_session(config).await?;
    let passphrase = get_master_passphrase()?;
    let outcome = session.fetch(&passphrase).await?;
    let matches = search(&outcome.opened, query.unwrap_or(""));
    print!("{}", render_list(&matches, &outcome));
    Ok(())
}

pub async fn run_delete(config: &KeywardConfig, id: &str) -> Result<(), KeywardError> {
    let session = open_session(config).await?;
    session.delete(&RecordId::from(id)).await?;
    println!("{} {id}", "deleted".green());
    Ok(())
}

pub async fn run_reseal(config: &KeywardConfig) -> Result<(), KeywardError> {
    let session = open_session(config).await?;
    let passphrase = get_master_passphrase()?;
    let outcome = session.fetch(&passphrase).await?;
    let resealed = session.reseal_outdated(&outcome, &passphrase).await?;
    info!(resealed, skipped = outcome.failures.len(), "reseal finished");
    println!(
        "re-sealed {resealed} record(s) with {}",
        session.kdf_params().algorithm()
    );
    if !outcome.failures.is_empty() {
        println!(
            "{}",
            format!("{} record(s) could not be opened and were left as is", outcome.failures.len())
                .yellow()
        );
    }
    Ok(())
}

/// Mask a secret for display: "corr...tery" format.
///
/// Shows up to 4 leading and 4 trailing characters. Values shorter than 10
/// characters are fully masked as "****".
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}

pub fn render_record(opened: &OpenedRecord, reveal: bool) -> String {
    let record = &opened.record;
    let secret = if reveal {
        record.secret.clone()
    } else {
        mask_secret(&record.secret)
    };
    format!(
        "{:<10}{}\n{:<10}{}\n{:<10}{}\n{:<10}{}\n{:<10}{}\n{:<10}{}\n{:<10}{}\n",
        "id", opened.id,
        "title", record.title,
        "username", record.username,
        "url", record.url,
        "secret", secret,
        "notes", record.notes,
        "updated", opened.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

pub fn render_list(matches: &[&OpenedRecord], outcome: &ListOutcome) -> String {
    let mut out = String::new();
    for opened in matches {
        let record = &opened.record;
        out.push_str(&format!(
            "{}  {:<24} {:<20} {}\n",
            opened.id, record.title, record.username, record.url
        ));
    }
    for failure in &outcome.failures {
        out.push_str(&format!(
            "{} {} {}\n",
            "!".yellow(),
            failure.id,
            "could not be opened".yellow()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use keyward_core::KdfParams;
    use keyward_vault::OpenFailure;

    use super::*;

    fn opened(record: VaultRecord) -> OpenedRecord {
        OpenedRecord {
            id: RecordId::from("r1"),
            record: Arc::new(record),
            kdf_params: KdfParams::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn mask_secret_hides_short_values() {
        assert_eq!(mask_secret("hunter2"), "****");
        assert_eq!(mask_secret(""), "****");
    }

    #[test]
    fn mask_secret_keeps_ends_of_long_values() {
        assert_eq!(mask_secret("correct-horse-battery"), "corr...tery");
    }

    #[test]
    fn mask_secret_is_char_aware() {
        assert_eq!(mask_secret("ééééééééééééé"), "éééé...éééé");
    }

    #[test]
    fn fields_apply_only_given_values() {
        let mut record = VaultRecord::new("Bank").with_username("alice").with_url("a");
        let fields = RecordFields {
            url: Some("https://bank.example.com".into()),
            ..RecordFields::default()
        };
        fields.apply(&mut record);
        assert_eq!(record.username, "alice");
        assert_eq!(record.url, "https://bank.example.com");
    }

    #[test]
    fn show_masks_secret_unless_revealed() {
        let opened = opened(VaultRecord::new("Bank").with_secret("correct-horse-battery"));
        let masked = render_record(&opened, false);
        assert!(masked.contains("corr...tery"));
        assert!(!masked.contains("correct-horse-battery"));
        assert!(render_record(&opened, true).contains("correct-horse-battery"));
    }

    #[test]
    fn list_shows_matches_then_failures() {
        let bank = opened(VaultRecord::new("Bank").with_username("alice"));
        let outcome = ListOutcome {
            opened: Vec::new(),
            failures: vec![OpenFailure {
                id: RecordId::from("broken"),
                error: KeywardError::DecryptionFailed,
            }],
        };
        let rendered = render_list(&[&bank], &outcome);
        let bank_at = rendered.find("Bank").unwrap();
        let broken_at = rendered.find("broken").unwrap();
        assert!(bank_at < broken_at);
        assert!(rendered.contains("alice"));
    }
}
