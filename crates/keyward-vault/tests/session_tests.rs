// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault session behaviour against the in-memory store.

use std::sync::Arc;

use keyward_core::{
    EnvelopeDefect, KdfParams, KeywardError, OwnerId, RecordId, RecordStore, SealedRecord,
    VaultRecord,
};
use keyward_test_utils::{MemoryRecordStore, fast_kdf_params, passphrase, sample_record};
use keyward_vault::cipher;
use keyward_vault::{VaultSession, search};

fn session_over(store: &Arc<MemoryRecordStore>, owner: &str, params: KdfParams) -> VaultSession {
    VaultSession::new(store.clone(), OwnerId::from(owner), params).expect("session")
}

#[tokio::test]
async fn upsert_then_fetch_returns_plaintext() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("correct horse");

    let stored = session
        .upsert(None, &sample_record("Bank"), &pass)
        .await
        .unwrap();
    assert_eq!(stored.owner_id, OwnerId::from("alice"));

    let outcome = session.fetch(&pass).await.unwrap();
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.opened.len(), 1);
    assert_eq!(outcome.opened[0].id, stored.id);
    assert_eq!(*outcome.opened[0].record, sample_record("Bank"));
    assert_eq!(session.cached_len(), 1);
}

#[tokio::test]
async fn one_foreign_record_does_not_spoil_the_listing() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("mine");

    let a = session.upsert(None, &sample_record("A"), &pass).await.unwrap();
    let foreign = cipher::seal(&sample_record("B"), &passphrase("theirs"), &fast_kdf_params())
        .unwrap();
    let b = store.create(&OwnerId::from("alice"), &foreign).await.unwrap();
    let c = session.upsert(None, &sample_record("C"), &pass).await.unwrap();

    let outcome = session.list(&[a.clone(), b.clone(), c.clone()], &pass);
    let opened: Vec<_> = outcome.opened.iter().map(|o| o.id.clone()).collect();
    assert_eq!(opened, vec![a.id, c.id]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].id, b.id);
    assert!(matches!(
        outcome.failures[0].error,
        KeywardError::DecryptionFailed
    ));
}

#[tokio::test]
async fn damaged_envelopes_fail_with_their_own_error() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("mine");
    let good = session.upsert(None, &sample_record("Good"), &pass).await.unwrap();

    let damaged = |id: &str, defect: EnvelopeDefect| {
        let mut record = good.clone();
        record.id = RecordId::from(id);
        record.sealed = SealedRecord {
            ciphertext: Vec::new(),
            salt: Vec::new(),
        };
        record.defect = Some(defect);
        record
    };
    let malformed = damaged("malformed", EnvelopeDefect::Malformed);
    let short_salt = damaged("short-salt", EnvelopeDefect::InvalidSalt("8 bytes".into()));
    store.insert_raw(malformed.clone()).await;
    store.insert_raw(short_salt.clone()).await;

    let outcome = session.list(&[malformed, good.clone(), short_salt], &pass);
    assert_eq!(outcome.opened.len(), 1);
    assert_eq!(outcome.opened[0].id, good.id);
    assert!(matches!(
        outcome.failures[0].error,
        KeywardError::DecryptionFailed
    ));
    assert!(matches!(
        outcome.failures[1].error,
        KeywardError::InvalidSalt(_)
    ));
}

#[tokio::test]
async fn blob_demanding_more_work_than_the_session_allows_is_refused() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("mine");

    // Five passes against a session sealing with one: over the 4x allowance.
    let heavy = KdfParams::Argon2id {
        memory_cost: 8192,
        iterations: 5,
        parallelism: 1,
    };
    let sealed = cipher::seal(&sample_record("Heavy"), &pass, &heavy).unwrap();
    let stored = store.create(&OwnerId::from("alice"), &sealed).await.unwrap();

    let refused = session.get(&stored.id, &pass).await;
    assert!(matches!(refused, Err(KeywardError::DecryptionFailed)));

    let heavier_session = session_over(&store, "alice", heavy);
    assert!(heavier_session.get(&stored.id, &pass).await.is_ok());
}

#[tokio::test]
async fn upsert_invalidates_the_cached_entry() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("master");

    let created = session
        .upsert(None, &VaultRecord::new("Mail").with_secret("old"), &pass)
        .await
        .unwrap();
    session.fetch(&pass).await.unwrap();
    assert_eq!(session.cached_len(), 1);

    session
        .upsert(Some(&created.id), &VaultRecord::new("Mail").with_secret("new"), &pass)
        .await
        .unwrap();
    assert_eq!(session.cached_len(), 0);

    let opened = session.get(&created.id, &pass).await.unwrap();
    assert_eq!(opened.record.secret, "new");
}

#[tokio::test]
async fn cache_is_not_served_for_a_replaced_blob() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("master");

    let created = session
        .upsert(None, &VaultRecord::new("Mail").with_secret("v1"), &pass)
        .await
        .unwrap();
    session.fetch(&pass).await.unwrap();

    // Another client rewrites the record behind this session's back.
    let replacement = cipher::seal(
        &VaultRecord::new("Mail").with_secret("v2"),
        &pass,
        &fast_kdf_params(),
    )
    .unwrap();
    store
        .update(&OwnerId::from("alice"), &created.id, &replacement)
        .await
        .unwrap();

    let outcome = session.fetch(&pass).await.unwrap();
    assert_eq!(outcome.opened[0].record.secret, "v2");
}

#[tokio::test]
async fn passphrase_change_clears_the_cache() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("first");

    session.upsert(None, &sample_record("A"), &pass).await.unwrap();
    session.upsert(None, &sample_record("B"), &pass).await.unwrap();
    session.fetch(&pass).await.unwrap();
    assert_eq!(session.cached_len(), 2);

    // Cached plaintext must not be served to a different passphrase.
    let outcome = session.fetch(&passphrase("second")).await.unwrap();
    assert!(outcome.opened.is_empty());
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(session.cached_len(), 0);

    let outcome = session.fetch(&pass).await.unwrap();
    assert_eq!(outcome.opened.len(), 2);
}

#[tokio::test]
async fn delete_removes_record_and_cache_entry() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("master");

    let created = session.upsert(None, &sample_record("A"), &pass).await.unwrap();
    session.fetch(&pass).await.unwrap();
    session.delete(&created.id).await.unwrap();

    assert_eq!(session.cached_len(), 0);
    assert!(store.is_empty().await);
    assert!(matches!(
        session.get(&created.id, &pass).await,
        Err(KeywardError::NotFound { .. })
    ));
}

#[tokio::test]
async fn other_owners_records_are_invisible() {
    let store = Arc::new(MemoryRecordStore::new());
    let alice = session_over(&store, "alice", fast_kdf_params());
    let mallory = session_over(&store, "mallory", fast_kdf_params());
    let pass = passphrase("shared");

    let created = alice.upsert(None, &sample_record("A"), &pass).await.unwrap();

    assert!(mallory.fetch(&pass).await.unwrap().opened.is_empty());
    assert!(matches!(
        mallory.get(&created.id, &pass).await,
        Err(KeywardError::NotFound { .. })
    ));
    assert!(matches!(
        mallory.delete(&created.id).await,
        Err(KeywardError::NotFound { .. })
    ));
    assert!(matches!(
        mallory
            .upsert(Some(&created.id), &sample_record("X"), &pass)
            .await,
        Err(KeywardError::NotFound { .. })
    ));
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let result = session
        .upsert(
            Some(&RecordId::from("missing")),
            &sample_record("A"),
            &passphrase("master"),
        )
        .await;
    assert!(matches!(result, Err(KeywardError::NotFound { .. })));
}

#[tokio::test]
async fn blank_title_never_reaches_the_store() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let result = session
        .upsert(None, &VaultRecord::new(" "), &passphrase("master"))
        .await;
    assert!(matches!(result, Err(KeywardError::InvalidRecord(_))));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn store_failures_propagate() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    store.set_fail_writes(true);
    let result = session
        .upsert(None, &sample_record("A"), &passphrase("master"))
        .await;
    assert!(matches!(result, Err(KeywardError::Storage { .. })));
}

#[tokio::test]
async fn reseal_outdated_upgrades_work_factor() {
    let store = Arc::new(MemoryRecordStore::new());
    let pass = passphrase("master");
    let legacy = KdfParams::Pbkdf2Sha256 { iterations: 10_000 };

    let old_session = session_over(&store, "alice", legacy);
    old_session.upsert(None, &sample_record("A"), &pass).await.unwrap();
    old_session.upsert(None, &sample_record("B"), &pass).await.unwrap();

    let session = session_over(&store, "alice", fast_kdf_params());
    session.upsert(None, &sample_record("C"), &pass).await.unwrap();

    let outcome = session.fetch(&pass).await.unwrap();
    assert_eq!(session.reseal_outdated(&outcome, &pass).await.unwrap(), 2);

    let outcome = session.fetch(&pass).await.unwrap();
    assert_eq!(outcome.opened.len(), 3);
    assert!(outcome.opened.iter().all(|o| o.kdf_params == fast_kdf_params()));
    assert_eq!(session.reseal_outdated(&outcome, &pass).await.unwrap(), 0);
}

#[tokio::test]
async fn search_filters_fetched_records() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("master");

    session
        .upsert(None, &VaultRecord::new("Bank").with_username("alice"), &pass)
        .await
        .unwrap();
    session
        .upsert(None, &VaultRecord::new("Mail").with_notes("see bank"), &pass)
        .await
        .unwrap();
    session
        .upsert(None, &VaultRecord::new("Forum"), &pass)
        .await
        .unwrap();

    let outcome = session.fetch(&pass).await.unwrap();
    assert_eq!(search(&outcome.opened, "BANK").len(), 2);
    assert_eq!(search(&outcome.opened, "").len(), 3);
}

#[tokio::test]
async fn clear_drops_cached_plaintext() {
    let store = Arc::new(MemoryRecordStore::new());
    let session = session_over(&store, "alice", fast_kdf_params());
    let pass = passphrase("master");

    session.upsert(None, &sample_record("A"), &pass).await.unwrap();
    session.fetch(&pass).await.unwrap();
    assert_eq!(session.cached_len(), 1);
    session.clear();
    assert_eq!(session.cached_len(), 0);
}

#[test]
fn session_rejects_weak_kdf_params() {
    let store = Arc::new(MemoryRecordStore::new());
    let result = VaultSession::new(
        store,
        OwnerId::from("alice"),
        KdfParams::Pbkdf2Sha256 { iterations: 1 },
    );
    assert!(matches!(result, Err(KeywardError::Vault(_))));
}

#[test]
fn session_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<VaultSession>();
}
