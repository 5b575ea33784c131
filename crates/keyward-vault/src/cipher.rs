// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record cipher: turns a [`VaultRecord`] into a [`SealedRecord`] and back.
//!
//! Blob layout (big-endian, version 1):
//!
//! ```text
//! version u8 | kdf_alg u8 | p1 u32 | p2 u32 | p3 u32 | nonce [12] | ciphertext+tag
//! ```
//!
//! `kdf_alg` 1 is Argon2id (`p1` memory KiB, `p2` iterations, `p3` lanes) and
//! 2 is PBKDF2-HMAC-SHA256 (`p2` iterations, `p1` and `p3` zero). The header
//! and the salt are authenticated as associated data, so neither can be
//! swapped without the open failing.

use keyward_core::{KdfLimits, KdfParams, KeywardError, MIN_SALT_LEN, SealedRecord, VaultRecord};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::kdf;

/// Current blob format version.
pub const BLOB_VERSION: u8 = 1;

const KDF_ARGON2ID: u8 = 1;
const KDF_PBKDF2_SHA256: u8 = 2;

/// Header length: version, algorithm, three u32 parameters.
pub const HEADER_LEN: usize = 2 + 3 * 4;

const MIN_BLOB_LEN: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

fn encode_header(params: &KdfParams) -> [u8; HEADER_LEN] {
    let (alg, p1, p2, p3) = match *params {
        KdfParams::Argon2id {
            memory_cost,
            iterations,
            parallelism,
        } => (KDF_ARGON2ID, memory_cost, iterations, parallelism),
        KdfParams::Pbkdf2Sha256 { iterations } => (KDF_PBKDF2_SHA256, 0, iterations, 0),
    };

    let mut header = [0u8; HEADER_LEN];
    header[0] = BLOB_VERSION;
    header[1] = alg;
    header[2..6].copy_from_slice(&p1.to_be_bytes());
    header[6..10].copy_from_slice(&p2.to_be_bytes());
    header[10..14].copy_from_slice(&p3.to_be_bytes());
    header
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_be_bytes(buf)
}

/// Parse the header of a blob. `None` for short blobs, unknown versions, and
/// unknown algorithms. Parameter bounds are not checked here.
fn parse_header(ciphertext: &[u8]) -> Option<KdfParams> {
    if ciphertext.len() < MIN_BLOB_LEN || ciphertext[0] != BLOB_VERSION {
        return None;
    }
    let (p1, p2, p3) = (
        read_u32(&ciphertext[2..6]),
        read_u32(&ciphertext[6..10]),
        read_u32(&ciphertext[10..14]),
    );
    match ciphertext[1] {
        KDF_ARGON2ID => Some(KdfParams::Argon2id {
            memory_cost: p1,
            iterations: p2,
            parallelism: p3,
        }),
        KDF_PBKDF2_SHA256 if p1 == 0 && p3 == 0 => Some(KdfParams::Pbkdf2Sha256 { iterations: p2 }),
        _ => None,
    }
}

/// KDF parameters recorded in a blob, if the header is well formed.
pub fn blob_kdf_params(ciphertext: &[u8]) -> Option<KdfParams> {
    parse_header(ciphertext)
}

fn aad(header: &[u8], salt: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(header.len() + salt.len());
    aad.extend_from_slice(header);
    aad.extend_from_slice(salt);
    aad
}

/// Encrypt a record under a key derived from `passphrase` and a fresh salt.
///
/// Two seals of the same record never produce the same salt or blob.
pub fn seal(
    record: &VaultRecord,
    passphrase: &SecretString,
    params: &KdfParams,
) -> Result<SealedRecord, KeywardError> {
    record.validate()?;
    params.validate()?;

    let plaintext = Zeroizing::new(
        serde_json::to_vec(record)
            .map_err(|e| KeywardError::Internal(format!("record serialization failed: {e}")))?,
    );

    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, params)?;

    let header = encode_header(params);
    let (body, nonce) = crypto::seal(&key, &plaintext, &aad(&header, &salt))?;

    let mut ciphertext = Vec::with_capacity(HEADER_LEN + NONCE_LEN + body.len());
    ciphertext.extend_from_slice(&header);
    ciphertext.extend_from_slice(&nonce);
    ciphertext.extend_from_slice(&body);

    Ok(SealedRecord {
        ciphertext,
        salt: salt.to_vec(),
    })
}

/// Decrypt a blob produced by [`seal`].
///
/// The header's parameters must fit `limits`; a blob asking for more work is
/// refused before any key is derived. A short salt is
/// [`KeywardError::InvalidSalt`]. Everything else that can go wrong
/// (malformed header, parameters over the limits, wrong passphrase,
/// tampering) is [`KeywardError::DecryptionFailed`].
pub fn open(
    ciphertext: &[u8],
    salt: &[u8],
    passphrase: &SecretString,
    limits: &KdfLimits,
) -> Result<VaultRecord, KeywardError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(KeywardError::InvalidSalt(format!(
            "salt is {} bytes, need at least {MIN_SALT_LEN}",
            salt.len()
        )));
    }

    let params = parse_header(ciphertext).ok_or(KeywardError::DecryptionFailed)?;
    if !limits.allows(&params) {
        return Err(KeywardError::DecryptionFailed);
    }

    let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), salt, &params)?;

    let (header, rest) = ciphertext.split_at(HEADER_LEN);
    let (nonce, body) = rest.split_at(NONCE_LEN);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce);

    let plaintext = crypto::open(&key, &nonce_bytes, body, &aad(header, salt))?;
    serde_json::from_slice(&plaintext).map_err(|_| KeywardError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: KdfParams = KdfParams::Argon2id {
        memory_cost: 8192,
        iterations: 1,
        parallelism: 1,
    };

    fn pass(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn limits() -> KdfLimits {
        KdfLimits::relative_to(&FAST)
    }

    #[test]
    fn header_roundtrips_both_algorithms() {
        let pbkdf2 = KdfParams::Pbkdf2Sha256 { iterations: 600_000 };
        for params in [FAST, pbkdf2] {
            let mut blob = encode_header(&params).to_vec();
            blob.extend_from_slice(&[0u8; NONCE_LEN + TAG_LEN]);
            assert_eq!(blob_kdf_params(&blob), Some(params));
        }
    }

    #[test]
    fn header_rejects_unknown_version_and_algorithm() {
        let mut blob = encode_header(&FAST).to_vec();
        blob.extend_from_slice(&[0u8; NONCE_LEN + TAG_LEN]);

        let mut bad_version = blob.clone();
        bad_version[0] = 2;
        assert_eq!(blob_kdf_params(&bad_version), None);

        let mut bad_alg = blob.clone();
        bad_alg[1] = 9;
        assert_eq!(blob_kdf_params(&bad_alg), None);

        assert_eq!(blob_kdf_params(&blob[..MIN_BLOB_LEN - 1]), None);
    }

    #[test]
    fn seal_open_roundtrip() {
        let record = VaultRecord::new("Mail").with_secret("s3cret");
        let sealed = seal(&record, &pass("master"), &FAST).unwrap();
        let opened = open(&sealed.ciphertext, &sealed.salt, &pass("master"), &limits()).unwrap();
        assert_eq!(opened, record);
    }

    #[test]
    fn seal_rejects_blank_title() {
        let result = seal(&VaultRecord::new(""), &pass("master"), &FAST);
        assert!(matches!(result, Err(KeywardError::InvalidRecord(_))));
    }

    #[test]
    fn seal_rejects_out_of_range_params() {
        let weak = KdfParams::Pbkdf2Sha256 { iterations: 5 };
        let result = seal(&VaultRecord::new("Mail"), &pass("master"), &weak);
        assert!(matches!(result, Err(KeywardError::Vault(_))));
    }

    #[test]
    fn short_salt_is_invalid_salt() {
        let sealed = seal(&VaultRecord::new("Mail"), &pass("master"), &FAST).unwrap();
        let result = open(&sealed.ciphertext, &sealed.salt[..8], &pass("master"), &limits());
        assert!(matches!(result, Err(KeywardError::InvalidSalt(_))));
    }

    #[test]
    fn header_tampering_is_decryption_failed() {
        let sealed = seal(&VaultRecord::new("Mail"), &pass("master"), &FAST).unwrap();

        // Raise iterations by one: still in range, but the AAD no longer matches.
        let mut tampered = sealed.ciphertext.clone();
        tampered[9] ^= 0x03;
        let result = open(&tampered, &sealed.salt, &pass("master"), &limits());
        assert!(matches!(result, Err(KeywardError::DecryptionFailed)));
    }

    #[test]
    fn oversized_params_fail_before_derivation() {
        let sealed = seal(&VaultRecord::new("Mail"), &pass("master"), &FAST).unwrap();

        // u32::MAX KiB is past every ceiling; 512 MiB is valid but far over
        // what a session sealing with FAST accepts.
        for memory_cost in [u32::MAX, 512 * 1024] {
            let mut forged = sealed.ciphertext.clone();
            forged[2..6].copy_from_slice(&memory_cost.to_be_bytes());
            let result = open(&forged, &sealed.salt, &pass("master"), &limits());
            assert!(matches!(result, Err(KeywardError::DecryptionFailed)));
        }
    }

    #[test]
    fn blob_over_the_callers_limits_is_refused() {
        let strong = KdfParams::Pbkdf2Sha256 { iterations: 50_000 };
        let sealed = seal(&VaultRecord::new("Mail"), &pass("master"), &strong).unwrap();
        let tight = KdfLimits::relative_to(&KdfParams::Pbkdf2Sha256 { iterations: 10_000 });
        let result = open(&sealed.ciphertext, &sealed.salt, &pass("master"), &tight);
        assert!(matches!(result, Err(KeywardError::DecryptionFailed)));

        let roomy = KdfLimits::relative_to(&strong);
        assert!(open(&sealed.ciphertext, &sealed.salt, &pass("master"), &roomy).is_ok());
    }

    #[test]
    fn truncated_blob_is_decryption_failed() {
        let sealed = seal(&VaultRecord::new("Mail"), &pass("master"), &FAST).unwrap();
        for len in [0, 1, HEADER_LEN, MIN_BLOB_LEN - 1] {
            let result = open(&sealed.ciphertext[..len], &sealed.salt, &pass("master"), &limits());
            assert!(matches!(result, Err(KeywardError::DecryptionFailed)), "len {len}");
        }
    }

    #[test]
    fn pbkdf2_records_open() {
        let params = KdfParams::Pbkdf2Sha256 { iterations: 10_000 };
        let record = VaultRecord::new("Legacy").with_username("bob");
        let sealed = seal(&record, &pass("master"), &params).unwrap();
        assert_eq!(blob_kdf_params(&sealed.ciphertext), Some(params));
        assert_eq!(
            open(&sealed.ciphertext, &sealed.salt, &pass("master"), &limits()).unwrap(),
            record
        );
    }
}
