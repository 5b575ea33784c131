// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-based key derivation.
//!
//! Every record carries its own salt, so every record has its own key.
//! Argon2id is the default; PBKDF2-HMAC-SHA256 remains available for
//! environments that cannot afford Argon2's memory cost.

use std::num::NonZeroU32;

use keyward_core::{KdfParams, KeywardError, MIN_SALT_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Derive a 32-byte key from `passphrase` and `salt` with the given parameters.
///
/// Deterministic for identical inputs. Salts shorter than [`MIN_SALT_LEN`]
/// are rejected with [`KeywardError::InvalidSalt`]; parameters outside the
/// accepted bounds are rejected with [`KeywardError::Vault`].
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, KeywardError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(KeywardError::InvalidSalt(format!(
            "salt is {} bytes, need at least {MIN_SALT_LEN}",
            salt.len()
        )));
    }
    params.validate()?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    match *params {
        KdfParams::Argon2id {
            memory_cost,
            iterations,
            parallelism,
        } => {
            let params = argon2::Params::new(memory_cost, iterations, parallelism, Some(KEY_LEN))
                .map_err(|e| KeywardError::Vault(format!("invalid Argon2id parameters: {e}")))?;
            argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
                .hash_password_into(passphrase, salt, output.as_mut())
                .map_err(|e| KeywardError::Vault(format!("Argon2id key derivation failed: {e}")))?;
        }
        KdfParams::Pbkdf2Sha256 { iterations } => {
            let iterations = NonZeroU32::new(iterations)
                .ok_or_else(|| KeywardError::Vault("PBKDF2 iterations must be non-zero".into()))?;
            ring::pbkdf2::derive(
                ring::pbkdf2::PBKDF2_HMAC_SHA256,
                iterations,
                salt,
                passphrase,
                output.as_mut(),
            );
        }
    }

    Ok(output)
}

/// Generate a fresh random salt of [`MIN_SALT_LEN`] bytes.
pub fn generate_salt() -> Result<[u8; MIN_SALT_LEN], KeywardError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; MIN_SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| KeywardError::Vault("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: KdfParams = KdfParams::Argon2id {
        memory_cost: 8192,
        iterations: 1,
        parallelism: 1,
    };

    const PBKDF2: KdfParams = KdfParams::Pbkdf2Sha256 { iterations: 10_000 };

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [1u8; 16];
        let key1 = derive_key(b"test passphrase", &salt, &FAST).unwrap();
        let key2 = derive_key(b"test passphrase", &salt, &FAST).unwrap();
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn different_passphrase_gives_different_key() {
        let salt = [2u8; 16];
        let key1 = derive_key(b"passphrase one", &salt, &FAST).unwrap();
        let key2 = derive_key(b"passphrase two", &salt, &FAST).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn different_salt_gives_different_key() {
        let key1 = derive_key(b"same", &[1u8; 16], &PBKDF2).unwrap();
        let key2 = derive_key(b"same", &[2u8; 16], &PBKDF2).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn algorithms_do_not_collide() {
        let salt = [3u8; 16];
        let argon = derive_key(b"same", &salt, &FAST).unwrap();
        let pbkdf2 = derive_key(b"same", &salt, &PBKDF2).unwrap();
        assert_ne!(*argon, *pbkdf2);
    }

    #[test]
    fn short_salt_is_rejected() {
        let result = derive_key(b"pass", &[0u8; 15], &FAST);
        assert!(matches!(result, Err(KeywardError::InvalidSalt(_))));
    }

    #[test]
    fn longer_salt_is_accepted() {
        assert!(derive_key(b"pass", &[0u8; 32], &PBKDF2).is_ok());
    }

    #[test]
    fn out_of_bounds_params_are_rejected() {
        let weak = KdfParams::Pbkdf2Sha256 { iterations: 1 };
        assert!(matches!(
            derive_key(b"pass", &[0u8; 16], &weak),
            Err(KeywardError::Vault(_))
        ));
    }

    #[test]
    fn pbkdf2_primitive_matches_rfc7914_vector() {
        // RFC 7914 section 11: P = "passwd", S = "salt", c = 1. Below our
        // iteration floor, so exercise ring directly.
        let mut out = [0u8; 32];
        ring::pbkdf2::derive(
            ring::pbkdf2::PBKDF2_HMAC_SHA256,
            NonZeroU32::new(1).unwrap(),
            b"salt",
            b"passwd",
            &mut out,
        );
        assert_eq!(
            out[..8],
            [0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f]
        );
    }

    #[test]
    fn generated_salts_are_unique() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
