// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Length-prefixed wire envelope packing a salt and a ciphertext blob.
//!
//! Layout:
//!
//! ```text
//! "KWE1" | salt_len: u8 | salt | ciphertext_len: u32 BE | ciphertext
//! ```
//!
//! Both halves are length-delimited, so no byte value inside either one can
//! corrupt parsing. [`encode_base64`] wraps the same bytes for text columns
//! and JSON transport.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::KeywardError;
use crate::types::{MIN_SALT_LEN, SealedRecord};

const MAGIC: &[u8; 4] = b"KWE1";

/// Pack a sealed record into its binary envelope.
pub fn encode(sealed: &SealedRecord) -> Result<Vec<u8>, KeywardError> {
    let salt_len = u8::try_from(sealed.salt.len())
        .map_err(|_| KeywardError::InvalidSalt("salt longer than 255 bytes".to_string()))?;
    let ct_len = u32::try_from(sealed.ciphertext.len())
        .map_err(|_| KeywardError::Internal("ciphertext exceeds 4 GiB".to_string()))?;

    let mut out = Vec::with_capacity(MAGIC.len() + 1 + sealed.salt.len() + 4 + sealed.ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.push(salt_len);
    out.extend_from_slice(&sealed.salt);
    out.extend_from_slice(&ct_len.to_be_bytes());
    out.extend_from_slice(&sealed.ciphertext);
    Ok(out)
}

/// Unpack a binary envelope.
///
/// Structural damage surfaces as [`KeywardError::DecryptionFailed`], the same
/// error an authentication failure produces. A salt below the minimum length
/// surfaces as [`KeywardError::InvalidSalt`].
pub fn decode(bytes: &[u8]) -> Result<SealedRecord, KeywardError> {
    let rest = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or(KeywardError::DecryptionFailed)?;
    let (&salt_len, rest) = rest.split_first().ok_or(KeywardError::DecryptionFailed)?;
    let salt_len = usize::from(salt_len);
    if rest.len() < salt_len + 4 {
        return Err(KeywardError::DecryptionFailed);
    }
    let (salt, rest) = rest.split_at(salt_len);
    let (len_bytes, ciphertext) = rest.split_at(4);
    let ct_len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
    if ciphertext.len() != ct_len as usize {
        return Err(KeywardError::DecryptionFailed);
    }
    if salt.len() < MIN_SALT_LEN {
        return Err(KeywardError::InvalidSalt(format!(
            "expected at least {MIN_SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }

    Ok(SealedRecord {
        ciphertext: ciphertext.to_vec(),
        salt: salt.to_vec(),
    })
}

/// Pack a sealed record into a standard-base64 string.
pub fn encode_base64(sealed: &SealedRecord) -> Result<String, KeywardError> {
    Ok(STANDARD.encode(encode(sealed)?))
}

/// Unpack a standard-base64 envelope string.
pub fn decode_base64(text: &str) -> Result<SealedRecord, KeywardError> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|_| KeywardError::DecryptionFailed)?;
    decode(&bytes)
}
