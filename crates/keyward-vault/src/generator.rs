// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation and offline strength scoring.
//!
//! Characters are drawn from the OS CSPRNG through [`Uniform`], which
//! rejection-samples so every alphabet position is equally likely.

use keyward_core::{KeywardError, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?/~";

/// Glyphs removed when [`PasswordPolicy::exclude_lookalikes`] is set:
/// `0 O o 1 l I |`, backtick, and single quote.
pub const LOOKALIKES: &str = "0Oo1lI|`'";

/// Character-class policy for [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
    pub exclude_lookalikes: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
            exclude_lookalikes: true,
        }
    }
}

impl PasswordPolicy {
    /// The characters this policy draws from, in a stable order.
    pub fn alphabet(&self) -> Vec<char> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, set)| set.chars())
        .filter(|c| !(self.exclude_lookalikes && LOOKALIKES.contains(*c)))
        .collect()
    }
}

/// Generate a password satisfying `policy`.
///
/// Fails with [`KeywardError::InvalidPolicy`] when the length is outside
/// [`MIN_PASSWORD_LENGTH`]..=[`MAX_PASSWORD_LENGTH`] or the alphabet is empty.
pub fn generate(policy: &PasswordPolicy) -> Result<String, KeywardError> {
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&policy.length) {
        return Err(KeywardError::InvalidPolicy(format!(
            "length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {}",
            policy.length
        )));
    }

    let alphabet = policy.alphabet();
    if alphabet.is_empty() {
        return Err(KeywardError::InvalidPolicy(
            "at least one character class must be enabled".to_string(),
        ));
    }

    let index = Uniform::from(0..alphabet.len());
    let mut rng = OsRng;
    Ok((0..policy.length)
        .map(|_| alphabet[index.sample(&mut rng)])
        .collect())
}

/// Score a password from 0 (weakest) to 5.
///
/// One point each for reaching 8, 12, and 16 characters; one more for using
/// two or three character classes, two for all four. Symbols are anything
/// that is not an ASCII letter or digit.
pub fn strength(password: &str) -> u8 {
    let length = password.chars().count();
    let length_points = [8, 12, 16].iter().filter(|&&min| length >= min).count();

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());
    let classes = [has_upper, has_lower, has_digit, has_symbol]
        .iter()
        .filter(|&&present| present)
        .count();
    let class_points = match classes {
        0 | 1 => 0,
        2 | 3 => 1,
        _ => 2,
    };

    (length_points + class_points).min(5) as u8
}

/// Human label for a [`strength`] score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthLabel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => Self::Weak,
            3 => Self::Fair,
            4 => Self::Good,
            _ => Self::Strong,
        }
    }
}

impl std::fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        })
    }
}
