// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master passphrase acquisition via TTY prompt or KEYWARD_MASTER_PASSPHRASE.

use keyward_core::KeywardError;
use secrecy::SecretString;

/// The environment variable name for providing the master passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "KEYWARD_MASTER_PASSPHRASE";

fn from_env() -> Option<SecretString> {
    std::env::var(PASSPHRASE_ENV_VAR)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn read_line(prompt: &str) -> Result<String, KeywardError> {
    eprint!("{prompt}");
    rpassword::read_password()
        .map_err(|e| KeywardError::Vault(format!("failed to read passphrase: {e}")))
}

fn no_source() -> KeywardError {
    KeywardError::Vault(format!(
        "no master passphrase provided; set {PASSPHRASE_ENV_VAR} or run interactively"
    ))
}

fn stdin_is_terminal() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdin())
}

/// Environment first, then `prompt` when `interactive`, otherwise an error.
fn resolve_passphrase(
    interactive: bool,
    prompt: impl FnOnce() -> Result<SecretString, KeywardError>,
) -> Result<SecretString, KeywardError> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }
    if interactive {
        return prompt();
    }
    Err(no_source())
}

fn prompt_once() -> Result<SecretString, KeywardError> {
    let passphrase = read_line("Master passphrase: ")?;
    if passphrase.is_empty() {
        return Err(KeywardError::Vault("empty passphrase not allowed".to_string()));
    }
    Ok(SecretString::from(passphrase))
}

fn prompt_twice() -> Result<SecretString, KeywardError> {
    let first = zeroize::Zeroizing::new(read_line("New master passphrase: ")?);
    let second = zeroize::Zeroizing::new(read_line("Confirm master passphrase: ")?);
    if *first != *second {
        return Err(KeywardError::Vault("passphrases do not match".to_string()));
    }
    if first.is_empty() {
        return Err(KeywardError::Vault("empty passphrase not allowed".to_string()));
    }
    Ok(SecretString::from(first.to_string()))
}

/// Get the master passphrase from the environment or an interactive prompt.
///
/// Priority:
/// 1. `KEYWARD_MASTER_PASSPHRASE` (scripts and tests)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_master_passphrase() -> Result<SecretString, KeywardError> {
    resolve_passphrase(stdin_is_terminal(), prompt_once)
}

/// Like [`get_master_passphrase`], but an interactive prompt asks twice and
/// requires both entries to match. Used when the vault is still empty.
pub fn get_master_passphrase_with_confirm() -> Result<SecretString, KeywardError> {
    resolve_passphrase(stdin_is_terminal(), prompt_twice)
}
