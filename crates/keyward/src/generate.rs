// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `keyward generate`: print random passwords with their strength.

use clap::Args;
use colored::{ColoredString, Colorize};
use keyward_config::model::GeneratorConfig;
use keyward_core::KeywardError;
use keyward_vault::{PasswordPolicy, StrengthLabel, generate, strength};

/// Generator flags. Unset flags fall back to the `[generator]` config section.
#[derive(Args, Debug, Default)]
pub struct GeneratorArgs {
    /// Password length (4-128).
    #[arg(short, long)]
    pub length: Option<usize>,
    /// Leave out uppercase letters.
    #[arg(long)]
    pub no_uppercase: bool,
    /// Leave out lowercase letters.
    #[arg(long)]
    pub no_lowercase: bool,
    /// Leave out digits.
    #[arg(long)]
    pub no_digits: bool,
    /// Leave out symbols.
    #[arg(long)]
    pub no_symbols: bool,
    /// Allow visually confusable characters such as 0/O and 1/l.
    #[arg(long)]
    pub allow_lookalikes: bool,
}

impl GeneratorArgs {
    pub fn policy(&self, config: &GeneratorConfig) -> PasswordPolicy {
        PasswordPolicy {
            length: self.length.unwrap_or(config.length),
            uppercase: config.uppercase && !self.no_uppercase,
            lowercase: config.lowercase && !self.no_lowercase,
            digits: config.digits && !self.no_digits,
            symbols: config.symbols && !self.no_symbols,
            exclude_lookalikes: config.exclude_lookalikes && !self.allow_lookalikes,
        }
    }
}

pub fn colored_label(score: u8) -> ColoredString {
    let label = StrengthLabel::from_score(score);
    let text = label.to_string();
    match label {
        StrengthLabel::Weak => text.red(),
        StrengthLabel::Fair => text.yellow(),
        StrengthLabel::Good => text.cyan(),
        StrengthLabel::Strong => text.green(),
    }
}

pub fn run_generate(
    args: &GeneratorArgs,
    count: usize,
    config: &GeneratorConfig,
) -> Result<(), KeywardError> {
    let policy = args.policy(config);
    for _ in 0..count.max(1) {
        let password = generate(&policy)?;
        let score = strength(&password);
        println!("{password}  {} ({score}/5)", colored_label(score));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_apply_without_flags() {
        let policy = GeneratorArgs::default().policy(&GeneratorConfig::default());
        assert_eq!(policy, PasswordPolicy::default());
    }

    #[test]
    fn flags_narrow_the_config_policy() {
        let args = GeneratorArgs {
            length: Some(10),
            no_uppercase: true,
            no_lowercase: true,
            no_symbols: true,
            allow_lookalikes: true,
            ..GeneratorArgs::default()
        };
        let policy = args.policy(&GeneratorConfig::default());
        assert_eq!(policy.length, 10);
        assert!(policy.digits);
        assert!(!policy.uppercase && !policy.lowercase && !policy.symbols);
        assert!(!policy.exclude_lookalikes);
    }

    #[test]
    fn flags_cannot_reenable_a_class_disabled_in_config() {
        let config = GeneratorConfig {
            symbols: false,
            ..GeneratorConfig::default()
        };
        assert!(!GeneratorArgs::default().policy(&config).symbols);
    }

    #[test]
    fn all_classes_off_is_reported() {
        let args = GeneratorArgs {
            no_uppercase: true,
            no_lowercase: true,
            no_digits: true,
            no_symbols: true,
            ..GeneratorArgs::default()
        };
        let result = run_generate(&args, 1, &GeneratorConfig::default());
        assert!(matches!(result, Err(KeywardError::InvalidPolicy(_))));
    }
}
