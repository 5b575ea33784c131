// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyward - a client-side encrypted password vault.
//!
//! This is the binary entry point.

mod generate;
mod records;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use keyward_config::KeywardConfig;
use keyward_core::KeywardError;

use crate::generate::GeneratorArgs;
use crate::records::RecordFields;

/// Keyward - a client-side encrypted password vault.
#[derive(Parser, Debug)]
#[command(name = "keyward", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate random passwords.
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
        /// How many passwords to print.
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },
    /// Add a record.
    Add {
        title: String,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Change fields of a record.
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Show one record.
    Show {
        id: String,
        /// Print the secret in clear.
        #[arg(long)]
        reveal: bool,
    },
    /// List all records.
    List,
    /// List records whose title, username, url, or notes contain QUERY.
    Search { query: String },
    /// Delete a record.
    Delete { id: String },
    /// Re-seal records that use outdated key derivation parameters.
    Reseal,
}

fn load_config(path: Option<&PathBuf>) -> Option<KeywardConfig> {
    let loaded = match path {
        Some(path) => keyward_config::load_and_validate_path(path),
        None => keyward_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            keyward_config::render_errors(&errors);
            None
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("keyward={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

async fn run(command: Commands, config: &KeywardConfig) -> Result<(), KeywardError> {
    match command {
        Commands::Generate { generator, count } => {
            generate::run_generate(&generator, count, &config.generator)
        }
        Commands::Add { title, fields } => records::run_add(config, title, &fields).await,
        Commands::Edit { id, title, fields } => {
            records::run_edit(config, &id, title, &fields).await
        }
        Commands::Show { id, reveal } => records::run_show(config, &id, reveal).await,
        Commands::List => records::run_list(config, None).await,
        Commands::Search { query } => records::run_list(config, Some(&query)).await,
        Commands::Delete { id } => records::run_delete(config, &id).await,
        Commands::Reseal => records::run_reseal(config).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(config) = load_config(cli.config.as_ref()) else {
        return ExitCode::FAILURE;
    };
    init_tracing(&config.general.log_level);

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("keyward: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::parse_from(["keyward", "generate", "-l", "24", "--no-symbols", "-c", "3"]);
        match cli.command {
            Commands::Generate { generator, count } => {
                assert_eq!(generator.length, Some(24));
                assert!(generator.no_symbols);
                assert_eq!(count, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_add_with_generated_secret() {
        let cli = Cli::parse_from([
            "keyward", "add", "Bank", "--username", "alice", "--generate", "--length", "20",
        ]);
        match cli.command {
            Commands::Add { title, fields } => {
                assert_eq!(title, "Bank");
                assert_eq!(fields.username.as_deref(), Some("alice"));
                assert!(fields.generate);
                assert_eq!(fields.generator.length, Some(20));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_is_accepted_after_subcommand() {
        let cli = Cli::parse_from(["keyward", "list", "--config", "/tmp/k.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/k.toml")));
    }

    #[test]
    fn default_config_runs_generate() {
        let config = keyward_config::load_and_validate_str("").expect("defaults validate");
        let generator = GeneratorArgs::default();
        let result = generate::run_generate(&generator, 2, &config.generator);
        assert!(result.is_ok());
    }
}
