//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Connection settings can be provided via flags or environment variables and
//! apply to every subcommand.

use crate::api::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::config::DEFAULT_SINGLE_KEY;
use crate::outputs::AGGREGATE_OUTPUT;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Scheduled aggregate refresh (exits early outside 16:30/21:00 Bangkok time)
/// lotto_latest all
///
/// # Force an aggregate refresh right now
/// lotto_latest all --ignore-schedule -o site/all_latest3.json
///
/// # Single lottery; any failure exits with status 1
/// lotto_latest single --lottery lao_santipap
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file (sources and run windows)
    #[arg(short, long, env = "LOTTO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// API key for the extraction endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// Model used for extraction
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Refresh every configured lottery into one aggregate file
    All {
        /// Output path of the aggregate document
        #[arg(short, long, default_value = AGGREGATE_OUTPUT)]
        output: PathBuf,

        /// Run even outside the permitted time windows
        #[arg(long)]
        ignore_schedule: bool,
    },
    /// Refresh a single lottery into its own file
    Single {
        /// Key of the lottery to refresh
        #[arg(short, long, default_value = DEFAULT_SINGLE_KEY)]
        lottery: String,

        /// Output path [default: public/<lottery>_latest3.json]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_all_defaults() {
        let cli = Cli::parse_from(["lotto_latest", "--api-key", "k", "all"]);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(
            cli.command,
            Command::All {
                output: PathBuf::from("all_latest3.json"),
                ignore_schedule: false,
            }
        );
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "lotto_latest",
            "all",
            "--ignore-schedule",
            "-o",
            "/tmp/out.json",
            "--model",
            "gpt-4o-mini",
            "--api-base",
            "http://localhost:8080/v1",
        ]);
        assert_eq!(cli.model, "gpt-4o-mini");
        assert_eq!(cli.api_base, "http://localhost:8080/v1");
        assert_eq!(
            cli.command,
            Command::All {
                output: PathBuf::from("/tmp/out.json"),
                ignore_schedule: true,
            }
        );
    }

    #[test]
    fn test_single_defaults_and_short_flags() {
        let cli = Cli::parse_from(["lotto_latest", "single"]);
        assert_eq!(
            cli.command,
            Command::Single {
                lottery: "lao_santipap".to_string(),
                output: None,
            }
        );

        let cli =
            Cli::parse_from(["lotto_latest", "single", "-l", "hanoi", "-o", "h.json"]);
        assert_eq!(
            cli.command,
            Command::Single {
                lottery: "hanoi".to_string(),
                output: Some(PathBuf::from("h.json")),
            }
        );
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["lotto_latest"]).is_err());
    }
}
