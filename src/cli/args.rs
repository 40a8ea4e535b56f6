//! Command-line argument parsing for medrag
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// medrag - grounded question answering over a precomputed evidence corpus
#[derive(Parser, Debug)]
#[command(name = "medrag")]
#[command(version = "0.3.0")]
#[command(about = "Retrieve, rerank, and generate grounded answers", long_about = None)]
pub struct Args {
    /// Question to answer in one shot
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Generation model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama host
    #[arg(long)]
    pub host: Option<String>,

    /// Ollama port
    #[arg(long)]
    pub port: Option<u16>,

    /// Also generate no-evidence and coarse-only answers for comparison
    #[arg(long)]
    pub compare: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: default (normal), -v (verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the answer)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive query loop
    Start,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose == 0 {
            Verbosity::Normal
        } else {
            Verbosity::Verbose
        }
    }

    /// Check that either a query or a subcommand was provided
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_none() && self.query.is_none() {
            return Err(
                "Query required. Use 'medrag <QUERY>' or 'medrag start' for the interactive loop."
                    .to_string(),
            );
        }

        if self.command.is_some() && self.query.is_some() {
            return Err("Cannot specify a query with a subcommand.".to_string());
        }

        Ok(())
    }
}

impl Verbosity {
    /// Check if progress spinners should be shown
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if retrieved/reranked passages should be printed
    pub fn show_passages(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            query: Some("test".to_string()),
            model: None,
            host: None,
            port: None,
            compare: false,
            config: None,
            verbose: 0,
            quiet: false,
            command: None,
        }
    }

    #[test]
    fn test_verbosity_quiet() {
        let mut args = base_args();
        args.quiet = true;
        assert_eq!(args.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        assert_eq!(base_args().verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let mut args = base_args();
        args.verbose = 1;
        assert_eq!(args.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_validate_success_with_query() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_validate_success_with_subcommand() {
        let mut args = base_args();
        args.query = None;
        args.command = Some(Commands::Start);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_fail_no_query_or_command() {
        let mut args = base_args();
        args.query = None;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_fail_both_query_and_command() {
        let mut args = base_args();
        args.command = Some(Commands::Config);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
        assert!(!Verbosity::Normal.show_passages());
        assert!(Verbosity::Verbose.show_passages());
    }
}
