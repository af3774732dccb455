//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation of the submitted content.

use clap::Parser;
use std::path::PathBuf;

/// VeriScan - multi-agent content verification
///
/// Routes text to specialist verification agents (news, fact, scam,
/// phishing, image, video), runs them concurrently and folds their
/// verdicts into one overall verdict with a risk level.
///
/// Examples:
///   veriscan "NASA announces new Mars mission scheduled for 2026"
///   veriscan --format json "Send $500 processing fee to claim your prize"
///   veriscan --demo
///   veriscan --stdin --requester telegram-42
///   veriscan --dry-run "Check this video clip https://example.com/v"
///   veriscan --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Text to verify
    #[arg(value_name = "CONTENT")]
    pub content: Option<String>,

    /// Identifier of whoever submitted the content
    #[arg(long, default_value = "cli", env = "VERISCAN_REQUESTER")]
    pub requester: String,

    /// Reuse a specific session id instead of generating one
    #[arg(long, value_name = "ID")]
    pub session_id: Option<String>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .veriscan.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of agents per request
    #[arg(long, value_name = "COUNT")]
    pub max_analyzers: Option<usize>,

    /// Per-agent timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Seed for the stub agents' heuristic confidences
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum accepted content length in characters
    #[arg(long, default_value = "2000", value_name = "CHARS")]
    pub max_length: usize,

    /// Run the built-in demo scenarios
    #[arg(long, conflicts_with_all = ["content", "stdin"])]
    pub demo: bool,

    /// Read one request per line from stdin (chat-bot style)
    ///
    /// Lines starting with '/' are commands: /stats, /session <id>, /quit.
    #[arg(long, conflicts_with = "content")]
    pub stdin: bool,

    /// Show which agents would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .veriscan.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for verification results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.content.is_none() && !self.demo && !self.stdin {
            return Err("Provide CONTENT, --demo or --stdin".to_string());
        }

        if let Some(ref content) = self.content {
            self.validate_content(content)?;
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.max_analyzers == Some(0) {
            return Err("Max analyzers must be at least 1".to_string());
        }

        if self.timeout_ms == Some(0) {
            return Err("Timeout must be at least 1 millisecond".to_string());
        }

        if self.max_length == 0 {
            return Err("Max length must be at least 1".to_string());
        }

        if self.stdin && self.session_id.is_some() {
            return Err("--session-id cannot be combined with --stdin".to_string());
        }

        Ok(())
    }

    /// Check one piece of content against the input limits.
    pub fn validate_content(&self, content: &str) -> Result<(), String> {
        if content.trim().is_empty() {
            return Err("Content must not be empty".to_string());
        }

        let length = content.chars().count();
        if length > self.max_length {
            return Err(format!(
                "Content is too long ({} characters, maximum {})",
                length, self.max_length
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
