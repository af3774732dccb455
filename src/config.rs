//! Configuration file handling.
//!
//! This module handles loading, validating and merging configuration from
//! `.veriscan.toml` files. The analyzer registry itself is configuration:
//! every analyzer descriptor is built from an `[[analyzers]]` entry.

use crate::agent::AnalyzerClass;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".veriscan.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Orchestration settings.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Stub analyzer settings.
    #[serde(default)]
    pub stub: StubConfig,

    /// Analyzer registry, in declaration order.
    #[serde(default = "default_analyzers")]
    pub analyzers: Vec<AnalyzerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            stub: StubConfig::default(),
            analyzers: default_analyzers(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum analyzers run for a single request.
    #[serde(default = "default_max_analyzers")]
    pub max_analyzers: usize,

    /// Analyzers used when no keyword matches.
    #[serde(default = "default_fallback")]
    pub default_analyzers: Vec<String>,

    /// Per-analyzer timeout in milliseconds. No timeout when unset.
    #[serde(default)]
    pub analyzer_timeout_ms: Option<u64>,

    /// Sessions older than this are swept.
    #[serde(default = "default_retention_minutes")]
    pub retention_minutes: u64,

    /// How often the background sweeper runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_analyzers: default_max_analyzers(),
            default_analyzers: default_fallback(),
            analyzer_timeout_ms: None,
            retention_minutes: default_retention_minutes(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl OrchestratorConfig {
    /// Retention horizon for the session sweep.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.retention_minutes as i64)
    }

    /// Interval between sweeper passes.
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn default_max_analyzers() -> usize {
    4
}

fn default_fallback() -> Vec<String> {
    vec!["news".to_string(), "fact".to_string()]
}

fn default_retention_minutes() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    300
}

/// Stub analyzer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StubConfig {
    /// Seed for the heuristic confidence buckets.
    #[serde(default)]
    pub seed: u64,
}

/// One analyzer entry in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Short unique token, e.g. "news".
    pub id: String,

    pub display_name: String,

    #[serde(default)]
    pub icon: String,

    /// Case-insensitive trigger substrings.
    pub keywords: Vec<String>,

    /// Simulated processing time of the stub.
    #[serde(default)]
    pub latency_ms: u64,

    #[serde(default)]
    pub class: AnalyzerClass,
}

impl AnalyzerConfig {
    fn new(
        id: &str,
        display_name: &str,
        icon: &str,
        keywords: &[&str],
        latency_ms: u64,
        class: AnalyzerClass,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            icon: icon.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            latency_ms,
            class,
        }
    }
}

fn default_analyzers() -> Vec<AnalyzerConfig> {
    vec![
        AnalyzerConfig::new(
            "news",
            "News Verification Agent",
            "📰",
            &["breaking", "news", "headline", "reported", "journalist", "exclusive"],
            1200,
            AnalyzerClass::Content,
        ),
        AnalyzerConfig::new(
            "fact",
            "Fact Checking Agent",
            "🔍",
            &["scientists", "study", "research", "percent", "statistic", "according to", "fact"],
            1500,
            AnalyzerClass::Content,
        ),
        AnalyzerConfig::new(
            "scam",
            "Scam Detection Agent",
            "🛡️",
            &[
                "lottery",
                "winner",
                "prize",
                "congratulations",
                "fee",
                "inheritance",
                "wire transfer",
                "gift card",
                "bitcoin",
            ],
            1000,
            AnalyzerClass::Fraud,
        ),
        AnalyzerConfig::new(
            "phishing",
            "Phishing Detection Agent",
            "🎣",
            &[
                "password",
                "login",
                "verify your account",
                "click here",
                "suspended",
                "bank account",
            ],
            900,
            AnalyzerClass::Link,
        ),
        AnalyzerConfig::new(
            "image",
            "Image Forensics Agent",
            "🖼️",
            &["image", "photo", "picture", "screenshot", ".jpg", ".png"],
            2000,
            AnalyzerClass::Media,
        ),
        AnalyzerConfig::new(
            "video",
            "Video Analysis Agent",
            "🎬",
            &["video", "deepfake", "footage", "clip", ".mp4"],
            2500,
            AnalyzerClass::Media,
        ),
    ]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check the invariants the orchestrator relies on.
    pub fn validate(&self) -> Result<()> {
        if self.analyzers.is_empty() {
            bail!("At least one analyzer must be configured");
        }

        let mut seen = HashSet::new();
        for analyzer in &self.analyzers {
            if analyzer.id.trim().is_empty() {
                bail!("Analyzer ids must not be empty");
            }
            if !seen.insert(analyzer.id.as_str()) {
                bail!("Duplicate analyzer id: {}", analyzer.id);
            }
            if analyzer.keywords.iter().all(|k| k.trim().is_empty()) {
                bail!("Analyzer '{}' has no trigger keywords", analyzer.id);
            }
        }

        if self.orchestrator.max_analyzers == 0 {
            bail!("max_analyzers must be at least 1");
        }

        if self.orchestrator.retention_minutes == 0 {
            bail!("retention_minutes must be at least 1");
        }

        if self.orchestrator.analyzer_timeout_ms == Some(0) {
            bail!("analyzer_timeout_ms must be at least 1 when set");
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(max) = args.max_analyzers {
            self.orchestrator.max_analyzers = max;
        }

        if let Some(timeout) = args.timeout_ms {
            self.orchestrator.analyzer_timeout_ms = Some(timeout);
        }

        if let Some(seed) = args.seed {
            self.stub.seed = seed;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
