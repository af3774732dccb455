//! VeriScan - multi-agent content verification
//!
//! A CLI front end over the verification core: it selects specialist
//! agents for a piece of content, runs them concurrently and prints the
//! aggregated verdict.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid config, failed verification, etc.)
//!   2 - At least one verification came back DANGEROUS

mod agent;
mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod orchestrator;
mod report;
mod session;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{OverallVerdict, VerificationOutcome};
use orchestrator::Orchestrator;
use session::SessionStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config first: `[general] verbose` feeds the log level.
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, config.general.verbose);

    info!("VeriScan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Verification failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .veriscan.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", config::CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to customize agents, keywords, latencies and limits.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = args.log_level(config_verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the requested mode. Returns the exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    config.validate().context("Invalid configuration")?;

    let store = Arc::new(SessionStore::new());
    let orchestrator = Orchestrator::from_config(
        &config,
        agent::build_registry(&config),
        store.clone(),
    );

    if args.dry_run {
        return handle_dry_run(&orchestrator, &args);
    }

    let verdicts = if args.stdin {
        run_interactive(&orchestrator, &args, &config).await?
    } else if args.demo {
        run_demo(&orchestrator, &args).await
    } else {
        let content = args.content.as_deref().unwrap_or_default();
        let outcome = verify_one(&orchestrator, &args, content, args.session_id.as_deref())
            .await
            .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;
        vec![outcome.overall.verdict]
    };

    if args.format == OutputFormat::Text && !args.quiet {
        print_stats(&orchestrator).await;
    }

    if verdicts.contains(&OverallVerdict::Dangerous) {
        return Ok(2);
    }
    Ok(0)
}

/// Handle --dry-run: show the selected agents for each input and exit.
fn handle_dry_run(orchestrator: &Orchestrator, args: &Args) -> Result<i32> {
    let inputs: Vec<&str> = if args.demo {
        agent::scenarios::SCENARIOS.iter().map(|s| s.content).collect()
    } else {
        args.content.as_deref().into_iter().collect()
    };

    println!("\n🔍 Dry run: selecting agents (no agents are run)...\n");

    let selector = orchestrator.selector();
    for input in inputs {
        let selected = selector.select(input);
        println!("   \"{}\"", input);
        for id in &selected {
            let name = selector
                .descriptors()
                .iter()
                .find(|d| &d.id == id)
                .map(|d| format!("{} {}", d.icon, d.display_name))
                .unwrap_or_else(|| id.clone());
            println!("     → {}", name);
        }
        if selector.contains_url(input) {
            println!("     (link detected)");
        }
        println!();
    }

    println!("✅ Dry run complete.");
    Ok(0)
}

/// Run every canned demo scenario in turn.
async fn run_demo(orchestrator: &Orchestrator, args: &Args) -> Vec<OverallVerdict> {
    let mut verdicts = Vec::new();

    for scenario in agent::scenarios::SCENARIOS {
        if args.format == OutputFormat::Text {
            println!("\n📨 {}", scenario.content);
        }
        match verify_one(orchestrator, args, scenario.content, None).await {
            Ok(outcome) => verdicts.push(outcome.overall.verdict),
            Err(e) => eprintln!("❌ {}", e.user_message()),
        }
    }

    verdicts
}

/// Chat-bot style loop: one verification per stdin line.
async fn run_interactive(
    orchestrator: &Orchestrator,
    args: &Args,
    config: &Config,
) -> Result<Vec<OverallVerdict>> {
    let sweeper = session::spawn_sweeper(
        orchestrator.store().clone(),
        config.orchestrator.sweep_interval(),
        config.orchestrator.retention(),
    );

    if !args.quiet && args.format == OutputFormat::Text {
        println!("🤖 Send a message to verify it. Commands: /stats, /session <id>, /quit");
    }

    let mut verdicts = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/stats", _) => print_stats(orchestrator).await,
            ("/session", id) => match orchestrator.session(id.trim()).await {
                Ok(session) => print!("{}", report::generate_session_summary(&session)),
                Err(e) => eprintln!("❌ {}", e.user_message()),
            },
            _ => {
                if let Err(message) = args.validate_content(line) {
                    eprintln!("⚠️  {}", message);
                    continue;
                }
                match verify_one(orchestrator, args, line, None).await {
                    Ok(outcome) => verdicts.push(outcome.overall.verdict),
                    Err(e) => eprintln!("❌ {}", e.user_message()),
                }
            }
        }
    }

    sweeper.abort();
    Ok(verdicts)
}

/// Verify one piece of content and print the result.
async fn verify_one(
    orchestrator: &Orchestrator,
    args: &Args,
    content: &str,
    session_id: Option<&str>,
) -> Result<VerificationOutcome, error::VerifyError> {
    let spinner = if args.format == OutputFormat::Text && !args.quiet {
        Some(create_spinner())
    } else {
        None
    };

    let result = orchestrator
        .verify(content, &args.requester, session_id)
        .await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match &result {
        Ok(outcome) => print_outcome(orchestrator, args, outcome),
        Err(e) => warn!("Verification rejected: {}", e),
    }

    result
}

fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Agents are analyzing...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_outcome(orchestrator: &Orchestrator, args: &Args, outcome: &VerificationOutcome) {
    match args.format {
        OutputFormat::Json => match report::generate_json_report(outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize outcome: {}", e),
        },
        OutputFormat::Text => {
            let descriptors = orchestrator.selector().descriptors();
            print!("\n{}", report::generate_text_report(outcome, descriptors));
        }
    }
}

async fn print_stats(orchestrator: &Orchestrator) {
    println!("📊 Active verifications: {}", orchestrator.active_count().await);
    println!("📊 Total verifications: {}", orchestrator.total_count());
    println!("📊 Sessions held: {}", orchestrator.store().len().await);
}

/// Where the configuration came from, logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    BuiltIn,
    Fallback(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => {
                info!("Loaded default config from {}", config::CONFIG_FILE_NAME)
            }
            ConfigSource::BuiltIn => debug!("No config file found, using defaults"),
            ConfigSource::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::BuiltIn)),
        Err(e) => Ok((Config::default(), ConfigSource::Fallback(e))),
    }
}
