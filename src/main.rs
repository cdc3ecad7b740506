use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use variant_flows::locators::{catalog, CatalogEntry};
use verdictprobe_cli::{run_with_chromium, AppConfig, RunOutcome};

/// VerdictProbe - verify a variant's germline classification verdict in a real browser
#[derive(Parser)]
#[command(author, about, long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ", built ", env!("BUILD_DATE"), ")"))]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    /// Log output format
    #[arg(long, default_value = "human")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the germline classification scenario
    Run(RunArgs),

    /// Print the locator catalog
    Locators(LocatorsArgs),

    /// Print the effective configuration as YAML
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Variant to search, e.g. BRAF:V600E
    #[arg(long)]
    variant: Option<String>,

    /// Site base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Screenshot directory
    #[arg(long, value_name = "DIR")]
    artifacts: Option<PathBuf>,
}

#[derive(Args)]
struct LocatorsArgs {
    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug, cli.log_format)?;
    info!("Starting VerdictProbe v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Locators(args) => cmd_locators(args),
        Commands::Config => match load_config(cli.config.as_ref()).await {
            Ok(config) => cmd_config(&config),
            Err(e) => Err(e),
        },
        Commands::Run(args) => match load_config(cli.config.as_ref()).await {
            Ok(config) => cmd_run(args, config).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(level: &str, debug: bool, format: LogFormat) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout stays clean for command output
    match format {
        LogFormat::Human => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    Ok(())
}

async fn load_config(config_path: Option<&PathBuf>) -> Result<AppConfig> {
    let mut config = AppConfig::load(config_path.map(PathBuf::as_path)).await?;
    config.apply_env_overrides();
    Ok(config)
}

async fn cmd_run(args: RunArgs, mut config: AppConfig) -> Result<()> {
    if args.headed {
        config.browser.headless = Some(false);
    }
    if let Some(variant) = args.variant {
        config.scenario.variant = variant;
    }
    if let Some(base_url) = args.base_url {
        config.scenario.base_url = base_url;
    }
    if let Some(dir) = args.artifacts {
        config.artifacts.dir = dir;
    }

    info!(
        variant = %config.scenario.variant,
        base_url = %config.scenario.base_url,
        "running germline classification scenario"
    );
    let outcome = run_with_chromium(&config).await?;

    match &outcome {
        RunOutcome::Passed { report, evidence } => {
            println!(
                "PASSED: {} shows '{}' on {}",
                config.scenario.variant,
                report.observation.text.as_deref().unwrap_or_default(),
                report
                    .observation
                    .background
                    .map(|rgb| rgb.to_string())
                    .unwrap_or_default()
            );
            println!("Flow: {}", report.trace);
            if let Some(path) = evidence {
                println!("Screenshot saved: {}", path.display());
            }
        }
        RunOutcome::Failed { error, evidence } => {
            println!("FAILED: {error}");
            if let Some(trace) = error.trace() {
                println!("Flow: {trace}");
            }
            if let Some(path) = evidence {
                println!("Failure screenshot saved: {}", path.display());
            }
        }
    }

    if !outcome.passed() {
        std::process::exit(outcome.exit_code());
    }
    Ok(())
}

fn cmd_locators(args: LocatorsArgs) -> Result<()> {
    let entries = catalog();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for CatalogEntry {
        name,
        primary,
        fallback,
    } in &entries
    {
        println!("{name:<width$}  {primary}");
        if let Some(fallback) = fallback {
            println!("{:<width$}  fallback {fallback}", "");
        }
    }
    Ok(())
}

fn cmd_config(config: &AppConfig) -> Result<()> {
    println!("{}", config.to_yaml()?);
    Ok(())
}
