use analytics::{ReportBuilder, ReportSettings};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use configuration::{Config, Logging, OutputFormat, load_config};
use core_types::ReportSection;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod render;

/// The main entry point for the bridge program report.
fn main() {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Report(args) => handle_report(&cli.config, args),
        Commands::InitConfig => handle_init_config(&cli.config),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed.");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Capital flow, retention and impact analytics for a cross-chain bridge incentive program.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. Defaults are used if it does not exist.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the program report from a CSV ledger of bridge transfers.
    Report(ReportArgs),
    /// Write a default configuration file.
    InitConfig,
}

#[derive(Parser)]
struct ReportArgs {
    /// CSV export of bridge transfers.
    #[arg(long, short)]
    input: PathBuf,

    /// Only build one section of the report.
    #[arg(long, value_enum)]
    section: Option<SectionArg>,

    /// First day of the program (format: YYYY-MM-DD).
    #[arg(long)]
    program_start: Option<NaiveDate>,

    /// Last day of the program (format: YYYY-MM-DD).
    #[arg(long)]
    program_end: Option<NaiveDate>,

    /// Number of source chains to rank.
    #[arg(long)]
    top_chains: Option<usize>,

    /// Number of tokens to rank.
    #[arg(long)]
    top_tokens: Option<usize>,

    /// Bucket count of the holding-period distribution.
    #[arg(long)]
    bins: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SectionArg {
    Overview,
    UserBehavior,
    ProgramImpact,
}

impl From<SectionArg> for ReportSection {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Overview => ReportSection::Overview,
            SectionArg::UserBehavior => ReportSection::UserBehavior,
            SectionArg::ProgramImpact => ReportSection::ProgramImpact,
        }
    }
}

impl ReportArgs {
    /// Command-line flags win over the configuration file.
    fn apply_to(&self, config: &mut Config) {
        if let Some(start) = self.program_start {
            config.program.start_date = start;
        }
        if let Some(end) = self.program_end {
            config.program.end_date = end;
        }
        if let Some(n) = self.top_chains {
            config.report.top_chains = n;
        }
        if let Some(n) = self.top_tokens {
            config.report.top_tokens = n;
        }
        if let Some(bins) = self.bins {
            config.report.holding_period_bins = bins;
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Loads the ledger, builds the requested sections and prints them.
fn handle_report(config_path: &Path, args: ReportArgs) -> Result<()> {
    let mut config = load_config(config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    args.apply_to(&mut config);
    config.validate()?;

    let _log_guard = init_logging(&config.logging)?;

    let events = ingest::load_events_from_path(&args.input)
        .with_context(|| format!("Failed to load ledger from {:?}", args.input))?;
    let window = config.program.window()?;
    let settings = ReportSettings {
        top_chains: config.report.top_chains,
        top_tokens: config.report.top_tokens,
        holding_period_bins: config.report.holding_period_bins,
    };

    tracing::info!(
        events = events.len(),
        program_start = %config.program.start_date,
        program_end = %config.program.end_date,
        "Building report."
    );
    let builder = ReportBuilder::new(&events, window, settings);

    let (output, omitted) = match args.section {
        Some(section) => {
            let report = builder.build(section.into());
            let omitted = report.warnings().len();
            let output = match args.format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Table => render::render_section(&report),
            };
            (output, omitted)
        }
        None => {
            let report = builder.build_all();
            let omitted = report.warnings().count();
            let output = match args.format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Table => render::render_full(&report),
            };
            (output, omitted)
        }
    };
    tracing::info!(omitted_metrics = omitted, "Report built.");
    println!("{}", output);

    Ok(())
}

/// Writes the default configuration to `path`, refusing to overwrite.
fn handle_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{:?} already exists. Remove it first or edit it manually.", path);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {:?}", path))?;
    println!("Created {:?} with default settings.", path);
    Ok(())
}

/// Logs go to stderr, and also to a daily rolling file when a directory is configured.
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(settings: &Logging) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("Invalid log level {:?}", settings.level))?;
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "bridge-report.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_configuration() {
        let cli = Cli::parse_from([
            "bridge-report",
            "report",
            "--input",
            "ledger.csv",
            "--program-start",
            "2024-01-01",
            "--top-tokens",
            "7",
            "--section",
            "user-behavior",
            "--format",
            "json",
        ]);
        let Commands::Report(args) = cli.command else {
            panic!("expected the report command");
        };
        let mut config = Config::default();

        args.apply_to(&mut config);

        assert_eq!(config.program.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(config.program.end_date, NaiveDate::from_ymd_opt(2024, 7, 14).unwrap());
        assert_eq!(config.report.top_tokens, 7);
        assert_eq!(config.report.top_chains, 3);
        assert!(matches!(args.section, Some(SectionArg::UserBehavior)));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_path_defaults() {
        let cli = Cli::parse_from(["bridge-report", "init-config"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(matches!(cli.command, Commands::InitConfig));
    }
}
