//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use glossimport_core::pipeline::{ImportResult, ProgressReporter, import_glossary};
use glossimport_shared::{AppConfig, ImportSettings, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// glossimport: turn a CSV glossary export into a Glossarist dataset.
#[derive(Parser)]
#[command(
    name = "glossimport",
    version,
    about = "Import a CSV glossary export into a Paneron/Glossarist dataset.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.glossimport/glossimport.toml.
    #[arg(long, global = true, env = "GLOSSIMPORT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Import a CSV export into a new dataset.
    Import {
        /// CSV file to import.
        csv: PathBuf,

        /// Repository directory the dataset is created in.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Glossary (dataset) identifier.
        #[arg(short = 'i', long = "id")]
        glossary_id: String,

        /// Three-letter language code of the localized concepts.
        #[arg(short, long)]
        lang: Option<String>,

        /// Domain name the register is published under.
        #[arg(short, long)]
        domain: Option<String>,

        /// The CSV starts with a header row.
        #[arg(long)]
        header_row: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "glossimport=info",
        1 => "glossimport=debug",
        _ => "glossimport=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Import {
            csv,
            out,
            glossary_id,
            lang,
            domain,
            header_row,
        } => {
            let config = resolve_config(config_path.as_deref())?;
            let mut settings = ImportSettings::new(csv, glossary_id, &config);
            if let Some(out) = out {
                settings.output_dir = out;
            }
            if let Some(lang) = lang {
                settings.lang_code = lang;
            }
            if let Some(domain) = domain {
                settings.domain_name = domain;
            }
            settings.header_row |= header_row;
            cmd_import(settings).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_deref()).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_import(settings: ImportSettings) -> Result<()> {
    settings.validate()?;

    info!(
        csv = %settings.input_csv.display(),
        out = %settings.output_dir.display(),
        glossary = %settings.glossary_id,
        lang = %settings.lang_code,
        "importing glossary"
    );

    let reporter = Arc::new(CliProgress::new());
    let cancel = Arc::new(AtomicBool::new(false));

    let mut task = {
        let reporter = Arc::clone(&reporter);
        let cancel = Arc::clone(&cancel);
        tokio::task::spawn_blocking(move || {
            import_glossary(&settings, reporter.as_ref(), &cancel)
        })
    };

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupt received, stopping after the current concept");
            cancel.store(true, Ordering::Relaxed);
            task.await
        }
    };

    let outcome = joined.map_err(|e| eyre!("import task failed: {e}"))?;
    reporter.finish();
    let result = outcome?;

    print_summary(&result);
    Ok(())
}

fn print_summary(result: &ImportResult) {
    println!();
    println!("  Glossary imported successfully!");
    println!("  Dataset:  {}", result.dataset_path.display());
    println!("  Concepts: {}", result.concepts_written);
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn on_output(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn on_progress(&self, total: usize, completed: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
