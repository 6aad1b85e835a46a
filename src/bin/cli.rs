//! Permit scraper CLI
//!
//! Fetches the council's permit listing once and stores new applications.

use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use permit_scraper::{
    error::Result,
    models::Config,
    pipeline,
    storage::PermitStore,
    utils::http::HttpFetcher,
};

/// permit-scraper - Council Planning Permit Scraper
#[derive(Parser, Debug)]
#[command(
    name = "permit-scraper",
    version,
    about = "Scrapes council planning-permit notices into SQLite"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the listing page and store new permits (default)
    Scrape {
        /// Listing page URL (overrides config)
        #[arg(long)]
        url: Option<String>,

        /// SQLite database path (overrides config)
        #[arg(long)]
        database: Option<PathBuf>,

        /// Abort the run on the first malformed listing item
        #[arg(long)]
        strict: bool,
    },

    /// Validate configuration and page schema
    Validate,

    /// Show database info
    Info,

    /// Print stored permits as JSON
    List {
        /// Maximum number of records to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command.unwrap_or(Command::Scrape {
        url: None,
        database: None,
        strict: false,
    }) {
        Command::Scrape {
            url,
            database,
            strict,
        } => {
            if let Some(url) = url {
                config.source.url = url;
            }
            if let Some(path) = database {
                config.storage.database_path = path.to_string_lossy().into_owned();
            }
            config.scrape.halt_on_error |= strict;
            config.validate()?;

            let fetcher = HttpFetcher::new(&config.fetcher)?;
            let today = Local::now().date_naive();
            let outcome = pipeline::run_scrape(&config, &fetcher, today)?;

            if outcome.failed > 0 {
                log::warn!(
                    "{} listing item(s) could not be processed",
                    outcome.failed
                );
            }
            log::info!("Scrape complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = pipeline::run_validate(&config) {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            let store = PermitStore::open(&config.storage.database_path, &config.storage.table)?;
            log::info!("Source: {}", config.source.url);
            log::info!("Database: {}", config.storage.database_path);
            log::info!("Table: {}", store.table());
            log::info!("Stored permits: {}", store.count()?);
        }

        Command::List { limit } => {
            let store = PermitStore::open(&config.storage.database_path, &config.storage.table)?;
            let records = store.list(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
