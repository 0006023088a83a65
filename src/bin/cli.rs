//! Stock Monitor CLI
//!
//! Local execution entry point. For AWS Lambda, use `stock-monitor-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stock_monitor::{
    config::{load_config, load_mail_credentials},
    driver::WebDriverBrowser,
    error::Result,
    models::Config,
    pipeline::{self, Monitor},
    services::{AvailabilityProber, Notifier, SmtpMailer},
    storage::{LocalStatusStore, StatusStore},
};

/// stock-monitor - storefront availability watcher
#[derive(Parser, Debug)]
#[command(
    name = "stock-monitor",
    version,
    about = "Emails you when a product comes back in stock"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "stock-monitor.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check on an interval forever, emailing on status changes
    Watch,

    /// Check once without stored state, emailing if in stock
    Check {
        /// Keep checking until the product is in stock, then exit
        #[arg(long)]
        until_in_stock: bool,
    },

    /// Show the stored status record
    Status,

    /// Validate configuration and credentials
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_prober(config: &Config) -> AvailabilityProber<WebDriverBrowser> {
    AvailabilityProber::new(WebDriverBrowser::new(&config.browser), config)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Stock monitor initializing...");

    let config = load_config(&cli.config)?;
    log::info!("Watching {}", config.product.url);

    match cli.command {
        Command::Watch => {
            let credentials = load_mail_credentials()?;
            let mailer = SmtpMailer::new(&config.mail, &credentials)?;
            let notifier = Notifier::new(mailer, &credentials, config.product.clone());
            let store = LocalStatusStore::new(&config.monitor.state_file);

            let mut monitor = Monitor::start(
                build_prober(&config),
                notifier,
                store,
                config.monitor.poll_interval(),
            )
            .await;
            monitor.run().await;
        }

        Command::Check { until_in_stock } => {
            let credentials = load_mail_credentials()?;
            let mailer = SmtpMailer::new(&config.mail, &credentials)?;
            let notifier = Notifier::new(mailer, &credentials, config.product.clone());
            let prober = build_prober(&config);

            let report = if until_in_stock {
                pipeline::check_until_in_stock(&prober, &notifier, config.monitor.poll_interval())
                    .await
            } else {
                pipeline::check_once(&prober, &notifier).await
            };
            println!("{}", report.summary());
        }

        Command::Status => {
            let store = LocalStatusStore::new(&config.monitor.state_file);
            let record = store.load().await;
            log::info!("State file: {}", store.path().display());
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK");

            if let Err(e) = load_mail_credentials() {
                log::error!("Credential check failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Mail credentials present");

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
