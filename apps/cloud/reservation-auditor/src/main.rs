//! Reservation Auditor
//!
//! Compares purchased AWS capacity reservations with running EC2,
//! ElastiCache, RDS and Redshift capacity across regions, surfacing unused
//! reservations and unreserved running units.
//! Can run as a one-shot audit or on a cron schedule.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_reservations::CategorySet;
use eyre::Result;
use tracing::info;

mod auditor;
mod config;
mod providers;
mod render;

use auditor::Auditor;
use config::Config;
use render::OutputFormat;

#[derive(Parser)]
#[command(name = "reservation-auditor")]
#[command(about = "Compare AWS capacity reservations with running capacity")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a one-time audit and print the report
    Audit {
        /// Categories to audit (ec2, elasticache, rds, redshift). Defaults to AUDIT_CATEGORIES or all.
        #[arg(short, long)]
        categories: Option<CategorySet>,

        /// Regions to audit. Defaults to AWS_REGIONS.
        #[arg(short = 'R', long, value_delimiter = ',')]
        regions: Option<Vec<String>>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Only show class keys with unused reservations or unreserved units
        #[arg(short, long)]
        mismatched_only: bool,
    },

    /// Run audits on a schedule, printing each report
    Schedule {
        /// Cron expression for scheduling (default: every 6 hours)
        #[arg(short, long, default_value = "0 0 */6 * * *")]
        cron: String,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Only show class keys with unused reservations or unreserved units
        #[arg(short, long)]
        mismatched_only: bool,
    },

    /// Show the resolved configuration (credentials redacted)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Audit {
            categories,
            regions,
            format,
            mismatched_only,
        } => {
            let config = config.with_overrides(categories, regions, format, mismatched_only)?;
            info!(
                categories = %config.categories,
                regions = ?config.regions,
                "Starting one-time reservation audit"
            );

            let auditor = Auditor::new(config).await;
            let output = auditor.audit_and_render().await?;
            println!("{output}");
        }

        Commands::Schedule {
            cron,
            format,
            mismatched_only,
        } => {
            let config = config.with_overrides(None, None, format, mismatched_only)?;
            let auditor = Auditor::new(config).await;
            info!(
                categories = %auditor.config().categories,
                regions = ?auditor.config().regions,
                "Scheduling reservation audits"
            );
            auditor.run_scheduled(&cron).await?;
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
