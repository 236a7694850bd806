mod check;
mod poll;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricebot")]
#[command(about = "Price tracking bot retrieval tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch one product page and print its name and price
    Check {
        url: String,
        /// Abort the whole fetch after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },
    /// Validate a product URL and print its canonical form
    Validate {
        url: String,
        /// Also confirm the page exists with a HEAD request
        #[arg(long)]
        network: bool,
    },
    /// Check every tracked product and report price changes
    Poll {
        /// Run a single pass and exit
        #[arg(long)]
        once: bool,
        /// Seconds between passes
        #[arg(long, default_value_t = 3600)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pricebot_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(env = %config.env, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Check { url, deadline_secs }) => {
            check::run_check(&config, &url, deadline_secs).await?;
        }
        Some(Commands::Validate { url, network }) => {
            check::run_validate(&config, &url, network).await?;
        }
        Some(Commands::Poll {
            once,
            interval_secs,
        }) => {
            poll::run_poll(&config, once, interval_secs).await?;
        }
        None => println!("pricebot ready; see --help for commands"),
    }

    Ok(())
}
