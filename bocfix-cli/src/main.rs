use anyhow::{Context, Result};
use bocfix_core::{SignatureVerifier, TransactionFixer, sign};
use bocfix_ingest::DescriptionParser;
use bocfix_ledger::FireflyClient;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod server;
mod state;

use config::Config;
use state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "bocfix",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BOCFIX_BUILD_SHA"), ")"),
    about = "Fixes Bank of Cyprus transaction dates in Firefly III"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the webhook server (default). Configured from the environment.
    Serve,

    /// Parse a BoC description and print the extracted fields as JSON
    Parse {
        description: String,
    },

    /// Print the Signature header value for a webhook body
    Sign {
        /// Body file, signed byte for byte
        file: PathBuf,

        #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,

        /// Unix seconds (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            run_server().await?;
        }

        Command::Parse { description } => {
            let fields = DescriptionParser::new()?.parse(&description);
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }

        Command::Sign {
            file,
            secret,
            timestamp,
        } => {
            let body = std::fs::read(&file).with_context(|| format!("read {}", file.display()))?;
            let ts = timestamp.unwrap_or_else(|| Utc::now().timestamp());
            println!("{}", sign(&body, ts, secret.as_bytes())?);
        }
    }

    Ok(())
}

async fn run_server() -> Result<()> {
    let config = Config::from_env().context("failed to build config")?;
    init_logging(config.log_level);
    tracing::debug!(?config, "configuration loaded");

    let ledger = FireflyClient::new(&config.firefly_url, &config.firefly_token)?;
    let verifier = SignatureVerifier::new(config.secret.clone()).with_max_age(config.max_age_secs);
    let state = AppState::new(verifier, TransactionFixer::new()?, Arc::new(ledger));

    if let Err(err) = server::serve(&config.bind_address(), state).await {
        tracing::error!(err = %format!("{err:#}"), "finished with error");
        return Err(err);
    }
    Ok(())
}

fn init_logging(level: Level) {
    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
