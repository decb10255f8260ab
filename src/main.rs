//! Price agent: run one tool-assisted query against the model.
//!
//! Usage:
//!   price-agent                      Run the built-in sample query
//!   price-agent "What is 15% of 2500?"
//!   price-agent --config ./agent.toml --log-level debug

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use price_agent::agent::{Agent, Conversation};
use price_agent::config;
use price_agent::provider::OpenAiResponsesClient;

const SAMPLE_QUERY: &str =
    "What is the price of Redmi Note 10S 8GB/128GB? And also, what is the stock price of TSLA?";

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "price-agent")]
#[command(version)]
#[command(about = "Tool-calling agent over the OpenAI Responses API")]
struct Cli {
    /// Question to ask. Defaults to the sample price query.
    query: Option<String>,

    /// Path to the TOML config file.
    #[arg(long)]
    config: Option<String>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    config::load_dotenv();

    let config_path = cli
        .config
        .as_deref()
        .map(config::expand_path)
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging (stderr, so stdout carries only the answer)
    let log_level = cli.log_level.as_deref().unwrap_or(&cfg.log_level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let api_key = cfg.api_key()?;
    let provider = OpenAiResponsesClient::new(&cfg.api_base_url, &api_key);
    let agent = Agent::from_config(provider, &cfg)?;

    let query = cli.query.as_deref().unwrap_or(SAMPLE_QUERY);
    let mut conversation = Conversation::new();
    let outcome = agent.run(&mut conversation, query).await?;

    println!("\n{}", "--- FINAL RESPONSE ---".bold());
    println!("{}", outcome.final_text);
    println!("{}\n", "----------------------".bold());

    Ok(())
}
