//! GAPIN command line client
//!
//! Exercises every SDK operation against a running gateway.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::{ConfigLoader, Overrides};
use gapin_sdk::{Client, generate_id, hash_data, make_request};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// GAPIN - publish and read events through the gateway
#[derive(Parser, Debug)]
#[command(name = "gapin")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long, env = "GAPIN_CONFIG")]
    config: Option<PathBuf>,

    /// Gateway base URL (e.g., http://localhost:3000)
    #[arg(long, env = "GAPIN_BASE_URL")]
    base_url: Option<String>,

    /// API key sent as x-api-key
    #[arg(long, env = "GAPIN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// HMAC secret for signed publishing
    #[arg(long, env = "GAPIN_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the health of the gateway
    Health,
    /// Print a freshly generated id
    Id,
    /// Print the hex BLAKE3 digest of DATA
    Hash { data: String },
    /// Publish a JSON object MESSAGE to TOPIC
    Publish {
        topic: String,
        message: String,
        /// Normalize, sign and send with the API key
        #[arg(long)]
        signed: bool,
    },
    /// Read recent events
    Read,
    /// GET an arbitrary URL and print its JSON body
    Get { url: String },
    /// Run health, id, hash, publish and read in sequence
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::debug!("Starting gapin v{}", env!("CARGO_PKG_VERSION"));

    run(args).await
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Local commands need no gateway configuration
    match &args.command {
        Command::Id => {
            println!("{}", generate_id());
            return Ok(());
        }
        Command::Hash { data } => {
            println!("{}", hex::encode(hash_data(data)));
            return Ok(());
        }
        Command::Get { url } => {
            print_json(&make_request(url).await?)?;
            return Ok(());
        }
        _ => {}
    }

    // Load configuration
    let overrides = Overrides {
        base_url: args.base_url,
        api_key: args.api_key,
        signing_secret: args.signing_secret,
    };
    let client = load_client(args.config.as_ref(), overrides)?;

    match args.command {
        Command::Health => print_json(&client.health_check().await?)?,
        Command::Publish {
            topic,
            message,
            signed,
        } => {
            let message = parse_message(&message)?;
            if signed {
                let resp = client.publish_signed_event(&topic, &message).await?;
                print_json(&serde_json::to_value(resp)?)?;
            } else {
                print_json(&client.publish_event(&topic, message).await?)?;
            }
        }
        Command::Read => print_json(&client.read_events().await?)?,
        Command::Demo => run_demo(&client).await?,
        Command::Id | Command::Hash { .. } | Command::Get { .. } => {}
    }

    Ok(())
}

/// Build a gateway client from the config file and CLI/env overrides.
fn load_client(config_path: Option<&PathBuf>, overrides: Overrides) -> anyhow::Result<Client> {
    let client_config = ConfigLoader::new(config_path, overrides)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::debug!(base_url = %client_config.base_url, "Configuration loaded");
    Ok(Client::from_config(client_config))
}

/// The canonical walkthrough: health, id, hash, publish, read.
async fn run_demo(client: &Client) -> anyhow::Result<()> {
    println!("Health check: {}", client.health_check().await?);
    println!("Generated ID: {}", generate_id());
    println!("Hashed data: {}", hex::encode(hash_data("test")));

    let mut message = Map::new();
    message.insert("key".into(), Value::String("value".into()));
    println!(
        "Publish event: {}",
        client.publish_event("test-topic", message).await?
    );
    println!("Read events: {}", client.read_events().await?);
    Ok(())
}

fn parse_message(raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("message must be valid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("message must be a JSON object, got {other}"),
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
