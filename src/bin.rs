//! Binary entry point for `relay-bot`.
//!
//! This module provides the command-line interface for relay-bot with options
//! for configuration file paths and logging verbosity.  It initializes the
//! necessary components and runs the requested command.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use relay_bot::{
    base::{
        config::Config,
        types::{BotProfile, Void},
    },
    service::db::DbClient,
};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Relay-bot – relays chat questions through translation and a Q&A backend.
///
/// Configuration can come from `config.toml` or `RELAY_BOT_*` environment variables.
/// Each queued chat message is translated, answered, translated back, and
/// posted as a threaded reply on Feishu or Lark.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP/HTTP (configured via the standard `OTEL_EXPORTER_OTLP_*` variables).
    #[arg(long)]
    otlp: bool,
    /// The command to run (defaults to `serve`).
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve `POST /invoke` for queue payloads.
    Serve,
    /// Process one queue payload and print the resulting status.
    Handle {
        /// File holding the payload; stdin if omitted.
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Store a bot profile in the config table.
    Profile {
        /// Profile key; defaults to `config_table_key`.
        #[arg(long)]
        key: Option<String>,
        /// Secret identifier holding the app id.
        #[arg(long)]
        app_id_secret: String,
        /// Secret identifier holding the app secret.
        #[arg(long)]
        app_secret_secret: String,
    },
}

/// Main entry point for the relay-bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and runs the command.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer, if asked for.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("relay-bot");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => relay_bot::start(config).await,
        Command::Handle { event } => {
            let payload = match event {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut payload = String::new();
                    tokio::io::stdin().read_to_string(&mut payload).await?;
                    payload
                }
            };

            let status = relay_bot::handle_once(config, &payload).await?;
            println!("{}", serde_json::to_string(&status)?);

            if !status.is_success() {
                std::process::exit(1);
            }

            Ok(())
        }
        Command::Profile { key, app_id_secret, app_secret_secret } => {
            let key = key.unwrap_or_else(|| config.config_table_key.clone());
            let db = DbClient::surreal(&config).await?;

            db.put_bot_profile(&key, &BotProfile { app_id_secret, app_secret_secret }).await?;
            tracing::info!("Stored bot profile `{}`", key);

            Ok(())
        }
    }
}
