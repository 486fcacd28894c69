mod agent;
mod config;
mod memory;
mod platform;
mod responses;
mod scheduler;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::agent::SessionOptions;
use crate::config::Config;
use crate::platform::terminal::Terminal;
use crate::scheduler::{DelayScheduler, ImmediateScheduler, TokioScheduler};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so the chat on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,healthbot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let explicit_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match &explicit_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                Config::load(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            } else {
                warn!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
                Config::default()
            }
        }
    };

    let responses = Arc::new(config.response_table()?);
    info!("Configuration loaded successfully");
    info!("  Reply delay: {:?}", config.reply_delay());
    info!("  Response rules: {}", responses.len());

    // A zero delay answers inline instead of going through the timer
    let scheduler: Arc<dyn DelayScheduler> = if config.reply_delay().is_zero() {
        Arc::new(ImmediateScheduler)
    } else {
        Arc::new(TokioScheduler::from_current()?)
    };
    let options = SessionOptions {
        reply_delay: config.reply_delay(),
        greeting: config.greeting().map(str::to_string),
    };

    let terminal = Terminal::new(
        responses,
        scheduler,
        options,
        config.general.assistant_name.clone(),
        config.chat.wrap_width,
    );

    terminal
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    Ok(())
}
