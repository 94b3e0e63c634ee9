//! rawslot - Entry Point
//!
//! Runs the HTTP server always; runs the Telegram bot alongside it when a
//! token is configured. Both share one store through the façade.

use rawslot::{Config, SlotFacade};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("rawslot v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!("Public URL: {}", config.public_url);
    info!("Raw endpoint: {}", config.raw_url());

    let bot_enabled = config.bot_enabled();
    let facade = SlotFacade::new(config);

    if bot_enabled {
        // HTTP server in the background, bot polling in the foreground
        let server_facade = facade.clone();
        let server = tokio::spawn(async move {
            if let Err(e) = rawslot::server::run(server_facade).await {
                tracing::error!("HTTP server failed: {}", e);
            }
        });

        info!("Starting Telegram bot...");
        if let Err(e) = rawslot::telegram::run_bot(facade).await {
            // Bot failure is not fatal; the web interface keeps serving
            warn!("Telegram bot stopped: {} (web interface still available)", e);
            server.await?;
        } else {
            server.abort();
        }
    } else {
        info!("BOT_TOKEN not set - running web interface only");
        rawslot::server::run(facade).await?;
    }

    Ok(())
}
