//! Adminview main entry point

use adminview_api::{start_server, AppState};
use adminview_config::Config;
use adminview_core::{LoggingDispatcher, ScreenRegistry, Session};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "adminview")]
#[command(version = "0.1.0")]
#[command(about = "Admin console for fees, stores, payouts and transactions", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default: bool,

    /// Load every screen once and never poll
    #[arg(long)]
    no_refresh: bool,
}

fn load_config(path: &PathBuf) -> anyhow::Result<Config> {
    match Config::load(path.clone()) {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!("{}", e.to_details());
            Err(e).with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = load_config(&args.config)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    log::info!(
        "Config loaded: data path={}, page size={}",
        config.data.path.display(),
        config.pagination.page_size
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let session = Session::from_config(&config.session);
        if !session.is_logged_in() {
            log::warn!("session.token is empty; screens will stay empty until it is set");
        }

        let registry = Arc::new(ScreenRegistry::from_config(&config)?);
        for report in registry.refresh_all(&session).await {
            match (report.records, report.error) {
                (Some(count), _) => log::info!("{}: loaded {} record(s)", report.screen, count),
                (None, Some(e)) => log::warn!("{}: initial load failed: {}", report.screen, e),
                (None, None) => {}
            }
        }

        let pollers = if config.refresh.enabled && !args.no_refresh {
            registry.spawn_pollers(&session, Duration::from_secs(config.refresh.interval_secs))
        } else {
            Vec::new()
        };

        let state = AppState {
            registry,
            dispatcher: Arc::new(LoggingDispatcher::new()),
            session,
            config: config.clone(),
        };
        let served = start_server(state, shutdown_signal()).await;

        for poller in pollers {
            poller.shutdown().await;
        }

        served.context("HTTP server failed")
    })
}
