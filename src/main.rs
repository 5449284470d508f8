use clap::Parser;
use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use storefront_scraper::api::{self, AppState};
use storefront_scraper::config::AppConfig;
use storefront_scraper::{BrowserFetcher, BrowserSession, SmartFetcher, StaticFetcher};

mod args;
use args::{Args, DEFAULT_CONFIG_FILE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = load_config(&args)?;
    ::log::info!(
        "Configuration loaded: {} categories, WebDriver at {}",
        config.batch.categories.len(),
        config.browser.webdriver_url
    );

    let session = Arc::new(BrowserSession::new(config.browser.clone()));
    let browser = Arc::new(BrowserFetcher::new(session.clone()));
    let smart = Arc::new(SmartFetcher::new(
        StaticFetcher::new(&config.fetch)?,
        browser.clone(),
    ));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let base_path = config.server.base_path.clone();

    let state = Arc::new(AppState {
        config,
        smart,
        browser,
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    ::log::info!("Server listening on {}", addr);
    ::log::info!("Status: http://{}{}/status", addr, base_path);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    ::log::info!("Server closed");
    session.shutdown().await;

    Ok(())
}

/// Reads the config file (if any), then applies environment and CLI overrides
fn load_config(args: &Args) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            AppConfig::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => AppConfig::default(),
    };

    config.apply_env()?;

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    Ok(config)
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            ::log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                ::log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    ::log::info!("Shutting down server...");
}
