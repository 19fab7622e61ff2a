//! rural-search: holiday rental search for rural Andalusia
//!
//! This is the main entry point for the application.

use anyhow::{Context, Result};
use rural_search::{
    config,
    engines::EngineLoader,
    llm,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = match parse_args(std::env::args().skip(1))? {
        Some(path) => path,
        None => return Ok(()),
    };

    // Load configuration
    let settings = config::load(config_path.as_deref())?;

    // Initialize logging
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting rural-search v{}", rural_search::VERSION);
    info!("Loaded configuration for instance: {}", settings.general.instance_name);

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    // Load engines
    let registry = EngineLoader::load(&settings);
    info!("Loaded {} search engines", registry.len());

    let model = llm::from_settings(&settings, client.clone());

    // Bind address
    let addr = SocketAddr::new(
        settings
            .server
            .bind_address
            .parse()
            .context("invalid bind address")?,
        settings.server.port,
    );

    // Create application state
    let state = AppState::new(settings, registry, client, model);
    info!("Application state initialized");

    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse command line arguments.
///
/// Returns `Ok(None)` when the process should exit after printing help or version.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Option<PathBuf>>> {
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .with_context(|| format!("{} requires a file path", arg))?;
                config_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("rural-search {}", rural_search::VERSION);
                return Ok(None);
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }

    Ok(Some(config_path))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
rural-search v{}
Search service for rural holiday rentals in Andalusia

USAGE:
    rural-search [OPTIONS]

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    RURAL_SEARCH_SETTINGS_PATH   Path to settings.yml
    RURAL_SEARCH_DEBUG           Enable debug mode (true/false)
    RURAL_SEARCH_PORT            Server port
    RURAL_SEARCH_BIND_ADDRESS    Bind address
    GEMINI_API_KEY               Enables LLM query rewriting and structuring
    GOOGLE_MODEL                 Gemini model name
    SERPAPI_KEY                  Enables the SerpApi search provider
    BING_SEARCH_KEY              Bing Web Search subscription key
    BING_SEARCH_ENDPOINT         Bing Web Search endpoint
    RUST_LOG                     Log filter (default: info)
"#,
        rural_search::VERSION
    );
}
