use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{Context, Result};
use log::{error, info};

use openrouter_search::config::Config;
use openrouter_search::llm::OpenRouterClient;
use openrouter_search::mcp::McpServer;
use openrouter_search::tools::ToolGateway;

mod cli;

use cli::Cli;

fn setup_logging() {
    // stdout carries protocol frames, so logs must only ever go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        "Upstream {} with model {} (credential from ${})",
        config.upstream.endpoint, config.upstream.model, config.upstream.api_key_env
    );

    let client = OpenRouterClient::new(config.upstream.clone()).context("Failed to create OpenRouter client")?;
    let gateway = ToolGateway::new(Arc::new(client));
    let server = McpServer::new(gateway, config.server);

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, shutting down");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    info!("openrouter-search-server running on stdio");
    server.serve_stdio().await.context("Server failed")?;

    info!("Session ended");
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments first so --help/--version work without side effects
    let _cli = Cli::parse();

    setup_logging();

    let config = Config::from_env();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(run_server(config));

    // A pending stdin read sits on a blocking thread that cannot be interrupted
    runtime.shutdown_timeout(Duration::from_millis(250));

    result
}
