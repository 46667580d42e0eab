use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sitegen::cli::Args;
use sitegen::config::Config;
use sitegen::provider::HttpCompletionClient;
use sitegen::server;
use sitegen::service::BundleService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sitegen=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = Arc::new(Config::from_args(&args));

    if config.api_url.is_none() || config.api_key.is_none() {
        tracing::warn!("completion endpoint URL or API key not set; /api/generate will answer 500");
    }

    let client = Arc::new(HttpCompletionClient::new(config.timeout_secs));
    let service = Arc::new(BundleService::new(config.clone(), client));
    let app = server::router(service, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, model = %config.model, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
