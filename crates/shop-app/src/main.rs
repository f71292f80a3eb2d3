use shop_hex::config::Config;
use shop_hex::inbound::http::{HttpServer, HttpServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for SERVICE / SERVER_PORT / DATA_PATH when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = Config::from_env()?;
    tracing::info!(service = %config.service, storage = ?shop_app::backend(&config), "booting");
    let api = shop_app::build_api(&config).await?;

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(api, server_cfg).await?;
    http.run().await
}
