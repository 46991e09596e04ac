use history_hex::application::device::device_id;
use history_hex::application::history_service::HistoryService;
use history_hex::application::persisted_store::{KeyPolicy, PersistedStore, PolicyTable};
use history_hex::config::Config;
use history_hex::domain::order::ORDER_HISTORY_KEY;
use history_hex::inbound::http::{HttpServer, HttpServerConfig};
use history_store::{build_durable, CookieJar};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / SERVER_PORT when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let durable = build_durable(config.database_url.as_deref()).await?;
    let policies = PolicyTable::new().with_policy(
        ORDER_HISTORY_KEY,
        KeyPolicy::cookie_backed_days(config.history_ttl_days),
    );
    let store = PersistedStore::new(CookieJar::new(), durable, policies);

    let device = device_id(&store).await;
    tracing::info!(%device, "device identity ready");

    let service = HistoryService::new(store);
    service.ensure_persistence().await;

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(service, server_cfg).await?;
    http.run().await
}
