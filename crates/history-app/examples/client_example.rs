///  To run :
///  cargo r --example client_example
use history_client::{HistoryClient, RecordOrderRequest};
use history_hex::application::history_service::HistoryService;
use history_hex::application::persisted_store::{KeyPolicy, PersistedStore, PolicyTable};
use history_hex::domain::order::ORDER_HISTORY_KEY;
use history_hex::inbound::http::{HttpServer, HttpServerConfig};
use history_store::{build_durable, CookieJar};
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Start server on ephemeral port.
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Use a temp file-backed SQLite DB so the durable copy is a real file.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("history.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let durable = build_durable(Some(&db_url)).await?;
    let policies =
        PolicyTable::new().with_policy(ORDER_HISTORY_KEY, KeyPolicy::cookie_backed_days(30));
    let service = HistoryService::new(PersistedStore::new(CookieJar::new(), durable, policies));
    service.ensure_persistence().await;

    let server = HttpServer::new(
        service,
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Use client against the running server.
    let client = HistoryClient::new(&addr)?;

    let first = client
        .record_order(RecordOrderRequest {
            id: Some("tbl4-1".into()),
            details: serde_json::Map::new(),
        })
        .await?;
    println!("Recorded order id={}", first.id);

    let mut details = serde_json::Map::new();
    details.insert("table".into(), serde_json::json!(4));
    details.insert("total".into(), serde_json::json!(18.5));
    let second = client
        .record_order(RecordOrderRequest { id: None, details })
        .await?;
    println!("Recorded order id={}", second.id);

    client.mark_paid(&first.id).await?;

    let history = client.list_history().await?;
    println!("History holds {} orders:", history.len());
    for order in &history {
        println!(
            "  {} paid={} status={:?}",
            order.id, order.is_paid, order.status
        );
    }
    assert!(history[0].is_paid);
    assert!(!history[1].is_paid);

    client.clear_history().await?;
    assert!(client.list_history().await?.is_empty());
    println!("History cleared");

    handle.abort();
    Ok(())
}
