use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::history_service::HistoryService;
use crate::errors::AppError;
use history_types::domain::order::{Order, OrderStatus};
use history_types::ports::storage::StorageBackend;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

pub struct HttpServer<C, D>
where
    C: StorageBackend,
    D: StorageBackend,
{
    pub service: Arc<HistoryService<C, D>>,
    pub config: HttpServerConfig,
}

#[derive(Deserialize)]
pub struct RecordOrderRequest {
    pub id: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Serialize)]
struct RecordOrderResponse {
    id: String,
    status: OrderStatus,
}

impl From<Order> for RecordOrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            status: o.status,
        }
    }
}

impl<C, D> HttpServer<C, D>
where
    C: StorageBackend,
    D: StorageBackend,
{
    pub async fn new(
        service: HistoryService<C, D>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        let svc = self.service.clone();
        let app = Router::new()
            .route("/health", get(health))
            .route("/history", post(record_order::<C, D>))
            .route("/history", get(list_history::<C, D>))
            .route("/history", delete(clear_history::<C, D>))
            .route("/history/{id}", get(get_order::<C, D>))
            .route("/history/{id}/payment", post(mark_paid::<C, D>))
            // The consumer is a browser app served from another origin.
            .layer(CorsLayer::permissive())
            .layer(trace_layer)
            .with_state(svc);

        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}

async fn record_order<C, D>(
    State(service): State<Arc<HistoryService<C, D>>>,
    Json(payload): Json<RecordOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<RecordOrderResponse>), AppError>
where
    C: StorageBackend,
    D: StorageBackend,
{
    let mut order = match payload.id {
        Some(id) => Order::new(id).map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => Order::with_generated_id(),
    };
    let mut details = payload.details;
    // Lifecycle fields are owned by the service, not the caller.
    for reserved in ["id", "isPaid", "status"] {
        details.remove(reserved);
    }
    order.extra = details;
    let recorded = service.record(order).await;
    Ok((axum::http::StatusCode::CREATED, Json(recorded.into())))
}

async fn list_history<C, D>(
    State(service): State<Arc<HistoryService<C, D>>>,
) -> Json<Vec<Order>>
where
    C: StorageBackend,
    D: StorageBackend,
{
    Json(service.load().await)
}

async fn get_order<C, D>(
    State(service): State<Arc<HistoryService<C, D>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError>
where
    C: StorageBackend,
    D: StorageBackend,
{
    match service.find(&id).await {
        Some(order) => Ok(Json(order)),
        None => Err(AppError::NotFound(format!("order {}", id))),
    }
}

async fn mark_paid<C, D>(
    State(service): State<Arc<HistoryService<C, D>>>,
    Path(id): Path<String>,
) -> axum::http::StatusCode
where
    C: StorageBackend,
    D: StorageBackend,
{
    // A payment for an unknown or never-persisted order is a silent no-op.
    service.mark_paid(&id).await;
    axum::http::StatusCode::NO_CONTENT
}

async fn clear_history<C, D>(
    State(service): State<Arc<HistoryService<C, D>>>,
) -> axum::http::StatusCode
where
    C: StorageBackend,
    D: StorageBackend,
{
    service.clear().await;
    axum::http::StatusCode::NO_CONTENT
}
