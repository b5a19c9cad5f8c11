use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::service::AuditService;
use crate::sheets::SourceError;
use crate::structures::{Envelope, Group, Row};

#[derive(Clone)]
pub struct AppState {
    pub service: AuditService,
}

#[derive(Debug, Deserialize)]
pub struct SheetsQuery {
    #[serde(default)]
    sheet: Option<String>,
    #[serde(default)]
    range: Option<String>,
}

/// Full application: routes plus logging, panic and CORS layers.
pub fn app(service: AuditService) -> Router {
    with_middleware(routes(service))
}

/// API Routes
pub fn routes(service: AuditService) -> Router {
    Router::new()
        .route("/api/product-audit", get(product_audit))
        .route("/api/sheets", get(raw_sheets))
        .route("/api/health", get(health))
        .fallback(not_found)
        .with_state(AppState { service })
}

pub fn with_middleware(router: Router) -> Router {
    router
        .layer(middleware::from_fn(log_requests))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
}

async fn log_requests(request: Request, next: Next) -> Response {
    info!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::<()>::failure("Internal server error")),
    )
        .into_response()
}

fn source_failure<T>(e: SourceError) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(Envelope::failure(e.to_string())))
}

// Handlers

async fn product_audit(State(state): State<AppState>) -> (StatusCode, Json<Envelope<Vec<Group>>>) {
    match state.service.get_grouped_data().await {
        Ok(groups) => (StatusCode::OK, Json(Envelope::ok(groups))),
        Err(e) => source_failure(e),
    }
}

async fn raw_sheets(
    State(state): State<AppState>,
    Query(params): Query<SheetsQuery>,
) -> (StatusCode, Json<Envelope<Vec<Row>>>) {
    match state
        .service
        .get_raw_rows(params.sheet.as_deref(), params.range.as_deref())
        .await
    {
        Ok(rows) => (StatusCode::OK, Json(Envelope::ok(rows))),
        Err(e) => source_failure(e),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn not_found() -> (StatusCode, Json<Envelope<()>>) {
    (StatusCode::NOT_FOUND, Json(Envelope::failure("Endpoint not found")))
}
