use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use product_audit::api;
use product_audit::config::ColumnMap;
use product_audit::service::AuditService;
use product_audit::sheets::MemorySource;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

fn app_with(source: MemorySource) -> Router {
    api::app(AuditService::new(Arc::new(source), "Sheet1", ColumnMap::default()))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_product_audit_endpoint() {
    let app = app_with(MemorySource::new(crate::sheet(&[
        ("shoes", "NY", "1"),
        ("shoes", "NY", "2"),
        ("shoes", "LA", "3"),
        ("shoes", "NY", "4"),
    ])));

    let (status, json) = get_json(app, "/api/product-audit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());

    let data = json["data"].as_array().unwrap();
    let counts: Vec<u64> = data
        .iter()
        .map(|g| g["product_agent_response"]["total_results"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![2, 1, 1]);
    assert_eq!(data[1]["city"], "LA");
}

#[tokio::test]
async fn test_product_audit_source_failure() {
    let app = app_with(MemorySource::failing("Requested entity was not found."));

    let (status, json) = get_json(app, "/api/product-audit").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        serde_json::json!({"success": false, "error": "Requested entity was not found."})
    );
}

#[tokio::test]
async fn test_empty_sheet_is_success() {
    let app = app_with(MemorySource::new(Vec::new()));

    let (status, json) = get_json(app, "/api/product-audit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_raw_sheets_endpoint() {
    let app = app_with(MemorySource::new(crate::sheet(&[("shoes", "NY", "1")])));

    let (status, json) = get_json(app, "/api/sheets?sheet=Sheet1&range=A1:Z").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["query"], "shoes");
    assert_eq!(rows[0]["cityname"], "NY");
    assert_eq!(rows[0]["image"], "");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_with(MemorySource::new(Vec::new()));

    let (status, json) = get_json(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["message"], "Server is running");

    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_unknown_path_envelope() {
    let app = app_with(MemorySource::new(Vec::new()));

    for uri in ["/nope", "/api/unknown"] {
        let (status, json) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, serde_json::json!({"success": false, "error": "Endpoint not found"}));
    }
}

#[tokio::test]
async fn test_panic_becomes_internal_error_envelope() {
    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    let app = api::with_middleware(Router::new().route("/boom", get(boom)));

    let (status, json) = get_json(app, "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, serde_json::json!({"success": false, "error": "Internal server error"}));
}

#[tokio::test]
async fn test_cors_headers_present() {
    let app = app_with(MemorySource::new(Vec::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().contains_key("access-control-allow-origin"));
}
