//! Integration tests: grouping properties, the browsing state machine, the
//! HTTP surface and the sheets client against a local stand-in server.

use axum::Router;
use product_audit::structures::Row;

mod api_test;
mod grouping_test;

/// Header row in the `_V32` layout, including the spaced alias spellings.
pub const HEADER: &[&str] = &[
    "query",
    "cityname",
    "result_number",
    "display_id",
    "title",
    "specifications",
    "image",
    "search_page_url",
    "agent1_name_V32",
    "user_requirement_V32",
    "query_type_V32",
    "core_product_V32",
    "predicted_attributes_V32",
    "agent2_name_V32",
    "relevance_V32",
    "critical_relevance_V32",
    "relevance reasoning_V32",
    "critical_relevance_reasoning_V32",
    "superaudit_relevance",
    "date_V32",
    "workflow_V32",
];

/// One data line: key fields plus a tag that ends up as the result title.
pub fn line(query: &str, city: &str, title: &str) -> Vec<String> {
    HEADER
        .iter()
        .map(|column| match *column {
            "query" => query.to_string(),
            "cityname" => city.to_string(),
            "title" => title.to_string(),
            "result_number" => title.to_string(),
            "user_requirement_V32" => format!("{} for {}", query, city),
            "core_product_V32" => query.to_string(),
            "predicted_attributes_V32" => r#"{"color":"black"}"#.to_string(),
            "agent1_name_V32" => "query-agent".to_string(),
            "agent2_name_V32" => "product-agent".to_string(),
            "relevance_V32" => "Relevant".to_string(),
            "relevance reasoning_V32" => format!("why {}", title),
            "superaudit_relevance" => "Highly Relevant".to_string(),
            "date_V32" => "2025-01-01".to_string(),
            "workflow_V32" => "wf".to_string(),
            _ => String::new(),
        })
        .collect()
}

/// Header followed by one line per `(query, city, title)`.
pub fn sheet(lines: &[(&str, &str, &str)]) -> Vec<Vec<String>> {
    let mut grid = vec![HEADER.iter().map(|h| h.to_string()).collect()];
    grid.extend(lines.iter().map(|(q, c, t)| line(q, c, t)));
    grid
}

pub fn rows(lines: &[(&str, &str, &str)]) -> Vec<Row> {
    product_audit::normalization::normalize_rows(sheet(lines))
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
