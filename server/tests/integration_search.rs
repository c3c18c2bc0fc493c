use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use docdex_core::persist::{save_index, IndexPaths};
use docdex_core::{DocumentSource, IndexBuilder, Section, TokenizerConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_index(dir: &std::path::Path) {
    let index = IndexBuilder::new(TokenizerConfig::default())
        .build(vec![
            DocumentSource {
                id: "azure_setup".into(),
                title: "Azure setup".into(),
                path: Some("azure_setup.md".into()),
                body: "create a storage account and upload data".into(),
                sections: vec![Section {
                    anchor: "create-a-datastore".into(),
                    title: "Create a datastore".into(),
                }],
            },
            DocumentSource {
                id: "plotting".into(),
                title: "Plotting".into(),
                path: Some("plotting.md".into()),
                body: "plot random images and masks".into(),
                sections: Vec::new(),
            },
        ])
        .unwrap();
    save_index(&IndexPaths::new(dir), &index).unwrap();
}

async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = docdex_server::build_app(&dir.path().to_string_lossy());

    let (status, json) = call(app, "/search?q=azure&k=5").await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["external_id"], "azure_setup");
    assert_eq!(json["total_hits"], 1);
}

#[tokio::test]
async fn unmatched_query_returns_empty_results() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = docdex_server::build_app(&dir.path().to_string_lossy());

    let (status, json) = call(app, "/search?q=xyz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn conjunctive_mode_is_selectable() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = docdex_server::build_app(&dir.path().to_string_lossy());

    let (status, json) = call(app, "/search?q=azure+plotting&mode=all").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn doc_endpoint_returns_sections() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = docdex_server::build_app(&dir.path().to_string_lossy());

    let (status, json) = call(app, "/doc/0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Azure setup");
    assert_eq!(json["sections"][0]["anchor"], "create-a-datastore");

    let app = docdex_server::build_app(&dir.path().to_string_lossy());
    let (status, _) = call(app, "/doc/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_index_serves_degraded() {
    let dir = tempdir().unwrap();
    let app = docdex_server::build_app(&dir.path().to_string_lossy());

    let (status, json) = call(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");

    let app = docdex_server::build_app(&dir.path().to_string_lossy());
    let (status, _) = call(app, "/search?q=azure").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn healthy_index_reports_ok() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = docdex_server::build_app(&dir.path().to_string_lossy());

    let (status, json) = call(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
