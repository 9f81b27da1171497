use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bootstrap a minimal project inside the given temp directory.
fn init_project(dir: &TempDir) {
    let mut config = scaleops_core::config::Config::new("test-project");
    config.scoring.seed = Some(11);
    config.save(dir.path()).unwrap();
}

fn app(dir: &TempDir) -> axum::Router {
    scaleops_server::build_router(dir.path().to_path_buf()).unwrap()
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn example_responses() -> serde_json::Value {
    json!({
        "itemId": "1-1",
        "responses": {
            "who": "B2B SaaS founders",
            "what": "no GTM framework"
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn build_router_requires_init() {
    let dir = TempDir::new().unwrap();
    assert!(scaleops_server::build_router(dir.path().to_path_buf()).is_err());
}

#[tokio::test]
async fn analysis_returns_reconciled_result_and_records_history() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let (status, result) = post_json(&app, "/api/analysis", example_responses()).await;
    assert_eq!(status, StatusCode::OK);
    let score = result["score"].as_u64().unwrap();
    assert!(score <= 100);
    assert!(!result["strengths"].as_array().unwrap().is_empty());
    assert!(!result["weaknesses"].as_array().unwrap().is_empty());

    let dims = result["dimensions"].as_array().unwrap();
    let points: u64 = dims.iter().map(|d| d["score"].as_u64().unwrap()).sum();
    let max: u64 = dims.iter().map(|d| d["max"].as_u64().unwrap()).sum();
    assert_eq!(score, (200 * points + max) / (2 * max));

    let (status, history) = get(&app, "/api/items/1-1/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["result"]["score"].as_u64(), Some(score));
}

#[tokio::test]
async fn analysis_missing_required_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let (status, body) = post_json(
        &app,
        "/api/analysis",
        json!({ "itemId": "1-1", "responses": { "who": "founders" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("what"));
}

#[tokio::test]
async fn analysis_invalid_item_id_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let (status, _) = post_json(
        &app,
        "/api/analysis",
        json!({ "itemId": "Not Valid", "responses": { "who": "a", "what": "b" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let answers = json!({
        "who": { "fieldId": "who", "label": "Who?", "value": "founders" }
    });
    let (status, body) = post_json(
        &app,
        "/api/workspace/save",
        json!({ "itemId": "1-1", "answers": answers }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);
    assert_eq!(body["revision"], 1);

    let (status, snap) = get(&app, "/api/workspace/load/1-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["itemId"], "1-1");
    assert_eq!(snap["answers"], answers);
    assert!(snap["analysis"].is_null());
}

#[tokio::test]
async fn save_with_empty_payload_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let (status, _) = post_json(&app, "/api/workspace/save", json!({ "itemId": "1-1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn save_rejects_inconsistent_analysis() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let analysis = json!({
        "score": 95,
        "dimensions": [
            { "name": "Customer Clarity", "score": 15, "max": 30, "feedback": "" }
        ],
        "strengths": ["x"],
        "weaknesses": ["y"],
        "summary": "",
        "timestamp": "2026-03-14T09:30:00Z"
    });
    let (status, _) = post_json(
        &app,
        "/api/workspace/save",
        json!({ "itemId": "1-1", "analysis": analysis }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn save_rejects_dimension_totals_past_u32() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let analysis = json!({
        "score": 0,
        "dimensions": [
            { "name": "a", "score": 4294967295u64, "max": 4294967295u64, "feedback": "" },
            { "name": "b", "score": 4294967295u64, "max": 4294967295u64, "feedback": "" }
        ],
        "strengths": [],
        "weaknesses": [],
        "summary": "",
        "timestamp": "2026-03-14T09:30:00Z"
    });
    let (status, body) = post_json(
        &app,
        "/api/workspace/save",
        json!({ "itemId": "1-1", "analysis": analysis }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("does not match"));
}

#[tokio::test]
async fn save_rejects_analysis_without_dimensions() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let analysis = json!({
        "score": 42,
        "dimensions": [],
        "strengths": [],
        "weaknesses": [],
        "summary": "",
        "timestamp": "2026-03-14T09:30:00Z"
    });
    let (status, _) = post_json(
        &app,
        "/api/workspace/save",
        json!({ "itemId": "1-1", "analysis": analysis }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn saved_analysis_appears_in_history() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let answers = json!({
        "who": { "fieldId": "who", "label": "Who?", "value": "founders" }
    });
    let analysis = json!({
        "score": 90,
        "dimensions": [
            { "name": "Customer Clarity", "score": 27, "max": 30, "feedback": "" }
        ],
        "strengths": ["clear buyer"],
        "weaknesses": ["timing"],
        "summary": "Scored 90/100",
        "timestamp": "2026-03-14T09:30:00Z"
    });
    let (status, body) = post_json(
        &app,
        "/api/workspace/save",
        json!({ "itemId": "1-1", "answers": answers, "analysis": analysis }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revision"], 1);

    let (status, history) = get(&app, "/api/items/1-1/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["result"]["score"], 90);

    let (_, snap) = get(&app, "/api/workspace/load/1-1").await;
    assert_eq!(snap["answers"], answers);
    assert_eq!(snap["analysis"]["score"], 90);
}

#[tokio::test]
async fn load_unknown_item_is_empty_snapshot() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let (status, snap) = get(&app, "/api/workspace/load/fresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["revision"], 0);
    assert_eq!(snap["answers"], json!({}));
}

#[tokio::test]
async fn list_items_after_writes() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    post_json(&app, "/api/analysis", example_responses()).await;
    let (status, items) = get(&app, "/api/items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items, json!(["1-1"]));
}

#[tokio::test]
async fn export_pdf_without_renderer_falls_back_to_html() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);
    post_json(&app, "/api/analysis", example_responses()).await;

    let req = axum::http::Request::builder()
        .uri("/api/items/1-1/export/pdf")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-export-fallback"], "pdf");
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let disposition = response.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.contains("1-1-report-"));
    assert!(disposition.contains(".html"));
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("B2B SaaS founders"));
}

#[tokio::test]
async fn export_unknown_item_is_404() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let (status, _) = get(&app, "/api/items/ghost/export/html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_unknown_format_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = app(&dir);

    let (status, _) = get(&app, "/api/items/1-1/export/rtf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
