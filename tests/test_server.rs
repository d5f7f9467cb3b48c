//! Integration test: Server API endpoints

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use stock_ann::lifecycle::LifecycleConfig;
use stock_ann::server::{create_router, AppState, ServerConfig};
use tower::ServiceExt;

const BOUNDARY: &str = "stockannboundary";

fn test_app() -> axum::Router {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_upload_size: 10 * 1024 * 1024,
    };
    let state = Arc::new(AppState::new(config, LifecycleConfig::default()));
    create_router(state)
}

fn prices(rows: usize) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for i in 0..rows {
        let open = 250.0 + (i as f64 / 6.0).sin() * 4.0;
        out.push_str(&format!(
            "2023-{:02}-{:02},{:.2},{:.2},{:.2},{:.2},{}\n",
            i / 28 + 1,
            i % 28 + 1,
            open,
            open + 2.0,
            open - 2.5,
            open + 0.4,
            1_000_000 + (i % 13) * 25_000
        ));
    }
    out
}

fn upload(uri: &str, file_name: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = file_name,
        c = content
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn predict_request(features: &[f64]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "features": features }).to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["endpoints"]["POST /train"].is_string());
}

#[tokio::test]
async fn test_health_without_model() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], false);
    assert!(body["uptime_secs"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_endpoints_before_train_return_404() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/model/info").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["kind"], "not_found");

    let response = app.clone().oneshot(predict_request(&[1.0, 2.0, 3.0, 4.0])).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(upload("/evaluate", "prices.csv", &prices(20)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_train_predict_evaluate_flow() {
    let app = test_app();
    let csv = prices(60);

    let response = app
        .clone()
        .oneshot(upload("/train?epochs=3&batch_size=16&test_split=0.2", "prices.csv", &csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = json_body(response).await;
    assert_eq!(summary["status"], "success");
    assert_eq!(summary["train_samples"], 48);
    assert_eq!(summary["test_samples"], 12);
    assert_eq!(summary["data_shape"], serde_json::json!([60, 5]));
    let model_id = summary["model_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(predict_request(&[251.55, 253.67, 247.14, 247.45]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let prediction = json_body(response).await;
    assert!(prediction["prediction"].is_f64());
    assert_eq!(prediction["model_id"], model_id.as_str());

    let response = app
        .clone()
        .oneshot(predict_request(&[251.55, 253.67, 247.14, 247.45, 1.0]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "validation");

    let response = app
        .clone()
        .oneshot(upload("/evaluate", "prices.csv", &csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let evaluation = json_body(response).await;
    assert_eq!(evaluation["test_samples"], 60);
    assert_eq!(evaluation["model_id"], model_id.as_str());

    let response = app
        .oneshot(Request::builder().uri("/model/info").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let info = json_body(response).await;
    assert_eq!(info["model_id"], model_id.as_str());
    assert_eq!(info["input_features"], 4);
}

#[tokio::test]
async fn test_train_rejects_bad_requests() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(upload("/train", "prices.txt", &prices(20)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("CSV"));

    let response = app
        .clone()
        .oneshot(upload("/train?epochs=0", "prices.csv", &prices(20)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(upload("/train?test_split=0.9", "prices.csv", &prices(20)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(upload("/train", "prices.csv", &prices(5)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_requests_return_structured_errors() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"features":["a",1]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "validation");
    assert!(body["message"].is_string());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], true);

    let response = app
        .oneshot(upload("/train?epochs=abc", "prices.csv", &prices(20)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "validation");
    assert!(body["message"].as_str().unwrap().contains("query"), "{}", body);
}

#[tokio::test]
async fn test_unknown_route() {
    let response = test_app()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
