use super::*;

use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use shared::domain::Label;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

async fn spawn_server(app: Router) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn service_for(base_url: &str) -> HttpPredictionService {
    let settings = ClientSettings::default()
        .with_api_base_url(base_url)
        .expect("url");
    HttpPredictionService::new(&settings).expect("client")
}

#[tokio::test]
async fn posts_raw_text_and_decodes_prediction() {
    let (tx, rx) = oneshot::channel::<serde_json::Value>();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let app = Router::new().route(
        "/predict",
        post(move |Json(body): Json<serde_json::Value>| {
            let tx = tx.clone();
            async move {
                if let Some(tx) = tx.lock().await.take() {
                    let _ = tx.send(body);
                }
                Json(serde_json::json!({
                    "prediction": "REAL",
                    "confidence": 87,
                    "probabilities": {"fake": 13, "real": 87}
                }))
            }
        }),
    );
    let base_url = spawn_server(app).await.expect("spawn server");
    let service = service_for(&base_url);
    assert_eq!(service.endpoint(), format!("{base_url}/predict"));

    let prediction = service
        .predict("  Breaking: markets rally  ")
        .await
        .expect("predict");
    assert_eq!(prediction.label, Label::Real);
    assert_eq!(prediction.confidence, 87.0);
    assert_eq!(prediction.probabilities.fake, 13.0);
    assert_eq!(prediction.probabilities.real, 87.0);

    let body = rx.await.expect("request body");
    assert_eq!(
        body,
        serde_json::json!({ "text": "  Breaking: markets rally  " })
    );
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let app = Router::new().route(
        "/predict",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded").into_response() }),
    );
    let base_url = spawn_server(app).await.expect("spawn server");

    let err = service_for(&base_url)
        .predict("text")
        .await
        .expect_err("must fail");
    assert!(
        matches!(err, PredictionError::Status(status) if status == StatusCode::INTERNAL_SERVER_ERROR),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let app = Router::new().route(
        "/predict",
        post(|| async { Json(serde_json::json!({ "prediction": "REAL" })) }),
    );
    let base_url = spawn_server(app).await.expect("spawn server");

    let err = service_for(&base_url)
        .predict("text")
        .await
        .expect_err("must fail");
    assert!(matches!(err, PredictionError::Decode(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = service_for(&format!("http://{addr}"))
        .predict("text")
        .await
        .expect_err("must fail");
    assert!(matches!(err, PredictionError::Transport(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn configured_timeout_bounds_slow_responses() {
    let app = Router::new().route(
        "/predict",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            StatusCode::OK
        }),
    );
    let base_url = spawn_server(app).await.expect("spawn server");
    let settings = ClientSettings::default()
        .with_api_base_url(&base_url)
        .expect("url")
        .with_request_timeout_secs(1)
        .expect("timeout");
    let service = HttpPredictionService::new(&settings).expect("client");

    let err = service.predict("text").await.expect_err("must time out");
    match err {
        PredictionError::Transport(inner) => assert!(inner.is_timeout()),
        other => panic!("unexpected error: {other}"),
    }
}
