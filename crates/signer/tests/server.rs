use std::sync::Arc;
use std::time::Duration;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use signing_gate::{AppState, Ed25519Signer, SigningManager, Vault, router};

fn test_state() -> AppState {
    let vault = Arc::new(Vault::new());
    AppState {
        manager: Arc::new(SigningManager::headless(vault).with_first_request_id(1)),
    }
}

fn connected_state(seed: &str) -> AppState {
    let vault = Arc::new(Vault::new());
    vault.connect();
    vault.select(Arc::new(Ed25519Signer::from_seed(seed).unwrap()));
    AppState {
        manager: Arc::new(SigningManager::headless(vault).with_first_request_id(1)),
    }
}

#[tokio::test]
async fn healthcheck_returns_200() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthcheck")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Ok");
}

#[tokio::test]
async fn pending_starts_empty() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/pending")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let pending: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(pending, serde_json::json!([]));
}

#[tokio::test]
async fn approving_unknown_request_returns_404() {
    let app = router(connected_state("server-seed"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/requests/99/approve")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_key_without_connection_returns_412() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/public-key")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Please connect to the Signer first.");
}

#[tokio::test]
async fn public_key_reports_prefixed_identity() {
    let app = router(connected_state("server-seed"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/public-key")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let key = parsed["public_key"].as_str().unwrap();
    assert!(key.starts_with("01"));
    assert_eq!(key.len(), 2 + 64);
}

#[tokio::test]
async fn sign_with_malformed_hex_returns_400() {
    let app = router(connected_state("server-seed"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sign")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    serde_json::json!({ "payload_hex": "not hex" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sign_suspends_until_approved_through_the_router() {
    let state = connected_state("full-flow");
    let app = router(state.clone());

    let sign_task = {
        let app = app.clone();
        tokio::spawn(async move {
            app.oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sign")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(
                        serde_json::json!({ "payload_hex": "deadbeef" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap()
        })
    };

    // Wait for the request to land in the pending projection.
    let id = loop {
        if let Some(request) = state.manager.pending().await.first() {
            break request.id;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    };

    let approve_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/requests/{id}/approve"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(approve_response.status(), StatusCode::OK);

    let sign_response = sign_task.await.unwrap();
    assert_eq!(sign_response.status(), StatusCode::OK);

    let body = sign_response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(!parsed["signature_base64"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn reject_through_the_router_returns_denial_to_caller() {
    let state = connected_state("reject-flow");
    let app = router(state.clone());

    let sign_task = {
        let app = app.clone();
        tokio::spawn(async move {
            app.oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sign")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(
                        serde_json::json!({ "payload_hex": "cafe" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap()
        })
    };

    let id = loop {
        if let Some(request) = state.manager.pending().await.first() {
            break request.id;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    };

    let reject_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/requests/{id}/reject"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(reject_response.status(), StatusCode::OK);

    let sign_response = sign_task.await.unwrap();
    assert_eq!(sign_response.status(), StatusCode::FORBIDDEN);

    let body = sign_response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"User denied message signature.");
}
