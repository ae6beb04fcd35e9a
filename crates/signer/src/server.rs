use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::error::SignerError;
use crate::manager::SigningManager;
use crate::store::RequestId;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SigningManager>,
}

#[derive(Debug, Deserialize)]
pub struct SignRequestBody {
    pub payload_hex: String,
    #[serde(default)]
    pub bound_public_key_base64: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignResponseBody {
    pub signature_base64: String,
}

#[derive(Debug, Serialize)]
pub struct PublicKeyResponseBody {
    pub public_key: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/healthcheck",
            get(|| async move { (StatusCode::OK, "Ok").into_response() }),
        )
        .route("/sign", post(sign_handler))
        .route("/pending", get(pending_handler))
        .route("/requests/{id}/approve", post(approve_handler))
        .route("/requests/{id}/reject", post(reject_handler))
        .route("/public-key", get(public_key_handler))
        .route("/public-key/base64", get(public_key_base64_handler))
        .with_state(state)
}

pub async fn run(host: String, port: u16, manager: Arc<SigningManager>) -> Result<()> {
    let router = router(AppState { manager });

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Suspends the caller until the approval surface decides.
async fn sign_handler(
    State(state): State<AppState>,
    Json(body): Json<SignRequestBody>,
) -> Result<Json<SignResponseBody>, SignerError> {
    let signature_base64 = state
        .manager
        .request_signature(&body.payload_hex, body.bound_public_key_base64)
        .await?;
    Ok(Json(SignResponseBody { signature_base64 }))
}

async fn pending_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.manager.pending().await)
}

async fn approve_handler(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> Result<StatusCode, SignerError> {
    state.manager.approve(id).await?;
    Ok(StatusCode::OK)
}

async fn reject_handler(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> Result<StatusCode, SignerError> {
    state.manager.reject(id).await?;
    Ok(StatusCode::OK)
}

async fn public_key_handler(
    State(state): State<AppState>,
) -> Result<Json<PublicKeyResponseBody>, SignerError> {
    Ok(Json(PublicKeyResponseBody {
        public_key: state.manager.active_public_key()?,
    }))
}

async fn public_key_base64_handler(
    State(state): State<AppState>,
) -> Result<Json<PublicKeyResponseBody>, SignerError> {
    Ok(Json(PublicKeyResponseBody {
        public_key: state.manager.selected_public_key_base64()?,
    }))
}
