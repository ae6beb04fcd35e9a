use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};
use eyre::Report;

use crate::store::RequestId;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error(transparent)]
    Unexpected(#[from] Report),
    #[error("Please connect to the Signer first.")]
    NotConnected,
    #[error("No account is currently selected.")]
    NoActiveAccount,
    #[error("Unrecognized key format: {0}-byte public key")]
    UnrecognizedKeyFormat(usize),
    #[error("Signing request not found: {0}")]
    RequestNotFound(RequestId),
    #[error("Signing request {0} has already been decided")]
    AlreadyDecided(RequestId),
    #[error("Invalid hex payload: {0}")]
    InvalidPayload(String),
    #[error("{0}")]
    Rejected(String),
    #[error("Signing request {0} completed without a terminal state")]
    InconsistentDecision(RequestId),
    #[error("Failed to produce signature: {0}")]
    Signing(anyhow::Error),
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for SignerError {
    fn into_response(self) -> Response {
        match self {
            precondition @ (SignerError::NotConnected | SignerError::NoActiveAccount) => {
                (StatusCode::PRECONDITION_FAILED, precondition.to_string()).into_response()
            }
            bad_request @ (SignerError::InvalidPayload(_)
            | SignerError::UnrecognizedKeyFormat(_)) => {
                (StatusCode::BAD_REQUEST, bad_request.to_string()).into_response()
            }
            not_found @ SignerError::RequestNotFound(_) => {
                (StatusCode::NOT_FOUND, not_found.to_string()).into_response()
            }
            conflict @ SignerError::AlreadyDecided(_) => {
                (StatusCode::CONFLICT, conflict.to_string()).into_response()
            }
            rejected @ SignerError::Rejected(_) => {
                (StatusCode::FORBIDDEN, rejected.to_string()).into_response()
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something wrong happened.",
            )
                .into_response(),
        }
    }
}
