use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::SignerError;

pub type RequestId = u64;

/// Ids stay within the 53-bit integer range so external observers
/// that round-trip them through JSON numbers never lose precision.
pub const MAX_REQUEST_ID: RequestId = (1 << 53) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Unsigned,
    Signed,
    Rejected,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Signed | RequestState::Rejected)
    }
}

/// One signature work item, tracked from creation to a terminal decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningRequest {
    pub id: RequestId,
    pub payload_hex: String,
    pub bound_public_key: Option<String>,
    pub created_at_millis: u64,
    pub state: RequestState,
    pub signature_base64: Option<String>,
    pub error_message: Option<String>,
}

/// What the approval surface sees for each undecided request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub id: RequestId,
    pub payload_hex: String,
    pub bound_public_key: Option<String>,
    pub created_at_millis: u64,
}

/// Ordered collection of signing requests plus the derived pending
/// projection published to the approval UI.
///
/// Requests are never deleted: terminal entries stay visible through
/// [`RequestStore::get`] but drop out of the projection.
pub struct RequestStore {
    requests: Vec<SigningRequest>,
    next_id: RequestId,
    pending_tx: watch::Sender<Vec<PendingRequest>>,
}

impl RequestStore {
    /// Seeds the id counter from a wide random value so restarts do
    /// not collide with ids still held by stale external observers.
    pub fn new() -> Self {
        Self::with_first_id(rand::thread_rng().gen_range(0..=MAX_REQUEST_ID))
    }

    /// Deterministic starting id, for tests.
    pub fn with_first_id(first_id: RequestId) -> Self {
        let (pending_tx, _) = watch::channel(Vec::new());
        Self {
            requests: Vec::new(),
            next_id: first_id & MAX_REQUEST_ID,
            pending_tx,
        }
    }

    /// Appends a new request in `Unsigned` state and returns its id.
    pub fn create(&mut self, payload_hex: String, bound_public_key: Option<String>) -> RequestId {
        let id = self.next_id;
        self.next_id = (self.next_id + 1) & MAX_REQUEST_ID;

        self.requests.push(SigningRequest {
            id,
            payload_hex,
            bound_public_key,
            created_at_millis: now_millis(),
            state: RequestState::Unsigned,
            signature_base64: None,
            error_message: None,
        });
        self.refresh_projection();
        id
    }

    pub fn get(&self, id: RequestId) -> Result<&SigningRequest, SignerError> {
        self.requests
            .iter()
            .find(|r| r.id == id)
            .ok_or(SignerError::RequestNotFound(id))
    }

    /// Replaces the stored entry carrying the same id.
    pub fn update(&mut self, request: SigningRequest) -> Result<(), SignerError> {
        let slot = self
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or(SignerError::RequestNotFound(request.id))?;
        *slot = request;
        self.refresh_projection();
        Ok(())
    }

    /// The current pending set: exactly the requests still `Unsigned`.
    pub fn pending(&self) -> Vec<PendingRequest> {
        self.requests
            .iter()
            .filter(|r| r.state == RequestState::Unsigned)
            .map(|r| PendingRequest {
                id: r.id,
                payload_hex: r.payload_hex.clone(),
                bound_public_key: r.bound_public_key.clone(),
                created_at_millis: r.created_at_millis,
            })
            .collect()
    }

    pub fn subscribe_pending(&self) -> watch::Receiver<Vec<PendingRequest>> {
        self.pending_tx.subscribe()
    }

    fn refresh_projection(&self) {
        // send_replace rather than send: the projection must update
        // even while no UI is subscribed.
        self.pending_tx.send_replace(self.pending());
    }
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
