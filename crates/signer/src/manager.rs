use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tokio::sync::{Mutex, oneshot, watch};

use crate::error::SignerError;
use crate::identity;
use crate::popup::{NoopPopup, PopupKind, PopupLifecycle};
use crate::store::{PendingRequest, RequestId, RequestState, RequestStore, SigningRequest};
use crate::vault::Vault;

pub const USER_DENIED_MESSAGE: &str = "User denied message signature.";
pub const KEY_ROTATED_MESSAGE: &str =
    "Account switched before approval. Please resend the signature request.";
pub const TIMED_OUT_MESSAGE: &str = "Signature request timed out awaiting approval.";

/// Correlates asynchronous signing requests with out-of-band human
/// decisions.
///
/// Callers suspend in [`SigningManager::request_signature`] until the
/// approval surface settles the request through
/// [`SigningManager::approve`] or [`SigningManager::reject`]. Each
/// request id carries exactly one completion channel, removed when it
/// fires, so a decision resolves the caller exactly once.
pub struct SigningManager {
    state: Mutex<ManagerState>,
    vault: Arc<Vault>,
    popup: Arc<dyn PopupLifecycle>,
    decision_timeout: Option<Duration>,
}

struct ManagerState {
    store: RequestStore,
    listeners: HashMap<RequestId, oneshot::Sender<SigningRequest>>,
}

impl SigningManager {
    pub fn new(vault: Arc<Vault>, popup: Arc<dyn PopupLifecycle>) -> Self {
        Self {
            state: Mutex::new(ManagerState {
                store: RequestStore::new(),
                listeners: HashMap::new(),
            }),
            vault,
            popup,
            decision_timeout: None,
        }
    }

    pub fn headless(vault: Arc<Vault>) -> Self {
        Self::new(vault, Arc::new(NoopPopup))
    }

    /// Synthesizes a rejection for requests that sit undecided past
    /// `timeout`, so an abandoned approval surface cannot leave the
    /// caller suspended forever.
    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout = Some(timeout);
        self
    }

    /// Deterministic request ids, for tests.
    pub fn with_first_request_id(mut self, first_id: RequestId) -> Self {
        self.state.get_mut().store = RequestStore::with_first_id(first_id);
        self
    }

    /// Queues `payload_hex` for signing and suspends until a human
    /// decision settles it.
    ///
    /// Resolves with the base64 detached signature on approval; fails
    /// with the recorded rejection reason otherwise. The payload is
    /// validated eagerly so malformed hex fails the caller here rather
    /// than surfacing to the approver later.
    pub async fn request_signature(
        &self,
        payload_hex: &str,
        bound_public_key_base64: Option<String>,
    ) -> Result<String, SignerError> {
        hex::decode(payload_hex).map_err(|e| SignerError::InvalidPayload(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        let id = {
            let mut state = self.state.lock().await;
            let id = state
                .store
                .create(payload_hex.to_string(), bound_public_key_base64);
            state.listeners.insert(id, tx);
            id
        };

        self.popup.open(PopupKind::Sign);

        let decided = match self.decision_timeout {
            None => rx.await,
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(decided) => decided,
                Err(_elapsed) => return self.settle_timed_out(id).await,
            },
        };

        match decided {
            Ok(request) => settle(request),
            // The manager was dropped while the caller was suspended.
            Err(_) => Err(SignerError::Unexpected(eyre::eyre!(
                "decision channel for request {id} closed before a decision"
            ))),
        }
    }

    /// Signs a pending request with the active key, or converts it
    /// into a rejection when the key rotated since creation.
    pub async fn approve(&self, id: RequestId) -> Result<(), SignerError> {
        let mut state = self.state.lock().await;
        let mut request = load_undecided(&state, id)?;

        let signer = self
            .vault
            .selected_signer()
            .ok_or(SignerError::NoActiveAccount)?;
        let active_key = BASE64.encode(signer.public_key_bytes());

        match &request.bound_public_key {
            // The approval surface may stay open across an account
            // switch; never sign with a key the caller did not bind.
            Some(bound) if *bound != active_key => {
                request.state = RequestState::Rejected;
                request.error_message = Some(KEY_ROTATED_MESSAGE.to_string());
            }
            _ => {
                let payload = hex::decode(&request.payload_hex)
                    .map_err(|e| SignerError::InvalidPayload(e.to_string()))?;
                let signature = signer.sign(&payload).map_err(SignerError::Signing)?;
                request.state = RequestState::Signed;
                request.signature_base64 = Some(BASE64.encode(signature));
            }
        }

        self.commit_decision(&mut state, request)
    }

    /// Rejects a pending request on behalf of the human approver.
    pub async fn reject(&self, id: RequestId) -> Result<(), SignerError> {
        self.reject_with(id, USER_DENIED_MESSAGE).await
    }

    async fn reject_with(&self, id: RequestId, message: &str) -> Result<(), SignerError> {
        let mut state = self.state.lock().await;
        let mut request = load_undecided(&state, id)?;
        request.state = RequestState::Rejected;
        request.error_message = Some(message.to_string());
        self.commit_decision(&mut state, request)
    }

    /// Persists a terminal decision, fires the caller's one-shot
    /// completion, and closes the approval surface.
    fn commit_decision(
        &self,
        state: &mut ManagerState,
        request: SigningRequest,
    ) -> Result<(), SignerError> {
        let id = request.id;
        state.store.update(request.clone())?;
        if let Some(tx) = state.listeners.remove(&id) {
            // The caller may have gone away (timeout race); the
            // decision is still recorded in the store.
            let _ = tx.send(request);
        }
        self.popup.close();
        Ok(())
    }

    /// Timeout path: record a rejection, unless the approver decided
    /// in the same instant — then honor that decision from the store.
    async fn settle_timed_out(&self, id: RequestId) -> Result<String, SignerError> {
        match self.reject_with(id, TIMED_OUT_MESSAGE).await {
            Ok(()) => Err(SignerError::Rejected(TIMED_OUT_MESSAGE.to_string())),
            Err(SignerError::AlreadyDecided(_)) => {
                let state = self.state.lock().await;
                settle(state.store.get(id)?.clone())
            }
            Err(other) => Err(other),
        }
    }

    pub async fn pending(&self) -> Vec<PendingRequest> {
        self.state.lock().await.store.pending()
    }

    /// Observable pending projection, updated after every store
    /// mutation. The approval UI holds this across decisions.
    pub async fn subscribe_pending(&self) -> watch::Receiver<Vec<PendingRequest>> {
        self.state.lock().await.store.subscribe_pending()
    }

    /// Prefixed hex identity of the active key (caller-facing getter).
    pub fn active_public_key(&self) -> Result<String, SignerError> {
        identity::active_public_key(&self.vault)
    }

    /// Base64 transport encoding of the active key (caller-facing getter).
    pub fn selected_public_key_base64(&self) -> Result<String, SignerError> {
        identity::selected_public_key_base64(&self.vault)
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }
}

/// Loads a request for decision, refusing ids that are unknown or
/// already terminal — a second decision must error, not double-fire.
fn load_undecided(state: &ManagerState, id: RequestId) -> Result<SigningRequest, SignerError> {
    let request = state.store.get(id)?;
    if request.state.is_terminal() {
        return Err(SignerError::AlreadyDecided(id));
    }
    Ok(request.clone())
}

/// Maps a terminal request snapshot onto the caller's outcome.
fn settle(request: SigningRequest) -> Result<String, SignerError> {
    match request.state {
        RequestState::Signed => request
            .signature_base64
            .ok_or(SignerError::InconsistentDecision(request.id)),
        RequestState::Rejected => Err(SignerError::Rejected(
            request
                .error_message
                .unwrap_or_else(|| USER_DENIED_MESSAGE.to_string()),
        )),
        // Reachable only through a store bug; fail the caller with a
        // diagnostic instead of crashing.
        RequestState::Unsigned => Err(SignerError::InconsistentDecision(request.id)),
    }
}
