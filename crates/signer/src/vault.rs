use std::sync::{Arc, Mutex};

use crate::error::SignerError;
use crate::signing::MessageSigner;

/// Holds the connection state and the currently selected signing key.
///
/// Stands in for the external account store: the manager only ever
/// reads the selected key through this surface, and the approval UI
/// may switch accounts underneath an open request (see the
/// key-rotation guard in [`crate::manager::SigningManager::approve`]).
pub struct Vault {
    inner: Mutex<VaultState>,
}

struct VaultState {
    connected: bool,
    selected: Option<Arc<dyn MessageSigner>>,
}

impl Vault {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VaultState {
                connected: false,
                selected: None,
            }),
        }
    }

    pub fn connect(&self) {
        self.lock().connected = true;
    }

    pub fn disconnect(&self) {
        self.lock().connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Selects (or switches) the active signing key.
    pub fn select(&self, signer: Arc<dyn MessageSigner>) {
        self.lock().selected = Some(signer);
    }

    pub fn clear_selection(&self) {
        self.lock().selected = None;
    }

    pub fn selected_signer(&self) -> Option<Arc<dyn MessageSigner>> {
        self.lock().selected.clone()
    }

    /// Raw public key bytes of the selected account.
    ///
    /// Errors if no connection has been established or no account
    /// is selected, in that order.
    pub fn selected_public_key(&self) -> Result<Vec<u8>, SignerError> {
        let state = self.lock();
        if !state.connected {
            return Err(SignerError::NotConnected);
        }
        let signer = state.selected.as_ref().ok_or(SignerError::NoActiveAccount)?;
        Ok(signer.public_key_bytes())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VaultState> {
        // Mutex is never held across await points, poisoning cannot occur.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}
