/// What the approval surface should be opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Sign,
}

/// Boundary to the process that renders the approval surface.
///
/// Both calls are fire-and-forget: the manager never depends on the
/// window actually opening or closing — a human can reach the pending
/// queue through another path.
pub trait PopupLifecycle: Send + Sync {
    fn open(&self, kind: PopupKind);
    fn close(&self);
}

/// Used when no UI process is attached (headless operation, tests).
pub struct NoopPopup;

impl PopupLifecycle for NoopPopup {
    fn open(&self, _kind: PopupKind) {}
    fn close(&self) {}
}
