//! Application state shared across handlers

use sangha_ledger::Reconciler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The ledger reconciler over the configured store
    pub ledger: Reconciler,
}

impl AppState {
    pub fn new(ledger: Reconciler) -> Self {
        Self { ledger }
    }
}
