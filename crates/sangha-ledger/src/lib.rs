//! Sangha Portal Ledger Reconciler
//!
//! Maintains the organization-wide account balance across meetings by
//! replaying donation totals and per-meeting spending deductions.
//!
//! # Invariants
//!
//! 1. `total_spendings == food + preacher + other` at every save
//! 2. `balance == total_amount - total_spendings` at every save
//! 3. The latest meeting's `account_balance` equals the donation total minus
//!    all spendings up to and including it, in date order
//! 4. A locked record (`editable == false`) cannot be committed again
//!
//! The recomputed-from-scratch running balances ([`compute::running_balances`])
//! are pure functions of the feeds and may be called freely; only
//! [`Reconciler::commit_meeting`] and [`Reconciler::add_meeting`] write.

pub mod compute;
pub mod reconciler;

use thiserror::Error;

use sangha_store::StoreError;

pub use compute::{live_balance, running_balances};
pub use reconciler::{MeetingWithBalance, Reconciler};

/// Errors that can occur during ledger reconciliation
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed, missing, or negative input; reported to the caller,
    /// never retried, never persisted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The referenced meeting no longer exists server-side.
    #[error("Meeting not found: {0}")]
    NotFound(String),

    /// A concurrent save beat this one; the caller must re-fetch and retry.
    #[error("Concurrent edit detected: {0}")]
    Conflict(String),

    /// The backing store failed; reported, no automatic retry.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => LedgerError::NotFound(msg),
            StoreError::VersionConflict(msg) => LedgerError::Conflict(msg),
            other => LedgerError::Store(other),
        }
    }
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
