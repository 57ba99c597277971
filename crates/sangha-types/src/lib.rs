//! Canonical types for the Sangha Portal finance service
//!
//! These types are the strongly-typed replacement for the header-indexed
//! sheet rows the portal used to pass around. All money fields are
//! `rust_decimal::Decimal`; parsing and validation happen at the storage or
//! API boundary, never inside the arithmetic.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Identity Types
// ============================================================================

/// Unique identifier for a donation row in the donation feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DonationId(pub Uuid);

impl DonationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DonationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DonationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a meeting's finance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingId(pub Uuid);

impl MeetingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MeetingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MeetingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Donation Feed
// ============================================================================

/// A single donation from the community donation feed.
///
/// Donations are created by donor actions elsewhere in the portal and are
/// never mutated or deleted through this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub name: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Meeting Finance Records
// ============================================================================

/// A dated financial reporting unit: an allocated budget plus itemized
/// spending, and a snapshot of the organization-wide account balance taken
/// when the record was last saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub id: MeetingId,
    pub name: String,
    pub date: NaiveDate,
    /// Budget allocated to this meeting, fixed at creation.
    pub total_amount: Decimal,
    pub food: Decimal,
    pub preacher: Decimal,
    pub other: Decimal,
    /// Derived: `food + preacher + other` as of the last save.
    pub total_spendings: Decimal,
    /// Derived: `total_amount - total_spendings` as of the last save.
    pub balance: Decimal,
    /// Organization-wide running balance snapshot after this record's save.
    pub account_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
    /// True until the first commit, then locked false.
    pub editable: bool,
    /// Optimistic-concurrency token, incremented on every successful update.
    pub version: u64,
}

impl MeetingRecord {
    /// Itemized spending total currently persisted on the record.
    pub fn spendings(&self) -> Decimal {
        self.food + self.preacher + self.other
    }
}

/// Proposed values for the three spending categories of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendingEdits {
    pub food: Decimal,
    pub preacher: Decimal,
    pub other: Decimal,
}

impl SpendingEdits {
    pub fn total(&self) -> Decimal {
        self.food + self.preacher + self.other
    }
}

/// Input for creating a new meeting record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub name: String,
    pub date: NaiveDate,
    pub total_amount: Decimal,
}
