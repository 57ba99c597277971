//! Wire types
//!
//! The portal frontend consumed the sheet's string cells directly, so all
//! amounts cross the wire as decimal strings (rust_decimal's serde form)
//! and are parsed into typed values before any arithmetic happens.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sangha_ledger::MeetingWithBalance;
use sangha_types::{Donation, SpendingEdits};

// ============================================================================
// Donations
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationDto {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<Donation> for DonationDto {
    fn from(d: Donation) -> Self {
        Self {
            id: d.id.0,
            name: d.name,
            amount: d.amount,
            timestamp: d.timestamp,
        }
    }
}

/// Donation feed plus its total, as the finance dashboard displays it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationsResponse {
    pub donations: Vec<DonationDto>,
    pub total: Decimal,
}

// ============================================================================
// Meetings
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub total_amount: Decimal,
    pub food: Decimal,
    pub preacher: Decimal,
    pub other: Decimal,
    pub total_spendings: Decimal,
    pub balance: Decimal,
    pub account_balance: Decimal,
    pub running_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
    pub editable: bool,
    pub version: u64,
}

impl From<MeetingWithBalance> for MeetingResponse {
    fn from(m: MeetingWithBalance) -> Self {
        let r = m.record;
        Self {
            id: r.id.0,
            name: r.name,
            date: r.date,
            total_amount: r.total_amount,
            food: r.food,
            preacher: r.preacher,
            other: r.other,
            total_spendings: r.total_spendings,
            balance: r.balance,
            account_balance: r.account_balance,
            running_balance: m.running_balance,
            created_at: r.created_at,
            modified_at: r.modified_at,
            modified_by: r.modified_by,
            editable: r.editable,
            version: r.version,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMeetingRequest {
    pub name: String,
    pub date: NaiveDate,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMeetingRequest {
    pub food: Decimal,
    pub preacher: Decimal,
    pub other: Decimal,
    /// Version of the record the client edited; a stale value is a 409.
    pub version: u64,
}

impl CommitMeetingRequest {
    pub fn edits(&self) -> SpendingEdits {
        SpendingEdits {
            food: self.food,
            preacher: self.preacher,
            other: self.other,
        }
    }
}

// ============================================================================
// Live Balance
// ============================================================================

/// Query for the displayed balance of a selected meeting. The spending
/// fields carry in-progress, unsaved edits; an omitted field counts as zero
/// once any of them is present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBalanceQuery {
    pub meeting_id: Uuid,
    pub food: Option<Decimal>,
    pub preacher: Option<Decimal>,
    pub other: Option<Decimal>,
}

impl LiveBalanceQuery {
    pub fn pending_edits(&self) -> Option<SpendingEdits> {
        if self.food.is_none() && self.preacher.is_none() && self.other.is_none() {
            return None;
        }
        Some(SpendingEdits {
            food: self.food.unwrap_or_default(),
            preacher: self.preacher.unwrap_or_default(),
            other: self.other.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBalanceResponse {
    pub balance: Decimal,
}
