//! Commit/add orchestration over the repository traits
//!
//! The authoritative store is shared across all admin clients with no
//! transactional isolation, so every write re-fetches the latest persisted
//! snapshot immediately before computing, and persists through a
//! compare-and-swap on the record's version.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use sangha_store::{DonationFeed, FinanceStore};
use sangha_types::{Donation, MeetingId, MeetingRecord, NewMeeting, SpendingEdits};

use crate::compute;
use crate::{LedgerError, Result};

/// A meeting record annotated with its recomputed running balance.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingWithBalance {
    #[serde(flatten)]
    pub record: MeetingRecord,
    pub running_balance: Decimal,
}

/// The Ledger Reconciler service.
///
/// Reads the donation feed and the meeting records through their repository
/// seams, computes consistent balances, and persists edits to the most
/// recent meeting without corrupting historical snapshots.
#[derive(Clone)]
pub struct Reconciler {
    finance: Arc<dyn FinanceStore>,
    donations: Arc<dyn DonationFeed>,
}

impl Reconciler {
    pub fn new(finance: Arc<dyn FinanceStore>, donations: Arc<dyn DonationFeed>) -> Self {
        Self { finance, donations }
    }

    /// The donation feed, oldest first.
    pub async fn donations(&self) -> Result<Vec<Donation>> {
        Ok(self.donations.donations().await?)
    }

    /// All meeting records in date order, each annotated with the running
    /// balance recomputed from scratch.
    pub async fn list_meetings_with_balances(&self) -> Result<Vec<MeetingWithBalance>> {
        let donations = self.donations.donations().await?;
        let meetings = self.finance.all_meetings().await?;

        let balances = compute::running_balances(&donations, &meetings);

        Ok(meetings
            .into_iter()
            .map(|record| {
                let running_balance = balances.get(&record.id).copied().unwrap_or(Decimal::ZERO);
                MeetingWithBalance {
                    record,
                    running_balance,
                }
            })
            .collect())
    }

    /// The balance to display for a selected meeting, including the
    /// transient preview of unsaved edits to the latest meeting.
    pub async fn get_live_balance(
        &self,
        selected: MeetingId,
        pending_edits: Option<SpendingEdits>,
    ) -> Result<Decimal> {
        self.finance
            .get_meeting(selected)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("meeting {}", selected)))?;

        let latest = self
            .finance
            .latest_meeting()
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("meeting {}", selected)))?;

        let is_latest = latest.id == selected;
        Ok(compute::live_balance(
            is_latest,
            pending_edits.as_ref(),
            latest.account_balance,
        ))
    }

    /// Commit spending edits to a meeting.
    ///
    /// `expected_version` is the version of the record the caller edited;
    /// a concurrent save in between fails with [`LedgerError::Conflict`].
    /// Only a commit to the latest meeting adjusts the persisted account
    /// balance: the prior contribution of the meeting is replaced with the
    /// freshly computed one. A commit to an earlier meeting recomputes that
    /// meeting's own balance but leaves every later snapshot untouched,
    /// matching the portal's historical behavior.
    pub async fn commit_meeting(
        &self,
        id: MeetingId,
        edits: SpendingEdits,
        expected_version: u64,
        actor: &str,
    ) -> Result<MeetingRecord> {
        validate_category("food", edits.food)?;
        validate_category("preacher", edits.preacher)?;
        validate_category("other", edits.other)?;

        let meeting = self
            .finance
            .get_meeting(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("meeting {}", id)))?;

        if !meeting.editable {
            return Err(LedgerError::Validation(format!(
                "meeting {} is locked",
                id
            )));
        }
        if meeting.version != expected_version {
            return Err(LedgerError::Conflict(format!(
                "meeting {}: stored version {}, expected {}",
                id, meeting.version, expected_version
            )));
        }
        validate_category("total amount", meeting.total_amount)?;

        // Authoritative latest snapshot, fetched immediately before the
        // arithmetic so a save from another admin is not silently undone.
        let latest = self.finance.latest_meeting().await?;
        let backend_balance = self.authoritative_balance(latest.as_ref()).await?;
        let is_latest = latest.map(|l| l.id) == Some(id);

        let total_spendings = edits.total();
        let new_meeting_balance = meeting.total_amount - total_spendings;

        let account_balance = if is_latest {
            // Replace this meeting's prior contribution with the fresh one.
            backend_balance - meeting.total_amount + new_meeting_balance
        } else {
            // Historical edit: later snapshots keep their stale values.
            warn!(meeting = %id, "committing a non-latest meeting; later snapshots are not recomputed");
            backend_balance
        };

        let now = Utc::now();
        let updated = MeetingRecord {
            food: edits.food,
            preacher: edits.preacher,
            other: edits.other,
            total_spendings,
            balance: new_meeting_balance,
            account_balance,
            modified_at: now,
            modified_by: actor.to_string(),
            editable: false,
            ..meeting
        };

        let persisted = self
            .finance
            .update_meeting(updated, expected_version)
            .await?;

        info!(
            meeting = %id,
            spendings = %total_spendings,
            balance = %persisted.balance,
            account_balance = %persisted.account_balance,
            by = actor,
            "meeting committed"
        );

        Ok(persisted)
    }

    /// Create a new meeting with its budget allocated and no spending yet.
    pub async fn add_meeting(&self, new: NewMeeting, actor: &str) -> Result<MeetingRecord> {
        if new.name.trim().is_empty() {
            return Err(LedgerError::Validation("meeting name is required".to_string()));
        }
        if new.total_amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "total amount must be greater than zero".to_string(),
            ));
        }

        let latest = self.finance.latest_meeting().await?;
        let backend_balance = self.authoritative_balance(latest.as_ref()).await?;

        let now = Utc::now();
        let record = MeetingRecord {
            id: MeetingId::new(),
            name: new.name.trim().to_string(),
            date: new.date,
            total_amount: new.total_amount,
            food: Decimal::ZERO,
            preacher: Decimal::ZERO,
            other: Decimal::ZERO,
            total_spendings: Decimal::ZERO,
            balance: new.total_amount,
            account_balance: backend_balance + new.total_amount,
            created_at: now,
            modified_at: now,
            modified_by: actor.to_string(),
            editable: true,
            version: 0,
        };

        let persisted = self.finance.append_meeting(record).await?;

        info!(
            meeting = %persisted.id,
            name = %persisted.name,
            total_amount = %persisted.total_amount,
            account_balance = %persisted.account_balance,
            by = actor,
            "meeting added"
        );

        Ok(persisted)
    }

    /// The latest persisted account balance, falling back to the donation
    /// total before the first meeting exists.
    async fn authoritative_balance(&self, latest: Option<&MeetingRecord>) -> Result<Decimal> {
        match latest {
            Some(record) => Ok(record.account_balance),
            None => {
                let donations = self.donations.donations().await?;
                Ok(compute::donation_total(&donations))
            }
        }
    }
}

fn validate_category(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{} cannot be negative",
            field
        )));
    }
    Ok(())
}
