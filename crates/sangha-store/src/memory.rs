//! In-memory store
//!
//! Thread-safe, `RwLock`-backed implementation of the repository traits.
//! Used by the test suites and by the server's dev mode.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use sangha_types::{Donation, MeetingId, MeetingRecord};

use crate::error::{StoreError, StoreResult};
use crate::{DonationFeed, FinanceStore};

/// In-memory donation feed and finance record store
#[derive(Clone, Default)]
pub struct MemoryStore {
    donations: Arc<RwLock<Vec<Donation>>>,
    meetings: Arc<RwLock<Vec<MeetingRecord>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a donation into the feed.
    ///
    /// The feed is read-only from the reconciler's point of view; this is
    /// the seam the rest of the portal (and the tests) append through.
    pub async fn record_donation(&self, donation: Donation) {
        let mut donations = self.donations.write().await;
        donations.push(donation);
        donations.sort_by_key(|d| d.timestamp);
    }
}

fn sort_meetings(meetings: &mut [MeetingRecord]) {
    meetings.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));
}

#[async_trait]
impl DonationFeed for MemoryStore {
    async fn donations(&self) -> StoreResult<Vec<Donation>> {
        Ok(self.donations.read().await.clone())
    }
}

#[async_trait]
impl FinanceStore for MemoryStore {
    async fn all_meetings(&self) -> StoreResult<Vec<MeetingRecord>> {
        let mut meetings = self.meetings.read().await.clone();
        sort_meetings(&mut meetings);
        Ok(meetings)
    }

    async fn latest_meeting(&self) -> StoreResult<Option<MeetingRecord>> {
        let mut meetings = self.meetings.read().await.clone();
        sort_meetings(&mut meetings);
        Ok(meetings.pop())
    }

    async fn get_meeting(&self, id: MeetingId) -> StoreResult<Option<MeetingRecord>> {
        let meetings = self.meetings.read().await;
        Ok(meetings.iter().find(|m| m.id == id).cloned())
    }

    async fn append_meeting(&self, record: MeetingRecord) -> StoreResult<MeetingRecord> {
        let mut meetings = self.meetings.write().await;
        if meetings.iter().any(|m| m.id == record.id) {
            return Err(StoreError::Corrupt(format!(
                "duplicate meeting id {}",
                record.id
            )));
        }
        meetings.push(record.clone());
        Ok(record)
    }

    async fn update_meeting(
        &self,
        record: MeetingRecord,
        expected_version: u64,
    ) -> StoreResult<MeetingRecord> {
        let mut meetings = self.meetings.write().await;

        let slot = meetings
            .iter_mut()
            .find(|m| m.id == record.id)
            .ok_or_else(|| StoreError::NotFound(format!("meeting {}", record.id)))?;

        if slot.version != expected_version {
            return Err(StoreError::VersionConflict(format!(
                "meeting {}: stored version {}, expected {}",
                record.id, slot.version, expected_version
            )));
        }

        let mut updated = record;
        updated.version = expected_version + 1;
        *slot = updated.clone();
        Ok(updated)
    }
}
