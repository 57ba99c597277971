//! Sangha Portal storage layer
//!
//! The portal's authoritative store is an external spreadsheet shared by
//! every client with no transactional isolation. This crate abstracts it
//! behind explicit repository traits so the reconciliation logic never
//! touches raw rows, and layers an optimistic version check on top of the
//! lock-free external store.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: `RwLock`-backed store for tests and dev mode
//! - [`SqliteStore`]: SQLite-backed store for standalone deployments

pub mod error;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use sangha_types::{Donation, MeetingId, MeetingRecord};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Read-only view of the community donation feed.
///
/// Donations are appended by donor actions elsewhere in the portal; this
/// subsystem only ever sums and lists them.
#[async_trait]
pub trait DonationFeed: Send + Sync {
    /// All donations, oldest first.
    async fn donations(&self) -> StoreResult<Vec<Donation>>;
}

/// Repository for meeting finance records.
///
/// `update_meeting` is a compare-and-swap on the record's version: a caller
/// holding a stale snapshot gets [`StoreError::VersionConflict`] instead of
/// silently overwriting a concurrent save.
#[async_trait]
pub trait FinanceStore: Send + Sync {
    /// All meeting records in ascending `(date, created_at)` order.
    async fn all_meetings(&self) -> StoreResult<Vec<MeetingRecord>>;

    /// The most recent meeting by `(date, created_at)`, if any.
    async fn latest_meeting(&self) -> StoreResult<Option<MeetingRecord>>;

    /// Fetch a single record by id.
    async fn get_meeting(&self, id: MeetingId) -> StoreResult<Option<MeetingRecord>>;

    /// Append a new record. Fails if the id already exists.
    async fn append_meeting(&self, record: MeetingRecord) -> StoreResult<MeetingRecord>;

    /// Replace a record by id if its stored version equals
    /// `expected_version`; the stored version is bumped on success.
    async fn update_meeting(
        &self,
        record: MeetingRecord,
        expected_version: u64,
    ) -> StoreResult<MeetingRecord>;
}
