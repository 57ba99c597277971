//! SQLite store
//!
//! SQLite-backed implementation of the repository traits for standalone
//! deployments. Amount columns are TEXT, like the spreadsheet cells they
//! replace; rows are parsed into strongly-typed records at this boundary and
//! a row that fails to parse surfaces as [`StoreError::Corrupt`] instead of
//! leaking into the balance arithmetic.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use sangha_types::{Donation, DonationId, MeetingId, MeetingRecord};

use crate::error::{StoreError, StoreResult};
use crate::{DonationFeed, FinanceStore};

const SCHEMA: [&str; 2] = [
    r#"
CREATE TABLE IF NOT EXISTS donations (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    amount     TEXT NOT NULL,
    timestamp  TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS finance_records (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    date            TEXT NOT NULL,
    total_amount    TEXT NOT NULL,
    food            TEXT NOT NULL,
    preacher        TEXT NOT NULL,
    other           TEXT NOT NULL,
    total_spendings TEXT NOT NULL,
    balance         TEXT NOT NULL,
    account_balance TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    modified_at     TEXT NOT NULL,
    modified_by     TEXT NOT NULL,
    editable        INTEGER NOT NULL,
    version         INTEGER NOT NULL
)
"#,
];

/// SQLite connection pool wrapper
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to SQLite and bootstrap the schema
    pub async fn connect(url: &str) -> StoreResult<Self> {
        info!("Connecting to SQLite: {}", url);

        // In-memory databases are per-connection; keep the pool at one so
        // every query sees the same database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Unavailable(format!("SQLite: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("SQLite: {}", e)))?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Connected to SQLite");
        Ok(Self { pool })
    }

    /// Seed a donation into the feed (dev and test seam; the live feed is
    /// appended by the rest of the portal).
    pub async fn record_donation(&self, donation: &Donation) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO donations (id, name, amount, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(donation.id.to_string())
        .bind(&donation.name)
        .bind(donation.amount.to_string())
        .bind(donation.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ============================================================================
// Row Models
// ============================================================================

#[derive(Debug, FromRow)]
struct DonationRow {
    id: String,
    name: String,
    amount: String,
    timestamp: String,
}

#[derive(Debug, FromRow)]
struct MeetingRow {
    id: String,
    name: String,
    date: String,
    total_amount: String,
    food: String,
    preacher: String,
    other: String,
    total_spendings: String,
    balance: String,
    account_balance: String,
    created_at: String,
    modified_at: String,
    modified_by: String,
    editable: i64,
    version: i64,
}

fn parse_decimal(field: &str, value: &str) -> StoreResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| StoreError::Corrupt(format!("{}: {:?}: {}", field, value, e)))
}

fn parse_timestamp(field: &str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("{}: {:?}: {}", field, value, e)))
}

fn parse_uuid(field: &str, value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| StoreError::Corrupt(format!("{}: {:?}: {}", field, value, e)))
}

impl TryFrom<DonationRow> for Donation {
    type Error = StoreError;

    fn try_from(row: DonationRow) -> StoreResult<Self> {
        Ok(Donation {
            id: DonationId(parse_uuid("donations.id", &row.id)?),
            name: row.name,
            amount: parse_decimal("donations.amount", &row.amount)?,
            timestamp: parse_timestamp("donations.timestamp", &row.timestamp)?,
        })
    }
}

impl TryFrom<MeetingRow> for MeetingRecord {
    type Error = StoreError;

    fn try_from(row: MeetingRow) -> StoreResult<Self> {
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .map_err(|e| StoreError::Corrupt(format!("finance_records.date: {:?}: {}", row.date, e)))?;

        Ok(MeetingRecord {
            id: MeetingId(parse_uuid("finance_records.id", &row.id)?),
            name: row.name,
            date,
            total_amount: parse_decimal("finance_records.total_amount", &row.total_amount)?,
            food: parse_decimal("finance_records.food", &row.food)?,
            preacher: parse_decimal("finance_records.preacher", &row.preacher)?,
            other: parse_decimal("finance_records.other", &row.other)?,
            total_spendings: parse_decimal(
                "finance_records.total_spendings",
                &row.total_spendings,
            )?,
            balance: parse_decimal("finance_records.balance", &row.balance)?,
            account_balance: parse_decimal(
                "finance_records.account_balance",
                &row.account_balance,
            )?,
            created_at: parse_timestamp("finance_records.created_at", &row.created_at)?,
            modified_at: parse_timestamp("finance_records.modified_at", &row.modified_at)?,
            modified_by: row.modified_by,
            editable: row.editable != 0,
            version: row.version as u64,
        })
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

#[async_trait]
impl DonationFeed for SqliteStore {
    async fn donations(&self) -> StoreResult<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(
            "SELECT * FROM donations ORDER BY timestamp ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Donation::try_from).collect()
    }
}

#[async_trait]
impl FinanceStore for SqliteStore {
    async fn all_meetings(&self) -> StoreResult<Vec<MeetingRecord>> {
        let rows = sqlx::query_as::<_, MeetingRow>(
            "SELECT * FROM finance_records ORDER BY date ASC, created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MeetingRecord::try_from).collect()
    }

    async fn latest_meeting(&self) -> StoreResult<Option<MeetingRecord>> {
        let row = sqlx::query_as::<_, MeetingRow>(
            "SELECT * FROM finance_records ORDER BY date DESC, created_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(MeetingRecord::try_from).transpose()
    }

    async fn get_meeting(&self, id: MeetingId) -> StoreResult<Option<MeetingRecord>> {
        let row = sqlx::query_as::<_, MeetingRow>(
            "SELECT * FROM finance_records WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MeetingRecord::try_from).transpose()
    }

    async fn append_meeting(&self, record: MeetingRecord) -> StoreResult<MeetingRecord> {
        sqlx::query(
            r#"
            INSERT INTO finance_records (id, name, date, total_amount, food, preacher, other,
                total_spendings, balance, account_balance, created_at, modified_at, modified_by,
                editable, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.name)
        .bind(record.date.format("%Y-%m-%d").to_string())
        .bind(record.total_amount.to_string())
        .bind(record.food.to_string())
        .bind(record.preacher.to_string())
        .bind(record.other.to_string())
        .bind(record.total_spendings.to_string())
        .bind(record.balance.to_string())
        .bind(record.account_balance.to_string())
        .bind(record.created_at.to_rfc3339())
        .bind(record.modified_at.to_rfc3339())
        .bind(&record.modified_by)
        .bind(record.editable as i64)
        .bind(record.version as i64)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update_meeting(
        &self,
        record: MeetingRecord,
        expected_version: u64,
    ) -> StoreResult<MeetingRecord> {
        let mut updated = record;
        updated.version = expected_version + 1;

        let result = sqlx::query(
            r#"
            UPDATE finance_records
            SET name = ?, date = ?, total_amount = ?, food = ?, preacher = ?, other = ?,
                total_spendings = ?, balance = ?, account_balance = ?, modified_at = ?,
                modified_by = ?, editable = ?, version = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&updated.name)
        .bind(updated.date.format("%Y-%m-%d").to_string())
        .bind(updated.total_amount.to_string())
        .bind(updated.food.to_string())
        .bind(updated.preacher.to_string())
        .bind(updated.other.to_string())
        .bind(updated.total_spendings.to_string())
        .bind(updated.balance.to_string())
        .bind(updated.account_balance.to_string())
        .bind(updated.modified_at.to_rfc3339())
        .bind(&updated.modified_by)
        .bind(updated.editable as i64)
        .bind(updated.version as i64)
        .bind(updated.id.to_string())
        .bind(expected_version as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a vanished row from a concurrent save.
            return match self.get_meeting(updated.id).await? {
                None => Err(StoreError::NotFound(format!("meeting {}", updated.id))),
                Some(current) => Err(StoreError::VersionConflict(format!(
                    "meeting {}: stored version {}, expected {}",
                    updated.id, current.version, expected_version
                ))),
            };
        }

        Ok(updated)
    }
}
