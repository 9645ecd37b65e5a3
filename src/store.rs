use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::{currency::RateMap, exchange_rate::ExchangeRate};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Number of records returned by the store endpoint when no range is given.
pub const LATEST_LIMIT: usize = 30;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Outcome of an upsert.
#[derive(Debug, Clone)]
pub struct Saved {
    pub rate: ExchangeRate,
    pub created: bool,
}

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Creates the record for `date`, or overwrites its rates if one exists.
    async fn upsert(&self, date: NaiveDate, rates: &RateMap) -> Result<Saved, StoreError>;

    /// Records with `start <= date <= end`, oldest first.
    async fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ExchangeRate>, StoreError>;

    /// The `limit` most recent records, newest first.
    async fn latest(&self, limit: usize) -> Result<Vec<ExchangeRate>, StoreError>;
}
