use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::{RateStore, Saved, StoreError};
use crate::{currency::RateMap, exchange_rate::ExchangeRate};

/// Process-local store, used when no database is configured. Contents are
/// lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    rates: Mutex<BTreeMap<NaiveDate, ExchangeRate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn upsert(&self, date: NaiveDate, rates: &RateMap) -> Result<Saved, StoreError> {
        let mut stored = self.rates.lock().await;

        if let Some(rate) = stored.get_mut(&date) {
            rate.overwrite(rates);
            return Ok(Saved {
                rate: rate.clone(),
                created: false,
            });
        }

        let rate = ExchangeRate::new(date, rates);
        stored.insert(date, rate.clone());

        Ok(Saved {
            rate,
            created: true,
        })
    }

    async fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ExchangeRate>, StoreError> {
        if start > end {
            return Ok(Vec::new());
        }

        let stored = self.rates.lock().await;
        Ok(stored.range(start..=end).map(|(_, rate)| rate.clone()).collect())
    }

    async fn latest(&self, limit: usize) -> Result<Vec<ExchangeRate>, StoreError> {
        let stored = self.rates.lock().await;
        Ok(stored.values().rev().take(limit).cloned().collect())
    }
}
