//! Test doubles for the upstream API and the store.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    currency::{Currency, RateMap},
    exchange_rate::ExchangeRate,
    store::{RateStore, Saved, StoreError},
    vat_comply::{FetchError, RateSource},
};

pub fn rates(brl: Decimal, eur: Decimal, jpy: Decimal) -> RateMap {
    RateMap::from([(Currency::Brl, brl), (Currency::Eur, eur), (Currency::Jpy, jpy)])
}

/// Answers from a fixed table; dates not in the table fail.
#[derive(Default)]
pub struct FakeSource {
    rates: HashMap<NaiveDate, RateMap>,
    calls: Mutex<Vec<NaiveDate>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, date: NaiveDate, rates: RateMap) -> Self {
        self.rates.insert(date, rates);
        self
    }

    pub fn calls(&self) -> Vec<NaiveDate> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateSource for FakeSource {
    async fn fetch(&self, date: NaiveDate) -> Result<RateMap, FetchError> {
        self.calls.lock().unwrap().push(date);
        self.rates.get(&date).cloned().ok_or(FetchError::MissingRates)
    }
}

pub struct FailingStore;

#[async_trait]
impl RateStore for FailingStore {
    async fn upsert(&self, _date: NaiveDate, _rates: &RateMap) -> Result<Saved, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn range(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<ExchangeRate>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn latest(&self, _limit: usize) -> Result<Vec<ExchangeRate>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}
