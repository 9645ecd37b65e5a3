//! Client for the vatcomply.com daily rates endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::currency::{BASE_CURRENCY, Currency, RateMap};

pub const DEFAULT_URL: &str = "https://api.vatcomply.com/rates";

const BODY_EXCERPT_LEN: usize = 200;

/// Why no rates could be obtained for a date. Callers treat every variant
/// the same way; the distinction only matters for logs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response has no `rates` field")]
    MissingRates,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Returns the USD quotations published for `date`.
    async fn fetch(&self, date: NaiveDate) -> Result<RateMap, FetchError>;
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: Option<UpstreamRates>,
}

#[derive(Debug, Deserialize)]
struct UpstreamRates {
    #[serde(rename = "BRL")]
    brl: Option<Decimal>,
    #[serde(rename = "EUR")]
    eur: Option<Decimal>,
    #[serde(rename = "JPY")]
    jpy: Option<Decimal>,
}

impl UpstreamRates {
    fn get(&self, currency: Currency) -> Option<Decimal> {
        match currency {
            Currency::Brl => self.brl,
            Currency::Eur => self.eur,
            Currency::Jpy => self.jpy,
        }
    }
}

pub struct VatComplyClient {
    client: Client,
    base_url: String,
}

impl VatComplyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, date: NaiveDate) -> String {
        format!(
            "{}?base={}&date={}",
            self.base_url,
            BASE_CURRENCY,
            date.format("%Y-%m-%d")
        )
    }
}

#[async_trait]
impl RateSource for VatComplyClient {
    async fn fetch(&self, date: NaiveDate) -> Result<RateMap, FetchError> {
        let url = self.url(date);
        log::debug!("Fetching rates for {} from {}", date, url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(FetchError::Transport)?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: text.chars().take(BODY_EXCERPT_LEN).collect(),
            });
        }

        parse_rates(date, &text)
    }
}

fn parse_rates(date: NaiveDate, body: &str) -> Result<RateMap, FetchError> {
    let response: RatesResponse = serde_json::from_str(body)?;
    let upstream = response.rates.ok_or(FetchError::MissingRates)?;

    let mut map = RateMap::new();
    for currency in Currency::ALL {
        match upstream.get(currency) {
            Some(rate) => {
                map.insert(currency, rate);
            }
            None => log::debug!("{} not quoted for {}", currency, date),
        }
    }

    Ok(map)
}
