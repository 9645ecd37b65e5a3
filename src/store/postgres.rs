use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use super::{RateStore, Saved, StoreError};
use crate::{
    currency::{Currency, RateMap},
    exchange_rate::{ExchangeRate, scaled},
};

const COLUMNS: &str = "id, date, rate_to_brl, rate_to_eur, rate_to_jpy, recorded_at";

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    rate: ExchangeRate,
    inserted: bool,
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and brings the schema up to date.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl RateStore for PgStore {
    async fn upsert(&self, date: NaiveDate, rates: &RateMap) -> Result<Saved, StoreError> {
        // xmax is zero only for rows written by a plain insert.
        let sql = format!(
            "INSERT INTO exchange_rates ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, now()) \
             ON CONFLICT (date) DO UPDATE SET \
                 rate_to_brl = EXCLUDED.rate_to_brl, \
                 rate_to_eur = EXCLUDED.rate_to_eur, \
                 rate_to_jpy = EXCLUDED.rate_to_jpy, \
                 recorded_at = EXCLUDED.recorded_at \
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );

        let row: UpsertRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(date)
            .bind(scaled(rates, Currency::Brl))
            .bind(scaled(rates, Currency::Eur))
            .bind(scaled(rates, Currency::Jpy))
            .fetch_one(&self.pool)
            .await?;

        Ok(Saved {
            rate: row.rate,
            created: row.inserted,
        })
    }

    async fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ExchangeRate>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM exchange_rates WHERE date BETWEEN $1 AND $2 ORDER BY date ASC"
        );

        let rates: Vec<ExchangeRate> = sqlx::query_as(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rates)
    }

    async fn latest(&self, limit: usize) -> Result<Vec<ExchangeRate>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM exchange_rates ORDER BY date DESC LIMIT $1");

        let rates: Vec<ExchangeRate> = sqlx::query_as(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        Ok(rates)
    }
}
