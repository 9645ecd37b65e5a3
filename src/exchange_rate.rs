use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::currency::{Currency, RateMap};

/// Rates are stored as NUMERIC(10,4).
pub const RATE_SCALE: u32 = 4;

/// One persisted quotation. At most one exists per `date`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ExchangeRate {
    pub id: Uuid,
    pub date: NaiveDate,
    pub rate_to_brl: Option<Decimal>,
    pub rate_to_eur: Option<Decimal>,
    pub rate_to_jpy: Option<Decimal>,
    pub recorded_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(date: NaiveDate, rates: &RateMap) -> Self {
        let mut rate = Self {
            id: Uuid::new_v4(),
            date,
            rate_to_brl: None,
            rate_to_eur: None,
            rate_to_jpy: None,
            recorded_at: Utc::now(),
        };
        rate.overwrite(rates);
        rate
    }

    /// Replaces every rate column with the values in `rates` and bumps
    /// `recorded_at`. Currencies missing from `rates` become NULL.
    pub fn overwrite(&mut self, rates: &RateMap) {
        self.rate_to_brl = scaled(rates, Currency::Brl);
        self.rate_to_eur = scaled(rates, Currency::Eur);
        self.rate_to_jpy = scaled(rates, Currency::Jpy);
        self.recorded_at = Utc::now();
    }

    pub fn rate(&self, currency: Currency) -> Option<Decimal> {
        match currency {
            Currency::Brl => self.rate_to_brl,
            Currency::Eur => self.rate_to_eur,
            Currency::Jpy => self.rate_to_jpy,
        }
    }

    pub fn rates(&self) -> RateMap {
        Currency::ALL
            .into_iter()
            .filter_map(|currency| self.rate(currency).map(|rate| (currency, rate)))
            .collect()
    }
}

pub fn scaled(rates: &RateMap, currency: Currency) -> Option<Decimal> {
    rates.get(&currency).map(|rate| rate.round_dp(RATE_SCALE))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_rounds_to_four_places_and_leaves_missing_currencies_null() {
        let rates = RateMap::from([(Currency::Brl, dec!(5.123456)), (Currency::Jpy, dec!(110))]);

        let rate = ExchangeRate::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), &rates);

        assert_eq!(rate.rate_to_brl, Some(dec!(5.1235)));
        assert_eq!(rate.rate_to_eur, None);
        assert_eq!(rate.rate_to_jpy, Some(dec!(110)));
        assert_eq!(rate.rates().len(), 2);
    }

    #[test]
    fn overwrite_clears_rates_absent_from_the_new_map() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut rate = ExchangeRate::new(date, &RateMap::from([(Currency::Eur, dec!(0.91))]));
        let id = rate.id;

        rate.overwrite(&RateMap::from([(Currency::Brl, dec!(4.9))]));

        assert_eq!(rate.id, id);
        assert_eq!(rate.rate_to_brl, Some(dec!(4.9)));
        assert_eq!(rate.rate_to_eur, None);
    }
}
