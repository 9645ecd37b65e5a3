use chrono::{Datelike, NaiveDate, Weekday};

use crate::{currency::RateMap, store::RateStore, vat_comply::RateSource};

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRates {
    pub date: NaiveDate,
    pub rates: RateMap,
}

/// Fetches every business day of a period and persists what it gets.
pub struct PeriodCollector<'a> {
    source: &'a dyn RateSource,
    store: &'a dyn RateStore,
}

impl<'a> PeriodCollector<'a> {
    pub fn new(source: &'a dyn RateSource, store: &'a dyn RateStore) -> Self {
        Self { source, store }
    }

    /// Walks `start..=end` in ascending order. Weekends are never fetched and
    /// days whose fetch fails are left out of the result.
    pub async fn collect(&self, start_date: NaiveDate, end_date: NaiveDate) -> Vec<DailyRates> {
        let mut collected = Vec::new();
        let mut current_date = start_date;

        while current_date <= end_date {
            if is_business_day(current_date) {
                if let Some(daily) = self.collect_day(current_date).await {
                    collected.push(daily);
                }
            }

            match current_date.succ_opt() {
                Some(next) => current_date = next,
                None => break,
            }
        }

        collected
    }

    async fn collect_day(&self, date: NaiveDate) -> Option<DailyRates> {
        let rates = match self.source.fetch(date).await {
            Ok(rates) => rates,
            Err(err) => {
                log::warn!("No rates for {}: {}", date, err);
                return None;
            }
        };

        // A failed write still hands the fetched rates back to the caller.
        match self.store.upsert(date, &rates).await {
            Ok(saved) => log::debug!(
                "{} rates for {} (id {}, recorded at {})",
                if saved.created { "Saved" } else { "Updated" },
                date,
                saved.rate.id,
                saved.rate.recorded_at
            ),
            Err(err) => log::error!("Failed to persist rates for {}: {}", date, err),
        }

        Some(DailyRates { date, rates })
    }
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        store::MemoryStore,
        testing::{FailingStore, FakeSource, rates},
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn weekends_are_not_business_days() {
        // 2024-01-06 is a Saturday.
        assert!(is_business_day(day(5)));
        assert!(!is_business_day(day(6)));
        assert!(!is_business_day(day(7)));
        assert!(is_business_day(day(8)));
    }

    #[tokio::test]
    async fn collects_a_full_week_in_order() {
        let source = (1..=5).fold(FakeSource::new(), |source, d| {
            source.with(day(d), rates(dec!(5.25), dec!(0.85), dec!(110)))
        });
        let store = MemoryStore::new();

        let collected = PeriodCollector::new(&source, &store)
            .collect(day(1), day(5))
            .await;

        let dates: Vec<_> = collected.iter().map(|daily| daily.date).collect();
        assert_eq!(dates, (1..=5).map(day).collect::<Vec<_>>());
        assert_eq!(store.range(day(1), day(5)).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn skips_weekends_without_fetching() {
        let source = (1..=10).fold(FakeSource::new(), |source, d| {
            source.with(day(d), rates(dec!(5), dec!(1), dec!(100)))
        });
        let store = MemoryStore::new();

        let collected = PeriodCollector::new(&source, &store)
            .collect(day(5), day(8))
            .await;

        assert_eq!(
            collected.iter().map(|daily| daily.date).collect::<Vec<_>>(),
            vec![day(5), day(8)]
        );
        assert_eq!(source.calls(), vec![day(5), day(8)]);
    }

    #[tokio::test]
    async fn failed_days_are_omitted_and_not_stored() {
        let source = FakeSource::new()
            .with(day(1), rates(dec!(5), dec!(1), dec!(100)))
            .with(day(3), rates(dec!(5), dec!(1), dec!(100)));
        let store = MemoryStore::new();

        let collected = PeriodCollector::new(&source, &store)
            .collect(day(1), day(3))
            .await;

        assert_eq!(
            collected.iter().map(|daily| daily.date).collect::<Vec<_>>(),
            vec![day(1), day(3)]
        );
        assert_eq!(source.calls(), vec![day(1), day(2), day(3)]);
        assert_eq!(store.range(day(1), day(3)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn keeps_fetched_rates_when_the_write_fails() {
        let source = FakeSource::new().with(day(2), rates(dec!(4.9), dec!(0.9), dec!(141)));

        let collected = PeriodCollector::new(&source, &FailingStore)
            .collect(day(2), day(2))
            .await;

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].rates, rates(dec!(4.9), dec!(0.9), dec!(141)));
    }

    #[tokio::test]
    async fn weekend_only_range_is_empty() {
        let source = FakeSource::new();
        let store = MemoryStore::new();

        let collected = PeriodCollector::new(&source, &store)
            .collect(day(6), day(7))
            .await;

        assert!(collected.is_empty());
        assert!(source.calls().is_empty());
    }
}
