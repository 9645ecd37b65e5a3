use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Largest `end_date - start_date` the live endpoint accepts: seven calendar
/// days, enough for five business days.
pub const MAX_PERIOD_SPAN_DAYS: i64 = 6;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Datas de início e fim são obrigatórias.")]
    MissingDates,
    #[error("Formato de data inválido. Use YYYY-MM-DD.")]
    InvalidFormat,
    #[error("A data de início deve ser anterior à data de fim.")]
    InvertedPeriod,
    #[error("O período máximo permitido é de 5 dias úteis (máximo 7 dias corridos).")]
    PeriodTooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;

        if start > end {
            return Err(ValidationError::InvertedPeriod);
        }

        Ok(Self { start, end })
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Raw `start_date`/`end_date` query parameters. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl PeriodQuery {
    fn bounds(&self) -> Option<(&str, &str)> {
        let start = self.start_date.as_deref().filter(|s| !s.is_empty())?;
        let end = self.end_date.as_deref().filter(|s| !s.is_empty())?;
        Some((start, end))
    }

    /// Both dates must be present and at most seven calendar days apart.
    pub fn required_period(&self) -> Result<Period, ValidationError> {
        let (start, end) = self.bounds().ok_or(ValidationError::MissingDates)?;
        let period = Period::parse(start, end)?;

        if period.span_days() > MAX_PERIOD_SPAN_DAYS {
            return Err(ValidationError::PeriodTooLong);
        }

        Ok(period)
    }

    /// `None` unless both dates are given. No length limit.
    pub fn optional_period(&self) -> Result<Option<Period>, ValidationError> {
        self.bounds()
            .map(|(start, end)| Period::parse(start, end))
            .transpose()
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat)
}
