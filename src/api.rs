use actix_web::{
    HttpResponse, ResponseError,
    http::{StatusCode, header::ContentType},
    web,
};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::{
    collector::PeriodCollector,
    currency::{Currency, RateMap},
    store::{LATEST_LIMIT, RateStore, StoreError},
    vat_comply::RateSource,
};

pub mod validation;

use validation::{PeriodQuery, ValidationError};

const INDEX_HTML: &str = include_str!("../static/index.html");
const SCRIPT_JS: &str = include_str!("../static/js/script.js");

const LIVE_NO_DATA: &str = "Nenhum dado de cotação encontrado para o período.";
const STORED_NO_DATA: &str =
    "Nenhum dado de cotação encontrado no banco de dados para o período especificado.";

pub struct AppState {
    pub source: Box<dyn RateSource>,
    pub store: Box<dyn RateStore>,
}

impl AppState {
    pub fn new(source: impl RateSource + 'static, store: impl RateStore + 'static) -> Self {
        Self {
            source: Box::new(source),
            store: Box::new(store),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Erro ao consultar o banco de dados.")]
    Store(#[from] StoreError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Store(err) = self {
            log::error!("Store query failed: {}", err);
        }

        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// Column-oriented payload consumed by the chart: one entry per date in every
/// series, `null` where a currency was not quoted.
#[derive(Debug, Default, Serialize)]
pub struct RateSeries {
    dates: Vec<String>,
    #[serde(rename = "BRL")]
    brl: Vec<Option<f64>>,
    #[serde(rename = "EUR")]
    eur: Vec<Option<f64>>,
    #[serde(rename = "JPY")]
    jpy: Vec<Option<f64>>,
}

impl RateSeries {
    fn push(&mut self, date: NaiveDate, rates: &RateMap) {
        let rate = |currency: Currency| rates.get(&currency).and_then(ToPrimitive::to_f64);

        self.dates.push(date.format("%Y-%m-%d").to_string());
        self.brl.push(rate(Currency::Brl));
        self.eur.push(rate(Currency::Eur));
        self.jpy.push(rate(Currency::Jpy));
    }
}

impl FromIterator<(NaiveDate, RateMap)> for RateSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, RateMap)>>(iter: I) -> Self {
        let mut series = Self::default();
        for (date, rates) in iter {
            series.push(date, &rates);
        }
        series
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/static/js/script.js", web::get().to(script))
        .route("/api/cotacoes/", web::get().to(live_rates))
        .route("/api/cotacoes/db/", web::get().to(stored_rates));
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

async fn script() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/javascript; charset=utf-8")
        .body(SCRIPT_JS)
}

/// Fetches the period from upstream, persisting every day it gets.
async fn live_rates(
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    let period = query.required_period()?;

    let collected = PeriodCollector::new(state.source.as_ref(), state.store.as_ref())
        .collect(period.start, period.end)
        .await;

    if collected.is_empty() {
        return Ok(no_data(LIVE_NO_DATA));
    }

    let series: RateSeries = collected
        .into_iter()
        .map(|daily| (daily.date, daily.rates))
        .collect();

    Ok(HttpResponse::Ok().json(series))
}

/// Serves previously collected rates without touching upstream.
async fn stored_rates(
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    let rates = match query.optional_period()? {
        Some(period) => state.store.range(period.start, period.end).await?,
        None => {
            log::debug!("No period given, returning the latest {} records", LATEST_LIMIT);
            state.store.latest(LATEST_LIMIT).await?
        }
    };

    if rates.is_empty() {
        return Ok(no_data(STORED_NO_DATA));
    }

    let series: RateSeries = rates.iter().map(|rate| (rate.date, rate.rates())).collect();

    Ok(HttpResponse::Ok().json(series))
}

fn no_data(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": message }))
}
