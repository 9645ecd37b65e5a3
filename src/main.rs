use actix_web::{App, HttpServer, middleware, web};
use anyhow::{Context, Result};

use api::AppState;
use config::Config;
use store::{MemoryStore, PgStore};
use vat_comply::VatComplyClient;

mod api;
mod collector;
mod config;
mod currency;
mod exchange_rate;
mod store;
#[cfg(test)]
mod testing;
mod vat_comply;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = Config::from_env().context("Can't read configuration from environment")?;

    let source = VatComplyClient::new(cfg.rates_api_url.clone(), cfg.rates_api_timeout())
        .context("Can't build HTTP client")?;

    let state = match cfg.database_url() {
        Some(url) => {
            let store = PgStore::connect(url, cfg.database_max_connections)
                .await
                .context("Can't connect to database")?;
            log::info!("Storing rates in PostgreSQL");
            AppState::new(source, store)
        }
        None => {
            log::warn!("DATABASE_URL is not set, rates will only be kept in memory");
            AppState::new(source, MemoryStore::new())
        }
    };
    let state = web::Data::new(state);

    log::info!("Listening on {}", cfg.http_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind(cfg.http_address.as_str())
    .with_context(|| format!("Can't bind {}", cfg.http_address))?
    .run()
    .await?;

    Ok(())
}
