use std::time::Duration;

use serde::Deserialize;

use crate::vat_comply;

/// Settings read from the environment (and `.env`, if present).
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_http_address")]
    pub http_address: String,
    /// Unset or empty keeps rates in memory.
    pub database_url: Option<String>,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_rates_api_url")]
    pub rates_api_url: String,
    #[serde(default = "default_rates_api_timeout_secs")]
    pub rates_api_timeout_secs: u64,
}

fn default_http_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_rates_api_url() -> String {
    vat_comply::DEFAULT_URL.to_string()
}

fn default_rates_api_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn rates_api_timeout(&self) -> Duration {
        Duration::from_secs(self.rates_api_timeout_secs)
    }
}
