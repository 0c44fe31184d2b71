//! Handles settings for the application. Configuration is written in
//! `settings.toml`.

use std::{collections::HashMap, time::Duration};

use config::{Config, ConfigError, File};
use serde::Deserialize;

use engine::{
    Amount, Currency, EconomyConfig, EngineError, RateLimits, TaxRate, TaxTable, WindowLimit,
};

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// Economy policy; injected into the engine, never hardcoded there.
#[derive(Debug, Deserialize)]
pub struct Economy {
    /// Transfer tax in basis points, keyed by currency code
    /// (e.g. `EURO = 500` is 5%).
    pub transfer_tax_bps: HashMap<String, u32>,
    /// Largest gross amount accepted per transfer, scale-4 string.
    pub transfer_ceiling: String,
    pub transfers_per_minute: u32,
}

impl Economy {
    pub fn to_config(&self) -> Result<EconomyConfig, EngineError> {
        let mut tax = TaxTable::new();
        for (code, bps) in &self.transfer_tax_bps {
            let currency = Currency::try_from(code.as_str())?;
            tax = tax.with_rate(currency, TaxRate::from_bps(*bps)?);
        }

        let transfer_ceiling: Amount = self.transfer_ceiling.parse()?;

        Ok(EconomyConfig {
            tax,
            transfer_ceiling,
            limits: RateLimits {
                transfer: Some(WindowLimit {
                    max_ops: self.transfers_per_minute,
                    window: Duration::from_secs(60),
                }),
                query: None,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub economy: Economy,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
