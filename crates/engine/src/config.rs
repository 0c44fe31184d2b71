//! Injected engine configuration.
//!
//! Tax rates, the per-transfer ceiling and the throttling windows are policy
//! owned by the deployment, never by the engine; the app layer reads them
//! from `settings.toml` and passes them to the builder.

use std::collections::HashMap;

use crate::{Amount, Currency, TaxRate, rate_limit::RateLimits};

/// Per-currency transfer tax rates. Missing entries mean untaxed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaxTable {
    rates: HashMap<Currency, TaxRate>,
}

impl TaxTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same rate for every currency.
    #[must_use]
    pub fn uniform(rate: TaxRate) -> Self {
        let mut table = Self::new();
        for currency in Currency::ALL {
            table.rates.insert(currency, rate);
        }
        table
    }

    #[must_use]
    pub fn with_rate(mut self, currency: Currency, rate: TaxRate) -> Self {
        self.rates.insert(currency, rate);
        self
    }

    #[must_use]
    pub fn rate_for(&self, currency: Currency) -> TaxRate {
        self.rates.get(&currency).copied().unwrap_or(TaxRate::ZERO)
    }
}

#[derive(Clone, Debug)]
pub struct EconomyConfig {
    pub tax: TaxTable,
    /// Largest gross amount accepted in a single transfer.
    pub transfer_ceiling: Amount,
    pub limits: RateLimits,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            tax: TaxTable::default(),
            transfer_ceiling: Amount::new(Amount::MAX_UNITS),
            limits: RateLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rate_means_untaxed() {
        let table = TaxTable::new().with_rate(Currency::Euro, TaxRate::from_bps(500).unwrap());
        assert_eq!(table.rate_for(Currency::Euro).bps(), 500);
        assert_eq!(table.rate_for(Currency::Gold), TaxRate::ZERO);
    }
}
