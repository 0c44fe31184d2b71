use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Game currency held by accounts and the treasury.
///
/// All three currencies use 4 minor units (see `Amount`), so `10.5000 EURO`
/// is stored as the integer `105000`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Euro,
    Gold,
    Ron,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Euro, Currency::Gold, Currency::Ron];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Euro => "EURO",
            Currency::Gold => "GOLD",
            Currency::Ron => "RON",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        4
    }

    /// Column holding this currency's balance on the `accounts` table.
    #[must_use]
    pub const fn balance_column(self) -> &'static str {
        match self {
            Currency::Euro => "balance_euro",
            Currency::Gold => "balance_gold",
            Currency::Ron => "balance_ron",
        }
    }

    /// Column holding this currency's spendable pool on the `treasury` table.
    #[must_use]
    pub const fn funds_column(self) -> &'static str {
        match self {
            Currency::Euro => "funds_euro",
            Currency::Gold => "funds_gold",
            Currency::Ron => "funds_ron",
        }
    }

    /// Column holding this currency's cumulative collected tax on the
    /// `treasury` table.
    #[must_use]
    pub const fn tax_collected_column(self) -> &'static str {
        match self {
            Currency::Euro => "tax_collected_euro",
            Currency::Gold => "tax_collected_gold",
            Currency::Ron => "tax_collected_ron",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EURO" => Ok(Currency::Euro),
            "GOLD" => Ok(Currency::Gold),
            "RON" => Ok(Currency::Ron),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
