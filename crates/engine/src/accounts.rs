//! The module contains the `Account` struct and its persisted model.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{Amount, Currency};

/// Per-currency amounts, used for account balances and treasury totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Balances {
    pub euro: Amount,
    pub gold: Amount,
    pub ron: Amount,
}

impl Balances {
    #[must_use]
    pub const fn get(&self, currency: Currency) -> Amount {
        match currency {
            Currency::Euro => self.euro,
            Currency::Gold => self.gold,
            Currency::Ron => self.ron,
        }
    }
}

/// Category of an operation that withholds tax from an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaxCategory {
    Transfer,
    Market,
    Work,
}

impl TaxCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Market => "market",
            Self::Work => "work",
        }
    }

    /// Audit column on the `accounts` table for this category.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Transfer => "tax_transfer",
            Self::Market => "tax_market",
            Self::Work => "tax_work",
        }
    }
}

/// Tax withheld from an account's outgoing operations, by category.
///
/// Audit data only; not part of the spendable balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectedTax {
    pub transfer: Amount,
    pub market: Amount,
    pub work: Amount,
}

/// A balance-holding entity: a player or a company.
///
/// Balances are non-negative at all times; the store-level guards in the
/// engine operations enforce this, never this struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub balances: Balances,
    pub collected_tax: CollectedTax,
    /// When true, every debit against this account is rejected.
    pub is_frozen: bool,
    pub total_transactions: i64,
    /// Cumulative gross minor units moved through this account. Reporting
    /// only; mixes currencies.
    pub total_volume: Amount,
    pub last_transaction_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub const fn balance(&self, currency: Currency) -> Amount {
        self.balances.get(currency)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Balance columns are nullable on purpose: `NULL` means the field was
    /// never initialized for this row and is a backfill target. Queries
    /// project `NULL` as zero.
    pub balance_euro: Option<i64>,
    pub balance_gold: Option<i64>,
    pub balance_ron: Option<i64>,
    pub tax_transfer: Option<i64>,
    pub tax_market: Option<i64>,
    pub tax_work: Option<i64>,
    pub is_frozen: bool,
    pub total_transactions: i64,
    pub total_volume: i64,
    pub last_transaction_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            balances: Balances {
                euro: Amount::new(model.balance_euro.unwrap_or(0)),
                gold: Amount::new(model.balance_gold.unwrap_or(0)),
                ron: Amount::new(model.balance_ron.unwrap_or(0)),
            },
            collected_tax: CollectedTax {
                transfer: Amount::new(model.tax_transfer.unwrap_or(0)),
                market: Amount::new(model.tax_market.unwrap_or(0)),
                work: Amount::new(model.tax_work.unwrap_or(0)),
            },
            is_frozen: model.is_frozen,
            total_transactions: model.total_transactions,
            total_volume: Amount::new(model.total_volume),
            last_transaction_at: model.last_transaction_at,
            created_at: model.created_at,
        }
    }
}
