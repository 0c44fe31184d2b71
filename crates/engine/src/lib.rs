pub use accounts::{Account, Balances, CollectedTax, TaxCategory};
pub use amount::{Amount, TaxRate};
pub use config::{EconomyConfig, TaxTable};
pub use currency::Currency;
pub use error::EngineError;
pub use ops::{AccountDefaults, BackfillReport, Engine, EngineBuilder, TransferCmd};
pub use rate_limit::{FixedWindowLimiter, OpClass, RateLimiter, RateLimits, WindowLimit};
pub use transfers::TransferRecord;
pub use treasury::TreasurySnapshot;

mod accounts;
mod amount;
mod config;
mod currency;
mod error;
mod ops;
mod rate_limit;
mod transfers;
mod treasury;

type ResultEngine<T> = Result<T, EngineError>;
