//! The module contains the errors the engine can throw.
//!
//! Monetary failures are fully transactional: whenever an operation returns
//! any of these errors, no balance has changed.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Account is frozen: {0}")]
    AccountFrozen(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    #[error("Sender and receiver are the same account: {0}")]
    SameAccount(String),
    #[error("\"{0}\" account not found!")]
    UnknownAccount(String),
    #[error("Lost a concurrent update race: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::AccountFrozen(a), Self::AccountFrozen(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::RateLimitExceeded(a), Self::RateLimitExceeded(b)) => a == b,
            (Self::SameAccount(a), Self::SameAccount(b)) => a == b,
            (Self::UnknownAccount(a), Self::UnknownAccount(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
