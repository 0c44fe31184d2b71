//! Wire types shared by the economy server and its clients.
//!
//! Monetary values cross the wire exclusively as fixed-point strings with 4
//! fraction digits (e.g. `"12.5000"`); the engine owns parsing and formatting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Euro,
    Gold,
    Ron,
}

/// One amount per currency, keyed by currency code in JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceMap {
    #[serde(rename = "EURO")]
    pub euro: String,
    #[serde(rename = "GOLD")]
    pub gold: String,
    #[serde(rename = "RON")]
    pub ron: String,
}

pub mod transfer {
    use super::*;

    /// Request body for `POST /transfer`. The sender is the authenticated
    /// caller, never part of the body.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferNew {
        pub receiver_id: String,
        /// Gross amount as a fixed-point string, scale 4.
        pub amount: String,
        pub currency: Currency,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferAmounts {
        pub gross: String,
        pub tax: String,
        pub net: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferData {
        pub transaction_id: Uuid,
        pub amounts: TransferAmounts,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferResponse {
        pub success: bool,
        pub data: TransferData,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub success: bool,
        pub balances: BalanceMap,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceResponse {
        pub success: bool,
        pub currency: Currency,
        pub balance: String,
    }
}

pub mod history {
    use super::*;

    /// Query string for `GET /history`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryQuery {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: Uuid,
        pub sender_id: String,
        pub receiver_id: String,
        pub currency: Currency,
        pub gross: String,
        pub tax: String,
        pub net: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub success: bool,
        pub transactions: Vec<TransferView>,
        pub next_cursor: Option<String>,
    }
}

pub mod treasury {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TreasuryResponse {
        pub success: bool,
        pub funds: BalanceMap,
        pub total_tax_collected: BalanceMap,
    }
}

pub mod error {
    use super::*;

    /// Stable machine-readable error codes surfaced to callers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum ErrorCode {
        InsufficientFunds,
        AccountFrozen,
        InvalidAmount,
        RateLimitExceeded,
        UnknownAccount,
        SameAccount,
        Forbidden,
        Conflict,
        Internal,
    }

    /// Error envelope: `success` is always `false`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApiError {
        pub success: bool,
        pub error: String,
        pub code: ErrorCode,
    }
}
