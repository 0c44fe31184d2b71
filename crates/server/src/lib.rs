use api_types::error::{ApiError, ErrorCode};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use identity::{Identity, Role};
pub use server::{app, run, run_with_listener, spawn_with_listener};

mod balances;
mod history;
mod identity;
mod server;
mod transfer;
mod treasury;

pub mod types {
    pub mod transfer {
        pub use api_types::transfer::{TransferAmounts, TransferData, TransferNew, TransferResponse};
    }

    pub mod balance {
        pub use api_types::balance::{BalanceResponse, BalancesResponse};
    }

    pub mod history {
        pub use api_types::history::{HistoryQuery, HistoryResponse, TransferView};
    }

    pub mod treasury {
        pub use api_types::treasury::TreasuryResponse;
    }

    pub mod error {
        pub use api_types::error::{ApiError, ErrorCode};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Forbidden(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::UnknownAccount(_) => StatusCode::NOT_FOUND,
        EngineError::AccountFrozen(_) => StatusCode::FORBIDDEN,
        EngineError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientFunds(_)
        | EngineError::InvalidAmount(_)
        | EngineError::SameAccount(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn code_for_engine_error(err: &EngineError) -> ErrorCode {
    match err {
        EngineError::InsufficientFunds(_) => ErrorCode::InsufficientFunds,
        EngineError::AccountFrozen(_) => ErrorCode::AccountFrozen,
        EngineError::InvalidAmount(_) => ErrorCode::InvalidAmount,
        EngineError::RateLimitExceeded(_) => ErrorCode::RateLimitExceeded,
        EngineError::SameAccount(_) => ErrorCode::SameAccount,
        EngineError::UnknownAccount(_) => ErrorCode::UnknownAccount,
        EngineError::Conflict(_) => ErrorCode::Conflict,
        EngineError::Database(_) => ErrorCode::Internal,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, error) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                code_for_engine_error(&err),
                message_for_engine_error(err),
            ),
            ServerError::Forbidden(err) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidAmount, err),
        };

        (
            status,
            Json(ApiError {
                success: false,
                error,
                code,
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_maps_to_422() {
        let res = ServerError::from(EngineError::InsufficientFunds("a".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unknown_account_maps_to_404() {
        let res = ServerError::from(EngineError::UnknownAccount("a".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn frozen_account_maps_to_403() {
        let res = ServerError::from(EngineError::AccountFrozen("a".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let res = ServerError::from(EngineError::RateLimitExceeded("a".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("race".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let res = ServerError::Forbidden("admin role required".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
