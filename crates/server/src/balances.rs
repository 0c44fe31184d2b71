//! Balance query endpoints. Read-only.

use api_types::{
    BalanceMap,
    balance::{BalanceResponse, BalancesResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{Identity, ServerError, server::ServerState, transfer::to_api_currency};

pub(crate) fn balance_map(balances: &engine::Balances) -> BalanceMap {
    BalanceMap {
        euro: balances.euro.to_string(),
        gold: balances.gold.to_string(),
        ron: balances.ron.to_string(),
    }
}

pub async fn all(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let account = state.engine.account(&identity.account_id).await?;

    Ok(Json(BalancesResponse {
        success: true,
        balances: balance_map(&account.balances),
    }))
}

pub async fn one(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(currency): Path<String>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let currency = engine::Currency::try_from(currency.as_str())?;
    let balance = state.engine.balance(&identity.account_id, currency).await?;

    Ok(Json(BalanceResponse {
        success: true,
        currency: to_api_currency(currency),
        balance: balance.to_string(),
    }))
}
