//! Admin-only treasury endpoint.

use api_types::treasury::TreasuryResponse;
use axum::{Extension, Json, extract::State};

use crate::{
    Identity, Role, ServerError, balances::balance_map, server::ServerState,
};

pub async fn show(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<TreasuryResponse>, ServerError> {
    if identity.role != Role::Admin {
        return Err(ServerError::Forbidden("admin role required".to_string()));
    }

    let snapshot = state.engine.treasury().await?;

    Ok(Json(TreasuryResponse {
        success: true,
        funds: balance_map(&snapshot.funds),
        total_tax_collected: balance_map(&snapshot.total_tax_collected),
    }))
}
