//! Transfer history endpoint. Read-only, newest first.

use api_types::history::{HistoryQuery, HistoryResponse, TransferView};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{Identity, ServerError, server::ServerState, transfer::to_api_currency};

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let (records, next_cursor) = state
        .engine
        .history(&identity.account_id, query.limit, query.cursor.as_deref())
        .await?;

    let transactions = records
        .into_iter()
        .map(|record| TransferView {
            id: record.id,
            sender_id: record.sender_id,
            receiver_id: record.receiver_id,
            currency: to_api_currency(record.currency),
            gross: record.gross.to_string(),
            tax: record.tax.to_string(),
            net: record.net.to_string(),
            description: record.description,
            created_at: record.created_at,
        })
        .collect();

    Ok(Json(HistoryResponse {
        success: true,
        transactions,
        next_cursor,
    }))
}
