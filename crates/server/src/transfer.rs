//! Transfer API endpoint.

use api_types::transfer::{TransferAmounts, TransferData, TransferNew, TransferResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Amount, TransferCmd};

use crate::{Identity, ServerError, server::ServerState};

pub(crate) fn from_api_currency(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Euro => engine::Currency::Euro,
        api_types::Currency::Gold => engine::Currency::Gold,
        api_types::Currency::Ron => engine::Currency::Ron,
    }
}

pub(crate) fn to_api_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Euro => api_types::Currency::Euro,
        engine::Currency::Gold => api_types::Currency::Gold,
        engine::Currency::Ron => api_types::Currency::Ron,
    }
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferResponse>), ServerError> {
    let amount: Amount = payload.amount.parse()?;

    let record = state
        .engine
        .transfer(TransferCmd {
            sender_id: identity.account_id,
            receiver_id: payload.receiver_id,
            currency: from_api_currency(payload.currency),
            amount,
            description: payload.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransferResponse {
            success: true,
            data: TransferData {
                transaction_id: record.id,
                amounts: TransferAmounts {
                    gross: record.gross.to_string(),
                    tax: record.tax.to_string(),
                    net: record.net.to_string(),
                },
            },
        }),
    ))
}
