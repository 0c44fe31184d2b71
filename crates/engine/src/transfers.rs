//! Transfer record primitives.
//!
//! A `TransferRecord` is the immutable, append-only trace of one completed
//! taxed transfer. Records are created by the engine and never mutated or
//! deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DbErr, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Amount, Currency, EngineError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: Uuid,
    pub sender_id: String,
    pub receiver_id: String,
    pub currency: Currency,
    /// Amount debited from the sender. `gross = net + tax`, exactly.
    pub gross: Amount,
    /// Amount withheld into the treasury.
    pub tax: Amount,
    /// Amount credited to the receiver.
    pub net: Amount,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub currency: String,
    pub gross_minor: i64,
    pub tax_minor: i64,
    pub net_minor: i64,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransferRecord> for ActiveModel {
    fn from(record: &TransferRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            sender_id: ActiveValue::Set(record.sender_id.clone()),
            receiver_id: ActiveValue::Set(record.receiver_id.clone()),
            currency: ActiveValue::Set(record.currency.code().to_string()),
            gross_minor: ActiveValue::Set(record.gross.units()),
            tax_minor: ActiveValue::Set(record.tax.units()),
            net_minor: ActiveValue::Set(record.net.units()),
            description: ActiveValue::Set(record.description.clone()),
            created_at: ActiveValue::Set(record.created_at),
        }
    }
}

impl TryFrom<Model> for TransferRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| {
                EngineError::Database(DbErr::Custom(format!(
                    "malformed transfer id: {}",
                    model.id
                )))
            })?,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            gross: Amount::new(model.gross_minor),
            tax: Amount::new(model.tax_minor),
            net: Amount::new(model.net_minor),
            description: model.description,
            created_at: model.created_at,
        })
    }
}
