//! Read-only transfer history for one account.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, TransferRecord, rate_limit::OpClass, transfers};

use super::Engine;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 100;

impl Engine {
    /// Lists transfers where the account is sender or receiver, newest first.
    ///
    /// Returns at most `limit` records (clamped to [`MAX_PAGE_SIZE`]) plus an
    /// opaque cursor for the next page when more exist. Never mutates.
    pub async fn history(
        &self,
        account_id: &str,
        limit: Option<u64>,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<TransferRecord>, Option<String>)> {
        self.limiter.check(account_id, OpClass::Query)?;

        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let mut query = transfers::Entity::find()
            .filter(
                Condition::any()
                    .add(transfers::Column::SenderId.eq(account_id))
                    .add(transfers::Column::ReceiverId.eq(account_id)),
            )
            .order_by_desc(transfers::Column::CreatedAt)
            .order_by_desc(transfers::Column::Id)
            .limit(limit + 1);

        if let Some(cursor) = cursor {
            let (created_at, id) = decode_cursor(cursor)?;
            query = query.filter(
                Condition::any()
                    .add(transfers::Column::CreatedAt.lt(created_at))
                    .add(
                        Condition::all()
                            .add(transfers::Column::CreatedAt.eq(created_at))
                            .add(transfers::Column::Id.lt(id.to_string())),
                    ),
            );
        }

        let models = query.all(&self.database).await?;
        let has_more = models.len() as u64 > limit;

        let mut records = Vec::with_capacity(models.len().min(limit as usize));
        for model in models.into_iter().take(limit as usize) {
            records.push(TransferRecord::try_from(model)?);
        }

        let next_cursor = if has_more {
            records.last().map(|r| encode_cursor(r.created_at, r.id))
        } else {
            None
        };

        Ok((records, next_cursor))
    }
}

fn encode_cursor(created_at: DateTime<Utc>, id: Uuid) -> String {
    BASE64.encode(format!("{}|{id}", created_at.to_rfc3339()))
}

fn decode_cursor(cursor: &str) -> Result<(DateTime<Utc>, Uuid), EngineError> {
    let invalid = || EngineError::InvalidAmount("invalid history cursor".to_string());

    let raw = BASE64.decode(cursor).map_err(|_| invalid())?;
    let raw = String::from_utf8(raw).map_err(|_| invalid())?;
    let (timestamp, id) = raw.split_once('|').ok_or_else(invalid)?;

    let created_at = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| invalid())?
        .with_timezone(&Utc);
    let id = Uuid::parse_str(id).map_err(|_| invalid())?;

    Ok((created_at, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips() {
        let created_at = Utc::now();
        let id = Uuid::new_v4();

        let (decoded_at, decoded_id) =
            decode_cursor(&encode_cursor(created_at, id)).unwrap();
        assert_eq!(decoded_at, created_at);
        assert_eq!(decoded_id, id);
    }

    #[test]
    fn garbage_cursor_is_rejected() {
        assert!(decode_cursor("not base64 at all!").is_err());
        assert!(decode_cursor(&BASE64.encode("no separator")).is_err());
    }
}
