//! Idempotent field backfill over the live account population.
//!
//! Rolling out a new account field leaves older rows with `NULL` in the new
//! columns. This runner patches only those holes: each account is updated by
//! one independent atomic statement that fills missing fields with their
//! defaults and never touches a value that is already present, even a
//! malformed one. Running it twice reports `modified = 0` the second time.

use sea_orm::{ConnectionTrait, Statement};

use crate::ResultEngine;

use super::{Engine, accounts::AccountDefaults};

/// Columns the backfill owns. Financial fields only ever go from absent to
/// their default; they are never rewritten in place.
const MISSING_FIELDS: &str = "balance_euro IS NULL OR balance_gold IS NULL \
     OR balance_ron IS NULL OR tax_transfer IS NULL \
     OR tax_market IS NULL OR tax_work IS NULL";

/// Outcome of one backfill pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Accounts that were missing at least one target field when scanned.
    pub matched: u64,
    /// Accounts actually updated.
    pub modified: u64,
    /// Accounts still missing fields after the pass. Non-zero is a warning,
    /// not a failure (rows may have appeared mid-run).
    pub remaining: u64,
}

impl Engine {
    /// Fills missing default fields on every account that lacks them.
    ///
    /// Safe against a live, concurrently-mutating population: each row is
    /// patched by its own atomic update and transfers are never blocked for
    /// longer than one such update. A store error halts the batch; the counts
    /// committed so far are logged before the error propagates.
    pub async fn run_backfill(&self, defaults: &AccountDefaults) -> ResultEngine<BackfillReport> {
        let backend = self.database.get_database_backend();

        let rows = self
            .database
            .query_all(Statement::from_string(
                backend,
                format!("SELECT id FROM accounts WHERE {MISSING_FIELDS}"),
            ))
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get::<String>("", "id")?);
        }
        let matched = ids.len() as u64;

        let mut modified = 0u64;
        for id in &ids {
            let stmt = Statement::from_sql_and_values(
                backend,
                format!(
                    "UPDATE accounts SET \
                     balance_euro = COALESCE(balance_euro, ?), \
                     balance_gold = COALESCE(balance_gold, ?), \
                     balance_ron = COALESCE(balance_ron, ?), \
                     tax_transfer = COALESCE(tax_transfer, ?), \
                     tax_market = COALESCE(tax_market, ?), \
                     tax_work = COALESCE(tax_work, ?) \
                     WHERE id = ? AND ({MISSING_FIELDS})"
                ),
                [
                    defaults.balance.units().into(),
                    defaults.balance.units().into(),
                    defaults.balance.units().into(),
                    defaults.collected_tax.units().into(),
                    defaults.collected_tax.units().into(),
                    defaults.collected_tax.units().into(),
                    id.clone().into(),
                ],
            );

            match self.database.execute(stmt).await {
                Ok(result) => modified += result.rows_affected(),
                Err(err) => {
                    tracing::error!(matched, modified, "backfill halted by store error: {err}");
                    return Err(err.into());
                }
            }
        }

        let remaining = {
            let row = self
                .database
                .query_one(Statement::from_string(
                    backend,
                    format!("SELECT COUNT(*) AS remaining FROM accounts WHERE {MISSING_FIELDS}"),
                ))
                .await?;
            row.and_then(|r| r.try_get::<i64>("", "remaining").ok())
                .unwrap_or(0) as u64
        };

        if remaining > 0 {
            tracing::warn!(remaining, "accounts still missing fields after backfill");
        }
        tracing::info!(matched, modified, remaining, "account backfill finished");

        Ok(BackfillReport {
            matched,
            modified,
            remaining,
        })
    }
}
