//! The taxed transfer between two accounts.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait, Statement,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    Amount, Currency, EngineError, ResultEngine, TaxCategory, TransferRecord, accounts,
    rate_limit::OpClass, transfers, treasury,
};

use super::{Engine, with_tx};

/// Attempts before a contended transfer is surfaced as `Conflict`. Only
/// transient store errors are retried; a transfer that *failed* is reported
/// once and never re-run.
const MAX_TRANSFER_ATTEMPTS: u32 = 3;

#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub sender_id: String,
    pub receiver_id: String,
    pub currency: Currency,
    /// Gross amount: debited from the sender before tax.
    pub amount: Amount,
    pub description: Option<String>,
}

impl Engine {
    /// Moves `amount` from sender to receiver, withholding the configured
    /// tax into the treasury.
    ///
    /// The three balance changes and the record append happen in one database
    /// transaction: any failure leaves every balance exactly as it was.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<TransferRecord> {
        // Throttled before any store access.
        self.limiter.check(&cmd.sender_id, OpClass::Transfer)?;

        if cmd.sender_id == cmd.receiver_id {
            return Err(EngineError::SameAccount(cmd.sender_id));
        }
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "transfer amount must be > 0".to_string(),
            ));
        }
        if cmd.amount > self.config.transfer_ceiling {
            return Err(EngineError::InvalidAmount(format!(
                "transfer amount above the {} ceiling",
                self.config.transfer_ceiling
            )));
        }

        let tax = self.config.tax.rate_for(cmd.currency).apply(cmd.amount);
        let net = cmd.amount - tax;

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.try_transfer(&cmd, tax, net).await {
                Err(EngineError::Database(err)) if is_transient(&err) => {
                    if attempts < MAX_TRANSFER_ATTEMPTS {
                        tracing::debug!(attempt = attempts, "transfer hit store contention: {err}");
                        continue;
                    }
                    return Err(EngineError::Conflict(
                        "transfer lost the update race, retry later".to_string(),
                    ));
                }
                other => return other,
            }
        }
    }

    async fn try_transfer(
        &self,
        cmd: &TransferCmd,
        tax: Amount,
        net: Amount,
    ) -> ResultEngine<TransferRecord> {
        let record = TransferRecord {
            id: Uuid::new_v4(),
            sender_id: cmd.sender_id.clone(),
            receiver_id: cmd.receiver_id.clone(),
            currency: cmd.currency,
            gross: cmd.amount,
            tax,
            net,
            description: cmd.description.clone(),
            created_at: Utc::now(),
        };

        // An early `?` drops the transaction, which rolls every change back.
        let committed: ResultEngine<()> = with_tx!(self, |db_tx| {
            self.debit_sender(&db_tx, cmd, tax).await?;
            self.credit_receiver(&db_tx, cmd, net).await?;
            self.credit_treasury(&db_tx, cmd.currency, tax).await?;
            transfers::ActiveModel::from(&record).insert(&db_tx).await?;
            Ok(())
        });
        committed?;

        Ok(record)
    }

    /// Conditional debit: the funds/frozen guard lives in the `WHERE` clause,
    /// so the check and the write are one atomic statement. Sender counters
    /// and the transfer-tax audit column are folded into the same write.
    async fn debit_sender(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &TransferCmd,
        tax: Amount,
    ) -> ResultEngine<()> {
        let col = cmd.currency.balance_column();
        let tax_col = TaxCategory::Transfer.column();
        let stmt = Statement::from_sql_and_values(
            db_tx.get_database_backend(),
            format!(
                "UPDATE accounts SET {col} = {col} - ?, \
                 {tax_col} = COALESCE({tax_col}, 0) + ?, \
                 total_transactions = total_transactions + 1, \
                 total_volume = total_volume + ?, \
                 last_transaction_at = ? \
                 WHERE id = ? AND is_frozen = ? AND COALESCE({col}, 0) >= ?"
            ),
            [
                cmd.amount.units().into(),
                tax.units().into(),
                cmd.amount.units().into(),
                Utc::now().into(),
                cmd.sender_id.clone().into(),
                false.into(),
                cmd.amount.units().into(),
            ],
        );

        let result = db_tx.execute(stmt).await?;
        if result.rows_affected() == 0 {
            // The guard rejected the debit; diagnose inside the same
            // transaction so the answer cannot go stale.
            let model = accounts::Entity::find_by_id(cmd.sender_id.clone())
                .one(db_tx)
                .await?;
            return Err(match model {
                None => EngineError::UnknownAccount(cmd.sender_id.clone()),
                Some(model) if model.is_frozen => EngineError::AccountFrozen(cmd.sender_id.clone()),
                Some(_) => EngineError::InsufficientFunds(cmd.sender_id.clone()),
            });
        }
        Ok(())
    }

    async fn credit_receiver(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &TransferCmd,
        net: Amount,
    ) -> ResultEngine<()> {
        let col = cmd.currency.balance_column();
        let stmt = Statement::from_sql_and_values(
            db_tx.get_database_backend(),
            format!(
                "UPDATE accounts SET {col} = COALESCE({col}, 0) + ?, \
                 total_transactions = total_transactions + 1, \
                 total_volume = total_volume + ?, \
                 last_transaction_at = ? \
                 WHERE id = ?"
            ),
            [
                net.units().into(),
                net.units().into(),
                Utc::now().into(),
                cmd.receiver_id.clone().into(),
            ],
        );

        let result = db_tx.execute(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(EngineError::UnknownAccount(cmd.receiver_id.clone()));
        }
        Ok(())
    }

    async fn credit_treasury(
        &self,
        db_tx: &DatabaseTransaction,
        currency: Currency,
        tax: Amount,
    ) -> ResultEngine<()> {
        let funds_col = currency.funds_column();
        let collected_col = currency.tax_collected_column();
        let stmt = Statement::from_sql_and_values(
            db_tx.get_database_backend(),
            format!(
                "UPDATE treasury SET {funds_col} = {funds_col} + ?, \
                 {collected_col} = {collected_col} + ? \
                 WHERE id = ?"
            ),
            [
                tax.units().into(),
                tax.units().into(),
                treasury::TREASURY_ROW_ID.into(),
            ],
        );

        let result = db_tx.execute(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(EngineError::Database(DbErr::RecordNotFound(
                "treasury row missing".to_string(),
            )));
        }
        Ok(())
    }
}

fn is_transient(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("busy")
}
