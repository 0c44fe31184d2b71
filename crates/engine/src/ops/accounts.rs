//! Account store operations: queries, the atomic `apply_delta` primitive and
//! account administration.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, EntityTrait, Statement, sea_query::OnConflict,
};

use crate::{Account, Amount, Currency, EngineError, ResultEngine, accounts};

use super::Engine;

/// Default values written into fields that are absent, both when creating a
/// fresh account and when backfilling pre-existing rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountDefaults {
    /// Initial balance for every currency.
    pub balance: Amount,
    /// Initial collected tax for every category.
    pub collected_tax: Amount,
}

impl Engine {
    /// Full projection of one account. `NULL` (never-initialized) fields read
    /// as zero.
    pub async fn account(&self, account_id: &str) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::UnknownAccount(account_id.to_string()))?;
        Ok(Account::from(model))
    }

    /// Single-currency balance of one account.
    pub async fn balance(&self, account_id: &str, currency: Currency) -> ResultEngine<Amount> {
        Ok(self.account(account_id).await?.balance(currency))
    }

    /// Creates a zeroed-by-default account row unless one already exists.
    ///
    /// Returns `true` when a row was actually created.
    pub async fn create_account_if_missing(
        &self,
        account_id: &str,
        defaults: &AccountDefaults,
    ) -> ResultEngine<bool> {
        let model = accounts::ActiveModel {
            id: ActiveValue::Set(account_id.to_string()),
            balance_euro: ActiveValue::Set(Some(defaults.balance.units())),
            balance_gold: ActiveValue::Set(Some(defaults.balance.units())),
            balance_ron: ActiveValue::Set(Some(defaults.balance.units())),
            tax_transfer: ActiveValue::Set(Some(defaults.collected_tax.units())),
            tax_market: ActiveValue::Set(Some(defaults.collected_tax.units())),
            tax_work: ActiveValue::Set(Some(defaults.collected_tax.units())),
            is_frozen: ActiveValue::Set(false),
            total_transactions: ActiveValue::Set(0),
            total_volume: ActiveValue::Set(0),
            last_transaction_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
        };

        let inserted = accounts::Entity::insert(model)
            .on_conflict(
                OnConflict::column(accounts::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(inserted > 0)
    }

    /// Freezes or unfreezes an account. A frozen account rejects every debit.
    pub async fn set_frozen(&self, account_id: &str, frozen: bool) -> ResultEngine<()> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "UPDATE accounts SET is_frozen = ? WHERE id = ?",
            [frozen.into(), account_id.into()],
        );
        let result = self.database.execute(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(EngineError::UnknownAccount(account_id.to_string()));
        }
        Ok(())
    }

    /// Applies a signed balance change as one atomic conditional update.
    ///
    /// Debits carry the guard in the `WHERE` clause (not frozen, funds
    /// sufficient), so two racing debits can never both pass a stale check.
    /// Returns the balance after the change.
    pub async fn apply_delta(
        &self,
        account_id: &str,
        currency: Currency,
        delta: Amount,
    ) -> ResultEngine<Amount> {
        let backend = self.database.get_database_backend();
        let col = currency.balance_column();

        let stmt = if delta.is_negative() {
            Statement::from_sql_and_values(
                backend,
                format!(
                    "UPDATE accounts SET {col} = {col} + ? \
                     WHERE id = ? AND is_frozen = ? AND COALESCE({col}, 0) + ? >= 0"
                ),
                [
                    delta.units().into(),
                    account_id.into(),
                    false.into(),
                    delta.units().into(),
                ],
            )
        } else {
            Statement::from_sql_and_values(
                backend,
                format!("UPDATE accounts SET {col} = COALESCE({col}, 0) + ? WHERE id = ?"),
                [delta.units().into(), account_id.into()],
            )
        };

        let result = self.database.execute(stmt).await?;
        if result.rows_affected() == 0 {
            let account = self.account(account_id).await?;
            if account.is_frozen && delta.is_negative() {
                return Err(EngineError::AccountFrozen(account_id.to_string()));
            }
            return Err(EngineError::InsufficientFunds(account_id.to_string()));
        }

        self.balance(account_id, currency).await
    }
}
