use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait, sea_query::OnConflict};

use crate::{
    EconomyConfig, EngineError, ResultEngine, TreasurySnapshot,
    rate_limit::{FixedWindowLimiter, RateLimiter},
    treasury,
};

mod accounts;
mod backfill;
mod history;
mod transfer;

pub use accounts::AccountDefaults;
pub use backfill::BackfillReport;
pub use transfer::TransferCmd;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Handle to the economy store.
///
/// Cheap to share behind an `Arc`; all operations take `&self`. Every balance
/// mutation is a single guarded `UPDATE`, so per-account linearizability comes
/// from the store, not from locks held across I/O.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    config: EconomyConfig,
    limiter: Box<dyn RateLimiter>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Read-only treasury projection for the admin surface.
    pub async fn treasury(&self) -> ResultEngine<TreasurySnapshot> {
        let model = treasury::Entity::find_by_id(treasury::TREASURY_ROW_ID)
            .one(&self.database)
            .await?
            .ok_or_else(|| {
                EngineError::Database(sea_orm::DbErr::RecordNotFound(
                    "treasury row missing".to_string(),
                ))
            })?;
        Ok(TreasurySnapshot::from(model))
    }

    /// Inserts the singleton treasury row when absent. Safe to race: a
    /// concurrent bootstrap loses the insert and that is fine.
    async fn ensure_treasury(&self) -> ResultEngine<()> {
        let model = treasury::ActiveModel {
            id: ActiveValue::Set(treasury::TREASURY_ROW_ID),
            funds_euro: ActiveValue::Set(0),
            funds_gold: ActiveValue::Set(0),
            funds_ron: ActiveValue::Set(0),
            tax_collected_euro: ActiveValue::Set(0),
            tax_collected_gold: ActiveValue::Set(0),
            tax_collected_ron: ActiveValue::Set(0),
        };
        treasury::Entity::insert(model)
            .on_conflict(
                OnConflict::column(treasury::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    config: EconomyConfig,
    limiter: Option<Box<dyn RateLimiter>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Inject the economy policy (tax table, ceiling, rate limits).
    pub fn config(mut self, config: EconomyConfig) -> EngineBuilder {
        self.config = config;
        self
    }

    /// Swap the throttling strategy; defaults to a fixed window built from
    /// the config limits.
    pub fn limiter(mut self, limiter: Box<dyn RateLimiter>) -> EngineBuilder {
        self.limiter = Some(limiter);
        self
    }

    /// Construct `Engine`, bootstrapping the treasury row.
    pub async fn build(self) -> ResultEngine<Engine> {
        let limiter: Box<dyn RateLimiter> = match self.limiter {
            Some(limiter) => limiter,
            None => Box::new(FixedWindowLimiter::new(self.config.limits.clone())),
        };

        let engine = Engine {
            database: self.database,
            config: self.config,
            limiter,
        };
        engine.ensure_treasury().await?;
        Ok(engine)
    }
}
