//! Singleton treasury accumulating all withheld tax.

use sea_orm::entity::prelude::*;

use crate::{Amount, Balances};

/// Primary key of the single treasury row; the engine builder guarantees it
/// exists before any transfer runs.
pub const TREASURY_ROW_ID: i32 = 1;

/// Read-only projection of the treasury.
///
/// `funds` may be spent by other game systems; `total_tax_collected` only
/// ever grows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreasurySnapshot {
    pub funds: Balances,
    pub total_tax_collected: Balances,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "treasury")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub funds_euro: i64,
    pub funds_gold: i64,
    pub funds_ron: i64,
    pub tax_collected_euro: i64,
    pub tax_collected_gold: i64,
    pub tax_collected_ron: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TreasurySnapshot {
    fn from(model: Model) -> Self {
        Self {
            funds: Balances {
                euro: Amount::new(model.funds_euro),
                gold: Amount::new(model.funds_gold),
                ron: Amount::new(model.funds_ron),
            },
            total_tax_collected: Balances {
                euro: Amount::new(model.tax_collected_euro),
                gold: Amount::new(model.tax_collected_gold),
                ron: Amount::new(model.tax_collected_ron),
            },
        }
    }
}
