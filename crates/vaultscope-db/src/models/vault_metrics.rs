use chrono::{DateTime, Utc};
use diesel::{prelude::*, upsert::excluded};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::vault_metrics;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = vault_metrics)]
#[diesel(primary_key(vault_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VaultMetrics {
    pub vault_id: String,
    pub tvl: Decimal,
    pub apr: Decimal,
    pub apy: Decimal,
    pub price_per_share: Decimal,
    pub total_supply: Decimal,
    pub decimals: i32,
    pub lp_price: Decimal,
    pub reward_price: Decimal,
    pub yearly_rewards_usd: Decimal,
    pub data_quality: String,
    pub updated_at: DateTime<Utc>,
    pub last_harvest_at: Option<DateTime<Utc>>,
    pub last_harvest_tx: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Insertable)]
#[diesel(table_name = vault_metrics)]
pub struct NewVaultMetrics {
    pub vault_id: String,
    pub tvl: Decimal,
    pub apr: Decimal,
    pub apy: Decimal,
    pub price_per_share: Decimal,
    pub total_supply: Decimal,
    pub decimals: i32,
    pub lp_price: Decimal,
    pub reward_price: Decimal,
    pub yearly_rewards_usd: Decimal,
    pub data_quality: String,
    pub updated_at: DateTime<Utc>,
    pub last_harvest_at: Option<DateTime<Utc>>,
    pub last_harvest_tx: Option<String>,
}

impl VaultMetrics {
    pub fn find_by_vault(
        vault_id: &str,
        conn: &mut diesel::PgConnection,
    ) -> QueryResult<Option<Self>> {
        vault_metrics::table
            .find(vault_id)
            .first(conn)
            .optional()
    }

    /// Insert the snapshot, or overwrite every column of the existing one.
    pub fn upsert(metrics: &NewVaultMetrics, conn: &mut diesel::PgConnection) -> QueryResult<Self> {
        diesel::insert_into(vault_metrics::table)
            .values(metrics)
            .on_conflict(vault_metrics::vault_id)
            .do_update()
            .set((
                vault_metrics::tvl.eq(excluded(vault_metrics::tvl)),
                vault_metrics::apr.eq(excluded(vault_metrics::apr)),
                vault_metrics::apy.eq(excluded(vault_metrics::apy)),
                vault_metrics::price_per_share.eq(excluded(vault_metrics::price_per_share)),
                vault_metrics::total_supply.eq(excluded(vault_metrics::total_supply)),
                vault_metrics::decimals.eq(excluded(vault_metrics::decimals)),
                vault_metrics::lp_price.eq(excluded(vault_metrics::lp_price)),
                vault_metrics::reward_price.eq(excluded(vault_metrics::reward_price)),
                vault_metrics::yearly_rewards_usd.eq(excluded(vault_metrics::yearly_rewards_usd)),
                vault_metrics::data_quality.eq(excluded(vault_metrics::data_quality)),
                vault_metrics::updated_at.eq(excluded(vault_metrics::updated_at)),
                vault_metrics::last_harvest_at.eq(excluded(vault_metrics::last_harvest_at)),
                vault_metrics::last_harvest_tx.eq(excluded(vault_metrics::last_harvest_tx)),
            ))
            .get_result(conn)
    }
}
