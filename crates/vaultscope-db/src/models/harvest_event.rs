use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::harvest_events;

/// A harvest reported for a vault's strategy.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = harvest_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HarvestEvent {
    pub id: i64,
    pub vault_id: String,
    pub tx_hash: String,
    pub profit: Decimal,
    pub harvest_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Insertable)]
#[diesel(table_name = harvest_events)]
pub struct NewHarvestEvent {
    pub vault_id: String,
    pub tx_hash: String,
    pub profit: Decimal,
    pub harvest_at: DateTime<Utc>,
}

impl HarvestEvent {
    pub fn create(event: &NewHarvestEvent, conn: &mut diesel::PgConnection) -> QueryResult<Self> {
        diesel::insert_into(harvest_events::table)
            .values(event)
            .returning(Self::as_returning())
            .get_result(conn)
    }

    /// Most recent harvests of a vault first.
    pub fn find_recent(
        vault_id: &str,
        limit: i64,
        conn: &mut diesel::PgConnection,
    ) -> QueryResult<Vec<Self>> {
        harvest_events::table
            .filter(harvest_events::vault_id.eq(vault_id))
            .order((harvest_events::harvest_at.desc(), harvest_events::id.desc()))
            .limit(limit)
            .select(Self::as_select())
            .load(conn)
    }
}
