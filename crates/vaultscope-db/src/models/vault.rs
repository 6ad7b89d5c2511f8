use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::vaults;

/// A vault configuration record. Written by the admin CRUD layer, read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = vaults)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Vault {
    pub id: String,
    pub name: String,
    pub chain_id: i64,
    pub vault_address: String,
    pub strategy_address: String,
    pub want_address: String,
    pub token0: Option<String>,
    pub token1: Option<String>,
    pub reward_token: Option<String>,
    pub farm_address: Option<String>,
    pub farm_pool_id: Option<i32>,
    pub router_address: Option<String>,
    pub paused: bool,
    pub experimental: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vault {
    pub fn find_by_id(id: &str, conn: &mut diesel::PgConnection) -> QueryResult<Self> {
        vaults::table.find(id).first(conn)
    }

    pub fn find_all(conn: &mut diesel::PgConnection) -> QueryResult<Vec<Self>> {
        vaults::table.order(vaults::created_at.asc()).load(conn)
    }

    pub fn find_by_chain(chain_id: i64, conn: &mut diesel::PgConnection) -> QueryResult<Vec<Self>> {
        vaults::table
            .filter(vaults::chain_id.eq(chain_id))
            .order(vaults::created_at.asc())
            .load(conn)
    }
}
