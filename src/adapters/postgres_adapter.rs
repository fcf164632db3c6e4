//! PostgreSQL store adapter for hosted databases.

use crate::adapters::record_codec::{self, RecordRow};
use crate::domain::error::NisaError;
use crate::domain::record::{NewRecord, SimulationRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use chrono::{DateTime, Utc};
use postgres::types::ToSql;
use postgres::{Client, NoTls, Row};
use std::cell::RefCell;

const SELECT_RECORD: &str = "SELECT id, label, created_at, annual_rate, compounding, \
     lifetime_cap, annual_cap, periods_per_year::bigint, contributions, snapshots, \
     final_principal, final_value FROM public.simulations";

pub struct PostgresAdapter {
    client: RefCell<Client>,
}

fn query_err(e: postgres::Error) -> NisaError {
    NisaError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn to_record_row(row: &Row) -> RecordRow {
    let created_at: DateTime<Utc> = row.get(2);
    RecordRow {
        id: row.get(0),
        label: row.get(1),
        created_at: created_at.to_rfc3339(),
        annual_rate: row.get(3),
        compounding: row.get(4),
        lifetime_cap: row.get(5),
        annual_cap: row.get(6),
        periods_per_year: row.get(7),
        contributions: row.get(8),
        snapshots: row.get(9),
        final_principal: row.get(10),
        final_value: row.get(11),
    }
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, NisaError> {
        // [postgres] connection_string first, then [database] conninfo
        let connection_string = config
            .get_string("postgres", "connection_string")
            .or_else(|| config.get_string("database", "conninfo"))
            .ok_or_else(|| NisaError::ConfigMissing {
                section: "database".into(),
                key: "conninfo".into(),
            })?;

        let client =
            Client::connect(&connection_string, NoTls).map_err(|e| NisaError::Database {
                reason: e.to_string(),
            })?;

        let adapter = Self {
            client: RefCell::new(client),
        };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn initialize_schema(&self) -> Result<(), NisaError> {
        self.client
            .borrow_mut()
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS public.simulations (
                    id BIGSERIAL PRIMARY KEY,
                    label TEXT,
                    created_at TIMESTAMPTZ NOT NULL,
                    annual_rate DOUBLE PRECISION NOT NULL,
                    compounding TEXT NOT NULL,
                    lifetime_cap DOUBLE PRECISION NOT NULL,
                    annual_cap DOUBLE PRECISION,
                    periods_per_year INTEGER NOT NULL,
                    contributions TEXT NOT NULL,
                    snapshots TEXT NOT NULL,
                    final_principal DOUBLE PRECISION NOT NULL,
                    final_value DOUBLE PRECISION NOT NULL
                )",
            )
            .map_err(query_err)
    }
}

impl StorePort for PostgresAdapter {
    fn append(&self, record: &NewRecord) -> Result<i64, NisaError> {
        let row = record_codec::encode(record)?;
        let periods_per_year = row.periods_per_year as i32;
        let params: &[&(dyn ToSql + Sync)] = &[
            &row.label,
            &record.created_at,
            &row.annual_rate,
            &row.compounding,
            &row.lifetime_cap,
            &row.annual_cap,
            &periods_per_year,
            &row.contributions,
            &row.snapshots,
            &row.final_principal,
            &row.final_value,
        ];
        let inserted = self
            .client
            .borrow_mut()
            .query_one(
                "INSERT INTO public.simulations (label, created_at, annual_rate, compounding,
                     lifetime_cap, annual_cap, periods_per_year, contributions, snapshots,
                     final_principal, final_value)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 RETURNING id",
                params,
            )
            .map_err(query_err)?;
        Ok(inserted.get(0))
    }

    fn recent(&self, limit: usize) -> Result<Vec<SimulationRecord>, NisaError> {
        let query = format!("{} ORDER BY id DESC LIMIT $1", SELECT_RECORD);
        let rows = self
            .client
            .borrow_mut()
            .query(query.as_str(), &[&(limit as i64)])
            .map_err(query_err)?;

        rows.iter()
            .map(|row| record_codec::decode(to_record_row(row)))
            .collect()
    }

    fn get(&self, id: i64) -> Result<Option<SimulationRecord>, NisaError> {
        let query = format!("{} WHERE id = $1", SELECT_RECORD);
        let row = self
            .client
            .borrow_mut()
            .query_opt(query.as_str(), &[&id])
            .map_err(query_err)?;
        row.as_ref()
            .map(|r| record_codec::decode(to_record_row(r)))
            .transpose()
    }
}
