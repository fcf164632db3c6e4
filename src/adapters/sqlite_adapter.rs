//! SQLite store and price table adapter.

use crate::adapters::record_codec::{self, RecordRow};
use crate::domain::error::NisaError;
use crate::domain::price_series::PricePoint;
use crate::domain::record::{NewRecord, SimulationRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

const RECORD_COLUMNS: &str = "id, label, created_at, annual_rate, compounding, lifetime_cap, \
     annual_cap, periods_per_year, contributions, snapshots, final_principal, final_value";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> NisaError {
    NisaError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn row_to_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: row.get(0)?,
        label: row.get(1)?,
        created_at: row.get(2)?,
        annual_rate: row.get(3)?,
        compounding: row.get(4)?,
        lifetime_cap: row.get(5)?,
        annual_cap: row.get(6)?,
        periods_per_year: row.get(7)?,
        contributions: row.get(8)?,
        snapshots: row.get(9)?,
        final_principal: row.get(10)?,
        final_value: row.get(11)?,
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, NisaError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| NisaError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| NisaError::Database {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        log::info!("opened sqlite store at {}", db_path);
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, NisaError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| NisaError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, NisaError> {
        self.pool.get().map_err(|e: r2d2::Error| NisaError::Database {
            reason: e.to_string(),
        })
    }

    pub fn initialize_schema(&self) -> Result<(), NisaError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS simulations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT,
                created_at TEXT NOT NULL,
                annual_rate REAL NOT NULL,
                compounding TEXT NOT NULL,
                lifetime_cap REAL NOT NULL,
                annual_cap REAL,
                periods_per_year INTEGER NOT NULL,
                contributions TEXT NOT NULL,
                snapshots TEXT NOT NULL,
                final_principal REAL NOT NULL,
                final_value REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS prices (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                price REAL NOT NULL,
                PRIMARY KEY (symbol, date)
            );",
        )
        .map_err(query_err)?;
        Ok(())
    }

    /// Loads a price series into the `prices` table, replacing existing dates.
    pub fn insert_prices(&self, symbol: &str, prices: &[PricePoint]) -> Result<(), NisaError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for point in prices {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, date, price) VALUES (?1, ?2, ?3)",
                params![symbol, point.date.format("%Y-%m-%d").to_string(), point.price],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(())
    }
}

impl StorePort for SqliteAdapter {
    fn append(&self, record: &NewRecord) -> Result<i64, NisaError> {
        let row = record_codec::encode(record)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO simulations (label, created_at, annual_rate, compounding, lifetime_cap,
                 annual_cap, periods_per_year, contributions, snapshots, final_principal, final_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                row.label,
                row.created_at,
                row.annual_rate,
                row.compounding,
                row.lifetime_cap,
                row.annual_cap,
                row.periods_per_year,
                row.contributions,
                row.snapshots,
                row.final_principal,
                row.final_value
            ],
        )
        .map_err(query_err)?;
        let id = conn.last_insert_rowid();
        log::debug!("stored simulation {}", id);
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SimulationRecord>, NisaError> {
        let conn = self.conn()?;
        let query = format!(
            "SELECT {} FROM simulations ORDER BY id DESC LIMIT ?1",
            RECORD_COLUMNS
        );
        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let rows = stmt
            .query_map(params![limit as i64], row_to_record_row)
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(record_codec::decode(row.map_err(query_err)?)?);
        }
        Ok(records)
    }

    fn get(&self, id: i64) -> Result<Option<SimulationRecord>, NisaError> {
        let conn = self.conn()?;
        let query = format!("SELECT {} FROM simulations WHERE id = ?1", RECORD_COLUMNS);
        let row = conn
            .query_row(&query, params![id], row_to_record_row)
            .optional()
            .map_err(query_err)?;
        row.map(record_codec::decode).transpose()
    }
}

impl MarketDataPort for SqliteAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, NisaError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT date, price FROM prices
                 WHERE symbol = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(
                params![
                    symbol,
                    start_date.format("%Y-%m-%d").to_string(),
                    end_date.format("%Y-%m-%d").to_string()
                ],
                |row| {
                    let date_str: String = row.get(0)?;
                    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok(PricePoint::new(date, row.get(1)?))
                },
            )
            .map_err(query_err)?;

        let mut prices = Vec::new();
        for row in rows {
            prices.push(row.map_err(query_err)?);
        }
        if prices.is_empty() {
            return Err(NisaError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(prices)
    }

    fn list_symbols(&self) -> Result<Vec<String>, NisaError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_err)?);
        }
        Ok(symbols)
    }
}
