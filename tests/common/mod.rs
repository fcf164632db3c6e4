#![allow(dead_code)]

use chrono::NaiveDate;
use nisasim::domain::engine::SimulationResult;
use nisasim::domain::error::NisaError;
pub use nisasim::domain::price_series::PricePoint;
use nisasim::domain::record::{NewRecord, SimulationRecord};
use nisasim::domain::risk::RiskBand;
use nisasim::ports::market_data_port::MarketDataPort;
use nisasim::ports::report_port::ReportPort;
use nisasim::ports::store_port::StorePort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockMarketData {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), prices);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, NisaError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(NisaError::Database {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(prices) => Ok(prices
                .iter()
                .filter(|p| p.date >= start_date && p.date <= end_date)
                .copied()
                .collect()),
            None => Err(NisaError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, NisaError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

#[derive(Default)]
pub struct MockStore {
    pub records: RefCell<Vec<SimulationRecord>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorePort for MockStore {
    fn append(&self, record: &NewRecord) -> Result<i64, NisaError> {
        let mut records = self.records.borrow_mut();
        let id = records.len() as i64 + 1;
        records.push(SimulationRecord::from_new(id, record.clone()));
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SimulationRecord>, NisaError> {
        Ok(self
            .records
            .borrow()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    fn get(&self, id: i64) -> Result<Option<SimulationRecord>, NisaError> {
        Ok(self.records.borrow().iter().find(|r| r.id == id).cloned())
    }
}

#[derive(Default)]
pub struct MockReport {
    pub results: RefCell<Vec<(SimulationResult, PathBuf)>>,
    pub bands: RefCell<Vec<(Vec<RiskBand>, PathBuf)>>,
}

impl MockReport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportPort for MockReport {
    fn write(&self, result: &SimulationResult, output_path: &Path) -> Result<(), NisaError> {
        self.results
            .borrow_mut()
            .push((result.clone(), output_path.to_path_buf()));
        Ok(())
    }

    fn write_risk(&self, bands: &[RiskBand], output_path: &Path) -> Result<(), NisaError> {
        self.bands
            .borrow_mut()
            .push((bands.to_vec(), output_path.to_path_buf()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Month-end prices compounding at `monthly_growth` per month.
pub fn month_end_prices(start_year: i32, months: usize, start_price: f64, monthly_growth: f64) -> Vec<PricePoint> {
    (0..months)
        .map(|i| {
            let year = start_year + (i / 12) as i32;
            let month = (i % 12) as u32 + 1;
            let last_day = if month == 12 {
                date(year, 12, 31)
            } else {
                date(year, month + 1, 1).pred_opt().unwrap()
            };
            PricePoint::new(last_day, start_price * (1.0 + monthly_growth).powi(i as i32))
        })
        .collect()
}

/// Constant-price series over the same month ends.
pub fn flat_prices(start_year: i32, months: usize, price: f64) -> Vec<PricePoint> {
    month_end_prices(start_year, months, price, 0.0)
}
