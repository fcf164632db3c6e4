//! CSV file market data adapter.
//!
//! One file per symbol, `<data_dir>/<symbol>.csv`, with a header row. The date
//! column is `date`; the price column is the first of `adj close`,
//! `adj_close`, `close` or `price` present. Other columns are ignored, so
//! exported OHLCV files load unchanged.

use crate::domain::error::NisaError;
use crate::domain::price_series::PricePoint;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const PRICE_COLUMNS: [&str; 4] = ["adj close", "adj_close", "close", "price"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, NisaError> {
        let dir = config
            .get_string("market", "data_dir")
            .ok_or_else(|| NisaError::ConfigMissing {
                section: "market".into(),
                key: "data_dir".into(),
            })?;
        Ok(Self::new(PathBuf::from(dir)))
    }

    /// Every row of a single price file, sorted by date.
    pub fn read_file(path: &Path) -> Result<Vec<PricePoint>, NisaError> {
        read_prices(path, NaiveDate::MIN, NaiveDate::MAX)
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

/// Reads one price file, keeping rows dated within `[start_date, end_date]`.
fn read_prices(
    path: &Path,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<PricePoint>, NisaError> {
    let source_name = path.display().to_string();
    let malformed = |reason: String| NisaError::MalformedData {
        source_name: source_name.clone(),
        reason,
    };
    let content = fs::read_to_string(path)?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| malformed(format!("header error: {}", e)))?;
    let lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let date_col = lower
        .iter()
        .position(|h| h == "date")
        .ok_or_else(|| malformed("missing date column".to_string()))?;
    let price_col = PRICE_COLUMNS
        .iter()
        .find_map(|name| lower.iter().position(|h| h == name))
        .ok_or_else(|| malformed("missing price column".to_string()))?;

    let mut prices = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| malformed(format!("parse error: {}", e)))?;

        let date_str = record.get(date_col).unwrap_or_default();
        // Timestamped exports carry a time after the date.
        let date_part = date_str.get(..10).unwrap_or(date_str);
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| malformed(format!("invalid date '{}': {}", date_str, e)))?;

        if date < start_date || date > end_date {
            continue;
        }

        let raw = record.get(price_col).unwrap_or_default();
        // Gaps (holidays, missing quotes) are skipped.
        if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("nan") {
            continue;
        }
        let price: f64 = raw
            .parse()
            .map_err(|e| malformed(format!("invalid price '{}' on {}: {}", raw, date, e)))?;

        prices.push(PricePoint::new(date, price));
    }

    prices.sort_by_key(|p| p.date);
    Ok(prices)
}

impl MarketDataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, NisaError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(NisaError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let prices = read_prices(&path, start_date, end_date)?;
        log::debug!("loaded {} prices for {} from {}", prices.len(), symbol, path.display());
        Ok(prices)
    }

    fn list_symbols(&self) -> Result<Vec<String>, NisaError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("VOO.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-03,400,402,398,401,395.5,1000\n\
             2024-01-02,398,401,397,399,393.0,1000\n\
             2024-01-04,401,405,400,404,,1000\n\
             2024-01-05,404,406,403,405,399.0,1000\n",
        )
        .unwrap();
        fs::write(
            path.join("USDJPY.csv"),
            "date,close\n2024-01-02 00:00:00+09:00,141.5\n2024-01-03 00:00:00+09:00,143.0\n",
        )
        .unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    #[test]
    fn prefers_adjusted_close_and_sorts() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let prices = adapter
            .fetch_prices("VOO", date("2024-01-01"), date("2024-12-31"))
            .unwrap();

        assert_eq!(
            prices,
            vec![
                PricePoint::new(date("2024-01-02"), 393.0),
                PricePoint::new(date("2024-01-03"), 395.5),
                PricePoint::new(date("2024-01-05"), 399.0),
            ]
        );
    }

    #[test]
    fn filters_by_date_range() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let prices = adapter
            .fetch_prices("VOO", date("2024-01-03"), date("2024-01-03"))
            .unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].price, 395.5);
    }

    #[test]
    fn reads_timestamped_dates() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let fx = adapter
            .fetch_prices("USDJPY", date("2024-01-01"), date("2024-01-31"))
            .unwrap();
        assert_eq!(fx.len(), 2);
        assert_eq!(fx[1], PricePoint::new(date("2024-01-03"), 143.0));
    }

    #[test]
    fn missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_prices("XYZ", date("2024-01-01"), date("2024-01-31"));
        assert!(matches!(result, Err(NisaError::NoData { symbol }) if symbol == "XYZ"));
    }

    #[test]
    fn missing_price_column_is_error() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("BAD.csv"), "date,volume\n2024-01-02,10\n").unwrap();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_prices("BAD", date("2024-01-01"), date("2024-01-31"));
        assert!(matches!(result, Err(NisaError::MalformedData { .. })));
    }

    #[test]
    fn unparseable_price_is_malformed_data() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("ODD.csv"), "date,close\n2024-01-02,12O.5\n").unwrap();
        let adapter = CsvAdapter::new(path);
        let err = adapter
            .fetch_prices("ODD", date("2024-01-01"), date("2024-01-31"))
            .unwrap_err();
        assert!(matches!(err, NisaError::MalformedData { ref reason, .. } if reason.contains("12O.5")));
        let code: std::process::ExitCode = (&err).into();
        assert_eq!(
            format!("{:?}", code),
            format!("{:?}", std::process::ExitCode::from(5))
        );
    }

    #[test]
    fn read_file_keeps_every_row() {
        let (_dir, path) = setup_test_data();
        let prices = CsvAdapter::read_file(&path.join("VOO.csv")).unwrap();
        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0].date, date("2024-01-02"));
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["USDJPY", "VOO"]);
    }
}
