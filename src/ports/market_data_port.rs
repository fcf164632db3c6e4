//! Historical price access port trait.

use crate::domain::error::NisaError;
use crate::domain::price_series::PricePoint;
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Prices for `symbol` within `[start_date, end_date]`, sorted by date.
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, NisaError>;

    fn list_symbols(&self) -> Result<Vec<String>, NisaError>;
}
