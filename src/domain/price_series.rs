//! Dated price observations and currency conversion.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Converts `prices` into another currency using the latest `fx` rate on or
/// before each price date. Both series must be sorted by date. Prices dated
/// before the first FX observation are dropped.
pub fn convert_currency(prices: &[PricePoint], fx: &[PricePoint]) -> Vec<PricePoint> {
    let mut converted = Vec::with_capacity(prices.len());
    let mut fx_idx = 0usize;
    let mut current_rate: Option<f64> = None;

    for point in prices {
        while fx_idx < fx.len() && fx[fx_idx].date <= point.date {
            current_rate = Some(fx[fx_idx].price);
            fx_idx += 1;
        }
        if let Some(rate) = current_rate {
            converted.push(PricePoint::new(point.date, point.price * rate));
        }
    }

    converted
}

/// Keeps the last observation of each calendar month. Input must be sorted.
pub fn resample_month_end(prices: &[PricePoint]) -> Vec<PricePoint> {
    let mut out: Vec<PricePoint> = Vec::new();
    for point in prices {
        match out.last_mut() {
            Some(last)
                if last.date.year() == point.date.year()
                    && last.date.month() == point.date.month() =>
            {
                *last = *point;
            }
            _ => out.push(*point),
        }
    }
    out
}
