//! Growth-rate estimation from historical prices.
//!
//! CAGR(P, n) = (prod(P[i] / P[i-1]))^(n / N) - 1, where N is the number of
//! period ratios and n the number of periods per year. The product is summed
//! in log space.

use crate::domain::error::NisaError;
use crate::domain::price_series::PricePoint;

/// Price series statistics used to parameterize a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthEstimate {
    pub cagr: f64,
    pub annual_volatility: f64,
    pub observations: usize,
}

fn check_prices(prices: &[PricePoint], minimum: usize) -> Result<(), NisaError> {
    if prices.len() < minimum {
        return Err(NisaError::InsufficientData {
            points: prices.len(),
            minimum,
        });
    }
    if let Some(bad) = prices.iter().find(|p| !p.price.is_finite() || p.price <= 0.0) {
        return Err(NisaError::InvalidPrice {
            date: bad.date.to_string(),
            price: bad.price,
        });
    }
    Ok(())
}

/// Simple per-period returns `P[i] / P[i-1] - 1`.
pub fn period_returns(prices: &[PricePoint]) -> Result<Vec<f64>, NisaError> {
    check_prices(prices, 2)?;
    Ok(prices
        .windows(2)
        .map(|w| w[1].price / w[0].price - 1.0)
        .collect())
}

/// Geometric mean of per-period growth ratios, minus one.
pub fn geometric_mean_return(prices: &[PricePoint]) -> Result<f64, NisaError> {
    check_prices(prices, 2)?;
    let log_sum: f64 = prices
        .windows(2)
        .map(|w| (w[1].price / w[0].price).ln())
        .sum();
    let n = (prices.len() - 1) as f64;
    Ok((log_sum / n).exp() - 1.0)
}

/// Annualized geometric mean return.
pub fn cagr(prices: &[PricePoint], periods_per_year: u32) -> Result<f64, NisaError> {
    let g = geometric_mean_return(prices)?;
    Ok((1.0 + g).powi(periods_per_year.max(1) as i32) - 1.0)
}

/// Sample standard deviation of period returns scaled by sqrt(periods_per_year).
pub fn annualized_volatility(prices: &[PricePoint], periods_per_year: u32) -> Result<f64, NisaError> {
    check_prices(prices, 3)?;
    let returns = period_returns(prices)?;
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Ok(variance.sqrt() * (periods_per_year.max(1) as f64).sqrt())
}

pub fn estimate(prices: &[PricePoint], periods_per_year: u32) -> Result<GrowthEstimate, NisaError> {
    Ok(GrowthEstimate {
        cagr: cagr(prices, periods_per_year)?,
        annual_volatility: annualized_volatility(prices, periods_per_year)?,
        observations: prices.len(),
    })
}
