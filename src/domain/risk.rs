//! Monte Carlo risk band over the contribution plan.
//!
//! Every path follows the engine's contribution and cap rules, but each
//! period's return is drawn from Normal(mu, sigma) with mu the per-period
//! rate and sigma = annual_volatility / sqrt(periods_per_year). Path values
//! are sampled at the end of each year and reduced to mean and 5% / 95%
//! percentiles.

use crate::domain::engine::Allowance;
use crate::domain::error::NisaError;
use crate::domain::plan::{ContributionLimits, ContributionPlan, GrowthAssumption};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

pub const DEFAULT_SIMULATIONS: usize = 300;

/// A period return never drops the balance below zero.
const MIN_PERIOD_RETURN: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    pub simulations: usize,
    pub annual_volatility: f64,
    pub seed: Option<u64>,
}

impl RiskConfig {
    pub fn new(annual_volatility: f64) -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            annual_volatility,
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<(), NisaError> {
        if self.simulations == 0 {
            return Err(NisaError::InvalidConfig {
                reason: "simulations must be at least 1".into(),
            });
        }
        if !self.annual_volatility.is_finite() || self.annual_volatility < 0.0 {
            return Err(NisaError::InvalidConfig {
                reason: format!(
                    "annual_volatility must be a non-negative number, got {}",
                    self.annual_volatility
                ),
            });
        }
        Ok(())
    }
}

/// Distribution of simulated value at the end of one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskBand {
    pub year: u32,
    pub mean: f64,
    /// 95th percentile.
    pub upper_5: f64,
    /// 5th percentile.
    pub lower_5: f64,
    pub principal: f64,
}

pub fn run_risk(
    plan: &ContributionPlan,
    rate: &GrowthAssumption,
    limits: &ContributionLimits,
    config: &RiskConfig,
) -> Result<Vec<RiskBand>, NisaError> {
    plan.validate()?;
    limits.validate()?;
    config.validate()?;

    let periods_per_year = plan.periods_per_year();
    let mu = rate.per_period_rate(periods_per_year)?;
    let sigma = config.annual_volatility / (periods_per_year as f64).sqrt();
    let step = periods_per_year as usize;
    let years = plan.len() / step;

    let principal_by_year = yearly_principal(plan, limits, years);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut normal = NormalSampler::default();

    let mut values_by_year: Vec<Vec<f64>> = vec![Vec::with_capacity(config.simulations); years];

    for _ in 0..config.simulations {
        let mut allowance = Allowance::new(*limits, periods_per_year);
        let mut value = 0.0_f64;
        for (i, &planned) in plan.amounts().iter().enumerate() {
            value += allowance.admit(i, planned);
            let period_return = (mu + sigma * normal.sample(&mut rng)).max(MIN_PERIOD_RETURN);
            value *= 1.0 + period_return;
            if (i + 1) % step == 0 {
                values_by_year[i / step].push(value);
            }
        }
    }

    log::debug!(
        "risk simulation: {} paths over {} years (mu={:.5}, sigma={:.5})",
        config.simulations,
        years,
        mu,
        sigma
    );

    Ok(values_by_year
        .into_iter()
        .zip(principal_by_year)
        .enumerate()
        .map(|(y, (mut values, principal))| {
            values.sort_by(f64::total_cmp);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            RiskBand {
                year: y as u32 + 1,
                mean,
                upper_5: percentile(&values, 95.0),
                lower_5: percentile(&values, 5.0),
                principal,
            }
        })
        .collect())
}

fn yearly_principal(plan: &ContributionPlan, limits: &ContributionLimits, years: usize) -> Vec<f64> {
    let step = plan.periods_per_year() as usize;
    let mut allowance = Allowance::new(*limits, plan.periods_per_year());
    let mut out = Vec::with_capacity(years);
    for (i, &planned) in plan.amounts().iter().enumerate() {
        allowance.admit(i, planned);
        if (i + 1) % step == 0 {
            out.push(allowance.principal());
        }
    }
    out
}

/// Percentile `q` (0-100) of sorted values, interpolating linearly between
/// the two nearest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Box-Muller standard normal generator with the second variate cached.
#[derive(Debug, Default)]
struct NormalSampler {
    cached: Option<f64>,
}

impl NormalSampler {
    fn sample<R: Rng>(&mut self, rng: &mut R) -> f64 {
        if let Some(z) = self.cached.take() {
            return z;
        }
        // gen::<f64>() is in [0, 1); flip it so ln never sees zero.
        let u1 = 1.0 - rng.r#gen::<f64>();
        let u2 = rng.r#gen::<f64>();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        self.cached = Some(r * theta.sin());
        r * theta.cos()
    }
}
