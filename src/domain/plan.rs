//! Simulation inputs: contribution schedule, growth assumption and caps.

use crate::domain::error::NisaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Statutory lifetime ceiling on cumulative NISA principal, in yen.
pub const NISA_LIFETIME_CAP: f64 = 18_000_000.0;

/// Statutory yearly ceiling (growth 2.4M + tsumitate 1.2M), in yen.
pub const NISA_ANNUAL_CAP: f64 = 3_600_000.0;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Ordered per-period contribution amounts.
///
/// Construction does not validate; [`ContributionPlan::validate`] is run by the
/// engine so that an invalid plan is reported at the simulation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionPlan {
    amounts: Vec<f64>,
    periods_per_year: u32,
}

impl ContributionPlan {
    pub fn new(amounts: Vec<f64>, periods_per_year: u32) -> Self {
        Self {
            amounts,
            periods_per_year,
        }
    }

    /// Monthly plan from explicit amounts.
    pub fn monthly(amounts: Vec<f64>) -> Self {
        Self::new(amounts, MONTHS_PER_YEAR)
    }

    /// The same `amount` every period for `years` years.
    pub fn level(amount: f64, years: u32, periods_per_year: u32) -> Self {
        let periods = years as usize * periods_per_year as usize;
        Self::new(vec![amount; periods], periods_per_year)
    }

    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    pub fn periods_per_year(&self) -> u32 {
        self.periods_per_year
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Sum of nominal contributions, ignoring any cap.
    pub fn nominal_total(&self) -> f64 {
        self.amounts.iter().sum()
    }

    pub fn validate(&self) -> Result<(), NisaError> {
        if self.amounts.is_empty() {
            return Err(NisaError::InvalidPlan {
                reason: "contribution plan is empty".into(),
            });
        }
        if self.periods_per_year == 0 {
            return Err(NisaError::InvalidPlan {
                reason: "periods_per_year must be at least 1".into(),
            });
        }
        if let Some((i, amount)) = self
            .amounts
            .iter()
            .enumerate()
            .find(|(_, a)| !a.is_finite() || **a < 0.0)
        {
            return Err(NisaError::InvalidPlan {
                reason: format!("contribution {amount} at period {} is not a non-negative amount", i + 1),
            });
        }
        Ok(())
    }
}

/// How an annual rate is turned into a per-period rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compounding {
    /// `annual / periods_per_year`
    #[default]
    Nominal,
    /// `(1 + annual)^(1 / periods_per_year) - 1`
    Effective,
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compounding::Nominal => write!(f, "nominal"),
            Compounding::Effective => write!(f, "effective"),
        }
    }
}

impl FromStr for Compounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nominal" => Ok(Compounding::Nominal),
            "effective" => Ok(Compounding::Effective),
            other => Err(format!(
                "unknown compounding '{other}' (expected nominal or effective)"
            )),
        }
    }
}

/// Annualized rate of return assumed for the whole horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthAssumption {
    pub annual_rate: f64,
    pub compounding: Compounding,
}

impl GrowthAssumption {
    pub fn new(annual_rate: f64) -> Self {
        Self {
            annual_rate,
            compounding: Compounding::default(),
        }
    }

    pub fn effective(annual_rate: f64) -> Self {
        Self {
            annual_rate,
            compounding: Compounding::Effective,
        }
    }

    pub fn validate(&self) -> Result<(), NisaError> {
        if !self.annual_rate.is_finite() {
            return Err(NisaError::InvalidRate {
                reason: format!("rate {} is not finite", self.annual_rate),
            });
        }
        if self.compounding == Compounding::Effective && self.annual_rate <= -1.0 {
            return Err(NisaError::InvalidRate {
                reason: format!(
                    "effective compounding needs a rate above -1, got {}",
                    self.annual_rate
                ),
            });
        }
        Ok(())
    }

    /// Per-period rate under this assumption's compounding policy.
    pub fn per_period_rate(&self, periods_per_year: u32) -> Result<f64, NisaError> {
        self.validate()?;
        if periods_per_year <= 1 {
            return Ok(self.annual_rate);
        }
        let n = periods_per_year as f64;
        let rate = match self.compounding {
            Compounding::Nominal => self.annual_rate / n,
            Compounding::Effective => (1.0 + self.annual_rate).powf(1.0 / n) - 1.0,
        };
        Ok(rate)
    }
}

/// Ceiling on cumulative principal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeCap(pub f64);

impl LifetimeCap {
    pub fn nisa() -> Self {
        LifetimeCap(NISA_LIFETIME_CAP)
    }

    pub fn amount(&self) -> f64 {
        self.0
    }
}

impl Default for LifetimeCap {
    fn default() -> Self {
        Self::nisa()
    }
}

/// Lifetime cap plus an optional per-year cap on admitted principal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionLimits {
    pub lifetime: LifetimeCap,
    pub annual: Option<f64>,
}

impl ContributionLimits {
    pub fn lifetime_only(cap: LifetimeCap) -> Self {
        Self {
            lifetime: cap,
            annual: None,
        }
    }

    /// Current NISA rules: 18M lifetime, 3.6M per year.
    pub fn nisa() -> Self {
        Self {
            lifetime: LifetimeCap::nisa(),
            annual: Some(NISA_ANNUAL_CAP),
        }
    }

    pub fn validate(&self) -> Result<(), NisaError> {
        let cap = self.lifetime.amount();
        if !cap.is_finite() || cap <= 0.0 {
            return Err(NisaError::InvalidCap {
                reason: format!("lifetime cap must be positive, got {cap}"),
            });
        }
        if let Some(annual) = self.annual {
            if !annual.is_finite() || annual <= 0.0 {
                return Err(NisaError::InvalidCap {
                    reason: format!("annual cap must be positive, got {annual}"),
                });
            }
        }
        Ok(())
    }
}
