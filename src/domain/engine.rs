//! Contribution and growth simulation engine.
//!
//! A single pass over the contribution plan: each period admits as much of the
//! planned contribution as the caps allow, then compounds the whole balance by
//! one period. Contributions past the cap are clamped to zero while the
//! accumulated value keeps compounding.

use crate::domain::error::NisaError;
use crate::domain::plan::{ContributionLimits, ContributionPlan, GrowthAssumption, LifetimeCap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 1-based period index.
    pub period: usize,
    pub principal: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub snapshots: Vec<Snapshot>,
    pub periods_per_year: u32,
}

impl SimulationResult {
    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Snapshot at the end of every complete year.
    pub fn yearly(&self) -> Vec<Snapshot> {
        let step = self.periods_per_year.max(1) as usize;
        self.snapshots
            .iter()
            .filter(|s| s.period % step == 0)
            .copied()
            .collect()
    }

    /// Final market value minus final principal.
    pub fn total_gain(&self) -> f64 {
        self.final_snapshot()
            .map(|s| s.market_value - s.principal)
            .unwrap_or(0.0)
    }
}

/// Tracks principal admitted so far against the lifetime and annual caps.
#[derive(Debug, Clone)]
pub(crate) struct Allowance {
    limits: ContributionLimits,
    periods_per_year: usize,
    principal: f64,
    admitted_this_year: f64,
}

impl Allowance {
    pub(crate) fn new(limits: ContributionLimits, periods_per_year: u32) -> Self {
        Self {
            limits,
            periods_per_year: periods_per_year.max(1) as usize,
            principal: 0.0,
            admitted_this_year: 0.0,
        }
    }

    /// Admits what the caps allow of `planned` for the 0-based `period`.
    ///
    /// A contribution that fills the remaining room sets the running totals to
    /// the cap itself, so principal lands on the cap exactly and never above it.
    pub(crate) fn admit(&mut self, period: usize, planned: f64) -> f64 {
        if period % self.periods_per_year == 0 {
            self.admitted_this_year = 0.0;
        }

        let lifetime = self.limits.lifetime.amount();
        let lifetime_room = lifetime - self.principal;
        let annual_room = self
            .limits
            .annual
            .map(|annual| annual - self.admitted_this_year);
        let room = annual_room.map_or(lifetime_room, |r| r.min(lifetime_room));
        if room <= 0.0 {
            return 0.0;
        }

        let before = self.principal;
        let annual_ceiling = match (self.limits.annual, annual_room) {
            (Some(annual), Some(r)) if r < lifetime_room => Some(annual),
            _ => None,
        };
        if planned < room {
            self.principal = (before + planned).min(lifetime);
            self.admitted_this_year += planned;
        } else if let Some(annual) = annual_ceiling {
            self.principal = (before + room).min(lifetime);
            self.admitted_this_year = annual;
        } else {
            self.principal = lifetime;
            self.admitted_this_year += room;
        }
        if let Some(annual) = self.limits.annual {
            self.admitted_this_year = self.admitted_this_year.min(annual);
        }
        self.principal - before
    }

    pub(crate) fn principal(&self) -> f64 {
        self.principal
    }
}

/// Runs the simulation against the lifetime cap only.
pub fn simulate(
    plan: &ContributionPlan,
    rate: &GrowthAssumption,
    cap: LifetimeCap,
) -> Result<SimulationResult, NisaError> {
    simulate_with_limits(plan, rate, &ContributionLimits::lifetime_only(cap))
}

pub fn simulate_with_limits(
    plan: &ContributionPlan,
    rate: &GrowthAssumption,
    limits: &ContributionLimits,
) -> Result<SimulationResult, NisaError> {
    plan.validate()?;
    limits.validate()?;
    let growth = 1.0 + rate.per_period_rate(plan.periods_per_year())?;

    let mut allowance = Allowance::new(*limits, plan.periods_per_year());
    // Value is carried as principal plus gain so a flat rate leaves value
    // equal to principal bit for bit.
    let mut gain = 0.0_f64;
    let mut snapshots = Vec::with_capacity(plan.len());

    for (i, &planned) in plan.amounts().iter().enumerate() {
        allowance.admit(i, planned);
        let principal = allowance.principal();
        let market_value = (principal + gain) * growth;
        gain = market_value - principal;
        snapshots.push(Snapshot {
            period: i + 1,
            principal,
            market_value,
        });
    }

    log::debug!(
        "simulated {} periods, final principal {:.0}",
        snapshots.len(),
        allowance.principal()
    );

    Ok(SimulationResult {
        snapshots,
        periods_per_year: plan.periods_per_year(),
    })
}
