//! Persisted simulation records.

use crate::domain::engine::SimulationResult;
use crate::domain::plan::{ContributionLimits, ContributionPlan, GrowthAssumption};
use chrono::{DateTime, Utc};

/// A completed run with the inputs that produced it, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub plan: ContributionPlan,
    pub rate: GrowthAssumption,
    pub limits: ContributionLimits,
    pub result: SimulationResult,
}

impl NewRecord {
    pub fn now(
        label: Option<String>,
        plan: ContributionPlan,
        rate: GrowthAssumption,
        limits: ContributionLimits,
        result: SimulationResult,
    ) -> Self {
        Self {
            label,
            created_at: Utc::now(),
            plan,
            rate,
            limits,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRecord {
    pub id: i64,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub plan: ContributionPlan,
    pub rate: GrowthAssumption,
    pub limits: ContributionLimits,
    pub result: SimulationResult,
}

impl SimulationRecord {
    pub fn from_new(id: i64, record: NewRecord) -> Self {
        Self {
            id,
            label: record.label,
            created_at: record.created_at,
            plan: record.plan,
            rate: record.rate,
            limits: record.limits,
            result: record.result,
        }
    }

    pub fn final_value(&self) -> f64 {
        self.result
            .final_snapshot()
            .map(|s| s.market_value)
            .unwrap_or(0.0)
    }

    pub fn final_principal(&self) -> f64 {
        self.result
            .final_snapshot()
            .map(|s| s.principal)
            .unwrap_or(0.0)
    }
}
