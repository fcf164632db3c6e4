//! Column encoding shared by the SQL store adapters.
//!
//! Scalar parameters map to columns; the contribution amounts and snapshots
//! are stored as JSON text.

use crate::domain::engine::{SimulationResult, Snapshot};
use crate::domain::error::NisaError;
use crate::domain::plan::{
    Compounding, ContributionLimits, ContributionPlan, GrowthAssumption, LifetimeCap,
};
use crate::domain::record::{NewRecord, SimulationRecord};
use chrono::{DateTime, Utc};

/// One `simulations` row, column for column.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub id: i64,
    pub label: Option<String>,
    pub created_at: String,
    pub annual_rate: f64,
    pub compounding: String,
    pub lifetime_cap: f64,
    pub annual_cap: Option<f64>,
    pub periods_per_year: i64,
    pub contributions: String,
    pub snapshots: String,
    pub final_principal: f64,
    pub final_value: f64,
}

pub fn encode(record: &NewRecord) -> Result<RecordRow, NisaError> {
    let last = record.result.final_snapshot();
    Ok(RecordRow {
        id: 0,
        label: record.label.clone(),
        created_at: record.created_at.to_rfc3339(),
        annual_rate: record.rate.annual_rate,
        compounding: record.rate.compounding.to_string(),
        lifetime_cap: record.limits.lifetime.amount(),
        annual_cap: record.limits.annual,
        periods_per_year: record.plan.periods_per_year() as i64,
        contributions: serde_json::to_string(record.plan.amounts())?,
        snapshots: serde_json::to_string(&record.result.snapshots)?,
        final_principal: last.map(|s| s.principal).unwrap_or(0.0),
        final_value: last.map(|s| s.market_value).unwrap_or(0.0),
    })
}

pub fn decode(row: RecordRow) -> Result<SimulationRecord, NisaError> {
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map_err(|e| NisaError::Serialization {
            reason: format!("invalid created_at '{}': {}", row.created_at, e),
        })?
        .with_timezone(&Utc);
    let compounding = row
        .compounding
        .parse::<Compounding>()
        .map_err(|reason| NisaError::Serialization { reason })?;
    let periods_per_year = u32::try_from(row.periods_per_year).map_err(|_| {
        NisaError::Serialization {
            reason: format!("invalid periods_per_year {}", row.periods_per_year),
        }
    })?;
    let amounts: Vec<f64> = serde_json::from_str(&row.contributions)?;
    let snapshots: Vec<Snapshot> = serde_json::from_str(&row.snapshots)?;

    Ok(SimulationRecord {
        id: row.id,
        label: row.label,
        created_at,
        plan: ContributionPlan::new(amounts, periods_per_year),
        rate: GrowthAssumption {
            annual_rate: row.annual_rate,
            compounding,
        },
        limits: ContributionLimits {
            lifetime: LifetimeCap(row.lifetime_cap),
            annual: row.annual_cap,
        },
        result: SimulationResult {
            snapshots,
            periods_per_year,
        },
    })
}
