//! Simulation record persistence port trait.

use crate::domain::error::NisaError;
use crate::domain::record::{NewRecord, SimulationRecord};

/// Append-only store of completed simulations.
pub trait StorePort {
    /// Stores the record and returns its assigned id.
    fn append(&self, record: &NewRecord) -> Result<i64, NisaError>;

    /// Up to `limit` records, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<SimulationRecord>, NisaError>;

    fn get(&self, id: i64) -> Result<Option<SimulationRecord>, NisaError>;
}
