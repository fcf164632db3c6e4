//! Result export port trait.

use crate::domain::engine::SimulationResult;
use crate::domain::error::NisaError;
use crate::domain::risk::RiskBand;
use std::path::Path;

/// Port for handing simulation output to a charting or reporting consumer.
pub trait ReportPort {
    fn write(&self, result: &SimulationResult, output_path: &Path) -> Result<(), NisaError>;

    fn write_risk(&self, bands: &[RiskBand], output_path: &Path) -> Result<(), NisaError>;
}
