//! CSV export of simulation output for external charting.

use crate::domain::engine::SimulationResult;
use crate::domain::error::NisaError;
use crate::domain::risk::RiskBand;
use crate::ports::report_port::ReportPort;
use std::path::Path;

fn csv_err(e: csv::Error) -> NisaError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => NisaError::Io(io),
        other => NisaError::Serialization {
            reason: format!("CSV write error: {:?}", other),
        },
    }
}

/// Writes `period,principal,market_value` and `year,mean,upper_5,lower_5,principal` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_result_to<W: std::io::Write>(
        &self,
        result: &SimulationResult,
        writer: W,
    ) -> Result<(), NisaError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["period", "principal", "market_value"])
            .map_err(csv_err)?;
        for s in &result.snapshots {
            wtr.write_record([
                s.period.to_string(),
                format!("{:.2}", s.principal),
                format!("{:.2}", s.market_value),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_risk_to<W: std::io::Write>(
        &self,
        bands: &[RiskBand],
        writer: W,
    ) -> Result<(), NisaError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["year", "mean", "upper_5", "lower_5", "principal"])
            .map_err(csv_err)?;
        for b in bands {
            wtr.write_record([
                b.year.to_string(),
                format!("{:.2}", b.mean),
                format!("{:.2}", b.upper_5),
                format!("{:.2}", b.lower_5),
                format!("{:.2}", b.principal),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &SimulationResult, output_path: &Path) -> Result<(), NisaError> {
        let file = std::fs::File::create(output_path)?;
        self.write_result_to(result, file)
    }

    fn write_risk(&self, bands: &[RiskBand], output_path: &Path) -> Result<(), NisaError> {
        let file = std::fs::File::create(output_path)?;
        self.write_risk_to(bands, file)
    }
}
