//! Report generation port trait.

use crate::domain::error::ScreenerError;
use crate::domain::screen::ScreenReport;
use std::path::Path;

/// Port for writing screen results to a tabular sink.
pub trait ReportPort {
    fn write(&self, report: &ScreenReport, output_path: &Path) -> Result<(), ScreenerError>;
}
