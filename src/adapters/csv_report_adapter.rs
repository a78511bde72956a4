//! CSV spreadsheet report adapter implementing ReportPort.
//!
//! One header row, then one row per evaluated instrument. Absent values are
//! written as empty cells. Skipped tickers do not appear.

use std::fs;
use std::path::Path;

use crate::domain::error::ScreenerError;
use crate::domain::evaluator::EvaluatedRecord;
use crate::domain::metric::Metric;
use crate::domain::record::RawField;
use crate::domain::screen::ScreenReport;
use crate::ports::report_port::ReportPort;

/// Raw inputs that have no metric of their own.
pub const INPUT_COLUMNS: [(RawField, &str); 4] = [
    (RawField::MarketCap, "Market Cap"),
    (RawField::FreeCashFlow, "Free Cash Flow"),
    (RawField::Ebitda, "EBITDA"),
    (RawField::InterestExpense, "Interest Expense"),
];

pub struct CsvReportAdapter {
    include_inputs: bool,
}

impl CsvReportAdapter {
    pub fn new(include_inputs: bool) -> Self {
        Self { include_inputs }
    }

    pub fn header(&self) -> Vec<&'static str> {
        let mut header = vec!["Ticker"];
        header.extend(Metric::ALL.iter().map(|m| m.label()));
        if self.include_inputs {
            header.extend(INPUT_COLUMNS.iter().map(|(_, label)| *label));
        }
        header.push("Decision");
        header
    }

    pub fn row(&self, record: &EvaluatedRecord) -> Vec<String> {
        let mut row = vec![record.ticker().to_string()];
        row.extend(Metric::ALL.iter().map(|&m| format_cell(record.metric(m))));
        if self.include_inputs {
            row.extend(
                INPUT_COLUMNS
                    .iter()
                    .map(|(field, _)| format_cell(record.raw.get(*field))),
            );
        }
        row.push(record.decision.to_string());
        row
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn report_error(e: csv::Error) -> ScreenerError {
    ScreenerError::Report {
        reason: format!("CSV write error: {}", e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &ScreenReport, output_path: &Path) -> Result<(), ScreenerError> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut wtr = csv::Writer::from_path(output_path).map_err(report_error)?;
        wtr.write_record(self.header()).map_err(report_error)?;
        for record in &report.records {
            wtr.write_record(self.row(record)).map_err(report_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
