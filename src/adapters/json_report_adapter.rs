//! JSON report adapter implementing ReportPort.
//!
//! Writes a single document with the run summary, the thresholds applied,
//! one entry per evaluated instrument, and the skipped tickers.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::ScreenerError;
use crate::domain::evaluator::{CheckStatus, EvaluatedRecord};
use crate::domain::metric::Metric;
use crate::domain::record::RawField;
use crate::domain::screen::ScreenReport;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub thresholds: Vec<String>,
    pub rows: Vec<JsonRow<'a>>,
    pub failures: Vec<JsonFailure<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub requested: usize,
    pub evaluated: usize,
    pub invest: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonRow<'a> {
    pub ticker: &'a str,
    pub decision: &'static str,
    pub metrics: BTreeMap<&'static str, Option<f64>>,
    pub inputs: BTreeMap<&'static str, Option<f64>>,
    /// Thresholds that failed or had no value, e.g. `pe_ratio <= 15 (missing)`.
    pub unmet: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonFailure<'a> {
    pub ticker: &'a str,
    pub reason: &'a str,
}

impl<'a> JsonRow<'a> {
    fn from_record(record: &'a EvaluatedRecord) -> Self {
        Self {
            ticker: record.ticker(),
            decision: record.decision.as_str(),
            metrics: Metric::ALL
                .iter()
                .map(|&m| (m.key(), record.metric(m)))
                .collect(),
            inputs: RawField::ALL
                .iter()
                .map(|&f| (f.key(), record.raw.get(f)))
                .collect(),
            unmet: record
                .failed_checks()
                .map(|c| match c.status {
                    CheckStatus::Missing => format!("{} (missing)", c.threshold),
                    _ => format!("{} (was {})", c.threshold, c.value.unwrap_or_default()),
                })
                .collect(),
        }
    }
}

impl<'a> JsonReport<'a> {
    pub fn build(report: &'a ScreenReport, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            summary: Summary {
                requested: report.requested,
                evaluated: report.evaluated(),
                invest: report.invest_count(),
                failed: report.failures.len(),
            },
            thresholds: report.thresholds.iter().map(|t| t.to_string()).collect(),
            rows: report.records.iter().map(JsonRow::from_record).collect(),
            failures: report
                .failures
                .iter()
                .map(|f| JsonFailure {
                    ticker: &f.ticker,
                    reason: &f.reason,
                })
                .collect(),
        }
    }
}

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &ScreenReport, output_path: &Path) -> Result<(), ScreenerError> {
        let doc = JsonReport::build(report, Utc::now());
        let json = serde_json::to_string_pretty(&doc).map_err(|e| ScreenerError::Report {
            reason: format!("JSON serialization error: {}", e),
        })?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, json)?;
        Ok(())
    }
}
