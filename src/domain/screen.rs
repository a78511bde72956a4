//! Batch screening over a ticker list.
//!
//! Parses ticker lists from configuration, fetches a snapshot per ticker and
//! evaluates it. A ticker whose snapshot cannot be fetched is recorded as a
//! [`FetchFailure`] and skipped; the rest of the batch still runs.

use crate::domain::error::ScreenerError;
use crate::domain::evaluator::{evaluate, Decision, EvaluatedRecord};
use crate::domain::threshold::ThresholdSet;
use crate::ports::data_port::DataPort;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// One CSV file, a row per ticker.
    Csv,
    /// A directory of `<TICKER>.json` provider snapshots.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    pub tickers: Vec<String>,
    pub source: SourceKind,
    pub data_path: PathBuf,
    pub output: PathBuf,
    pub format: ReportFormat,
    pub include_inputs: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TickerListError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("ticker list is empty")]
    Empty,
}

/// Split a comma-separated list. Tickers are trimmed and uppercased; repeats
/// after the first occurrence are dropped.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, TickerListError> {
    if input.trim().is_empty() {
        return Err(TickerListError::Empty);
    }

    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(TickerListError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            warn!(ticker = %ticker, "duplicate ticker in list, keeping first occurrence");
            continue;
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenReport {
    /// In request order.
    pub records: Vec<EvaluatedRecord>,
    pub failures: Vec<FetchFailure>,
    pub requested: usize,
    pub thresholds: ThresholdSet,
}

impl ScreenReport {
    pub fn evaluated(&self) -> usize {
        self.records.len()
    }

    pub fn invest_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.decision == Decision::Invest)
            .count()
    }

    pub fn invest_tickers(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.decision == Decision::Invest)
            .map(|r| r.ticker())
            .collect()
    }
}

pub fn run_screen(
    data_port: &dyn DataPort,
    tickers: &[String],
    thresholds: &ThresholdSet,
) -> ScreenReport {
    let mut records = Vec::with_capacity(tickers.len());
    let mut failures = Vec::new();

    for ticker in tickers {
        info!(ticker = %ticker, "processing");
        let raw = match data_port.fetch_snapshot(ticker) {
            Ok(raw) => raw,
            Err(e) => {
                if e.is_fetch_failure() {
                    warn!(ticker = %ticker, error = %e, "skipping ticker");
                } else {
                    error!(ticker = %ticker, error = %e, "unexpected error, skipping ticker");
                }
                failures.push(FetchFailure {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let evaluated = evaluate(&raw, thresholds);
        debug!(
            ticker = %ticker,
            decision = %evaluated.decision,
            failed_checks = evaluated.failed_checks().count(),
            "evaluated"
        );
        records.push(evaluated);
    }

    if !failures.is_empty() {
        info!(
            evaluated = records.len(),
            requested = tickers.len(),
            "some tickers were skipped"
        );
    }

    ScreenReport {
        records,
        failures,
        requested: tickers.len(),
        thresholds: thresholds.clone(),
    }
}

/// Like [`run_screen`] but an empty result is an error.
pub fn run_screen_strict(
    data_port: &dyn DataPort,
    tickers: &[String],
    thresholds: &ThresholdSet,
) -> Result<ScreenReport, ScreenerError> {
    let report = run_screen(data_port, tickers, thresholds);
    if report.records.is_empty() {
        return Err(ScreenerError::NoResults {
            failed: report.failures.len(),
        });
    }
    Ok(report)
}
