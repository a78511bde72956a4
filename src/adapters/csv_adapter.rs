//! CSV snapshot data adapter.
//!
//! Reads one CSV file holding a row per ticker. The header must contain a
//! `ticker` column; every other column naming a [`RawField`] (snake_case or
//! provider spelling) is read, anything else is ignored. A column that is not
//! in the file leaves that field absent for every ticker.

use crate::domain::error::ScreenerError;
use crate::domain::record::{parse_cell, RawField, RawRecord};
use crate::ports::data_port::DataPort;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// The file is read on first use and kept for the adapter's lifetime. A
/// failed load is not cached.
pub struct CsvAdapter {
    path: PathBuf,
    table: OnceCell<Table>,
}

struct Table {
    fields: Vec<(usize, RawField)>,
    /// Keyed by uppercased ticker; the first row for a ticker wins.
    rows: HashMap<String, csv::StringRecord>,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            table: OnceCell::new(),
        }
    }

    fn table(&self) -> Result<&Table, ScreenerError> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let table = self.load()?;
        Ok(self.table.get_or_init(|| table))
    }

    fn load(&self) -> Result<Table, ScreenerError> {
        let content = fs::read_to_string(&self.path).map_err(|e| ScreenerError::DataSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| ScreenerError::DataSource {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let ticker_col = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("ticker") || h.eq_ignore_ascii_case("symbol"))
            .ok_or_else(|| ScreenerError::DataSource {
                reason: format!("{} has no ticker column", self.path.display()),
            })?;

        let mut fields: Vec<(usize, RawField)> = Vec::new();
        for (col, header) in headers.iter().enumerate() {
            let Ok(field) = header.parse::<RawField>() else {
                continue;
            };
            if let Some(&(prev, _)) = fields.iter().find(|(_, f)| *f == field) {
                return Err(ScreenerError::DataSource {
                    reason: format!(
                        "{}: columns '{}' and '{}' both map to {}",
                        self.path.display(),
                        &headers[prev],
                        header,
                        field
                    ),
                });
            }
            fields.push((col, field));
        }

        let mut rows = HashMap::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ScreenerError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;
            let ticker = match record.get(ticker_col) {
                Some(t) if !t.is_empty() => t.to_uppercase(),
                _ => continue,
            };
            if rows.contains_key(&ticker) {
                warn!(ticker = %ticker, path = %self.path.display(), "duplicate snapshot row, keeping first");
                continue;
            }
            rows.insert(ticker, record);
        }

        debug!(
            path = %self.path.display(),
            columns = fields.len(),
            rows = rows.len(),
            "loaded snapshot file"
        );
        Ok(Table { fields, rows })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_snapshot(&self, ticker: &str) -> Result<RawRecord, ScreenerError> {
        let table = self.table()?;
        let row = table
            .rows
            .get(&ticker.to_uppercase())
            .ok_or_else(|| ScreenerError::UnknownTicker {
                ticker: ticker.to_string(),
            })?;

        let mut record = RawRecord::new(ticker);
        for &(col, field) in &table.fields {
            let value = parse_cell(row.get(col).unwrap_or("")).map_err(|reason| {
                ScreenerError::MalformedSnapshot {
                    ticker: ticker.to_string(),
                    reason: format!("{}: {}", field, reason),
                }
            })?;
            record = record.with(field, value);
        }
        Ok(record)
    }

    fn list_tickers(&self) -> Result<Vec<String>, ScreenerError> {
        let mut tickers: Vec<String> = self.table()?.rows.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}
