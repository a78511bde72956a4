//! JSON snapshot data adapter.
//!
//! Reads `<TICKER>.json` files from a directory. Each file holds the market
//! data provider's `info` object as exported, keyed by the provider's field
//! names (`trailingPE`, `freeCashflow`, ...). Unrelated keys are ignored.

use crate::domain::error::ScreenerError;
use crate::domain::record::{parse_cell, RawField, RawRecord};
use crate::ports::data_port::DataPort;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct JsonAdapter {
    base_path: PathBuf,
}

impl JsonAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Locate `<TICKER>.json`, matching the stem case-insensitively so that
    /// every ticker `list_tickers` reports can be fetched.
    fn json_path(&self, ticker: &str) -> Result<PathBuf, ScreenerError> {
        let exact = self.base_path.join(format!("{}.json", ticker));
        if exact.is_file() {
            return Ok(exact);
        }

        let entries = fs::read_dir(&self.base_path).map_err(|e| ScreenerError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                path.extension().is_some_and(|ext| ext == "json")
                    && path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .is_some_and(|stem| stem.eq_ignore_ascii_case(ticker))
            })
            .ok_or_else(|| ScreenerError::UnknownTicker {
                ticker: ticker.to_string(),
            })
    }
}

fn field_value(ticker: &str, field: RawField, value: &Value) -> Result<Option<f64>, ScreenerError> {
    let malformed = |reason: String| ScreenerError::MalformedSnapshot {
        ticker: ticker.to_string(),
        reason: format!("{}: {}", field.provider_key(), reason),
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => parse_cell(s).map_err(malformed),
        other => Err(malformed(format!("unexpected value {}", other))),
    }
}

pub fn record_from_info(ticker: &str, info: &Map<String, Value>) -> Result<RawRecord, ScreenerError> {
    let mut record = RawRecord::new(ticker);
    for field in RawField::ALL {
        if let Some(value) = info.get(field.provider_key()) {
            record = record.with(field, field_value(ticker, field, value)?);
        }
    }
    Ok(record)
}

impl DataPort for JsonAdapter {
    fn fetch_snapshot(&self, ticker: &str) -> Result<RawRecord, ScreenerError> {
        let path = self.json_path(ticker)?;
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ScreenerError::UnknownTicker {
                ticker: ticker.to_string(),
            },
            _ => ScreenerError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let info: Map<String, Value> =
            serde_json::from_str(&content).map_err(|e| ScreenerError::MalformedSnapshot {
                ticker: ticker.to_string(),
                reason: format!("invalid JSON: {}", e),
            })?;

        record_from_info(ticker, &info)
    }

    fn list_tickers(&self) -> Result<Vec<String>, ScreenerError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ScreenerError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| ScreenerError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(".json") {
                if !stem.is_empty() {
                    tickers.push(stem.to_uppercase());
                }
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("MSFT.json"),
            r#"{
                "symbol": "MSFT",
                "longName": "Microsoft Corporation",
                "trailingPE": 35.2,
                "priceToBook": 12.1,
                "pegRatio": null,
                "dividendYield": 0.0072,
                "enterpriseToEbitda": 24.5,
                "marketCap": 3100000000000,
                "freeCashflow": 61000000000,
                "ebitda": 130000000000,
                "interestExpense": 2900000000,
                "operatingMargins": 0.45,
                "returnOnEquity": 0.36
            }"#,
        )
        .unwrap();
        fs::write(
            path.join("COIN.json"),
            r#"{"symbol": "COIN", "trailingPE": "Infinity", "priceToBook": "N/A", "marketCap": 50000000000}"#,
        )
        .unwrap();
        fs::write(path.join("BROKEN.json"), "{ not json").unwrap();
        fs::write(path.join("WEIRD.json"), r#"{"trailingPE": true}"#).unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_snapshot_maps_provider_keys() {
        let (_dir, path) = setup_test_data();
        let adapter = JsonAdapter::new(path);

        let r = adapter.fetch_snapshot("MSFT").unwrap();
        assert_eq!(r.get(RawField::TrailingPe), Some(35.2));
        assert_eq!(r.get(RawField::PriceToBook), Some(12.1));
        assert_eq!(r.get(RawField::PegRatio), None);
        assert_eq!(r.get(RawField::MarketCap), Some(3.1e12));
        assert_eq!(r.get(RawField::FreeCashFlow), Some(6.1e10));
        assert_eq!(r.get(RawField::ReturnOnEquity), Some(0.36));
        assert_eq!(r.present_count(), 10);
    }

    #[test]
    fn string_sentinels_are_absent() {
        let (_dir, path) = setup_test_data();
        let adapter = JsonAdapter::new(path);

        let r = adapter.fetch_snapshot("COIN").unwrap();
        assert_eq!(r.get(RawField::TrailingPe), None);
        assert_eq!(r.get(RawField::PriceToBook), None);
        assert_eq!(r.get(RawField::MarketCap), Some(5e10));
    }

    #[test]
    fn missing_file_is_unknown_ticker() {
        let (_dir, path) = setup_test_data();
        let adapter = JsonAdapter::new(path);
        let err = adapter.fetch_snapshot("NOPE").unwrap_err();
        assert!(matches!(err, ScreenerError::UnknownTicker { ticker } if ticker == "NOPE"));
    }

    #[test]
    fn listed_lowercase_file_can_be_fetched() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("nflx.json"), r#"{"trailingPE": 41.0}"#).unwrap();
        let adapter = JsonAdapter::new(path);

        let listed = adapter.list_tickers().unwrap();
        assert!(listed.contains(&"NFLX".to_string()));

        let r = adapter.fetch_snapshot("NFLX").unwrap();
        assert_eq!(r.ticker(), "NFLX");
        assert_eq!(r.get(RawField::TrailingPe), Some(41.0));
    }

    #[test]
    fn every_listed_ticker_resolves_to_a_file() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("nflx.json"), "{}").unwrap();
        let adapter = JsonAdapter::new(path);

        for ticker in adapter.list_tickers().unwrap() {
            let err = adapter.fetch_snapshot(&ticker).err();
            assert!(
                !matches!(err, Some(ScreenerError::UnknownTicker { .. })),
                "{ticker} listed but not found"
            );
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        let (_dir, path) = setup_test_data();
        let adapter = JsonAdapter::new(path);
        let err = adapter.fetch_snapshot("BROKEN").unwrap_err();
        assert!(matches!(err, ScreenerError::MalformedSnapshot { .. }));
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        let (_dir, path) = setup_test_data();
        let adapter = JsonAdapter::new(path);
        let err = adapter.fetch_snapshot("WEIRD").unwrap_err();
        assert!(
            matches!(err, ScreenerError::MalformedSnapshot { reason, .. } if reason.contains("trailingPE"))
        );
    }

    #[test]
    fn list_tickers_uses_json_file_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = JsonAdapter::new(path);
        assert_eq!(
            adapter.list_tickers().unwrap(),
            vec!["BROKEN", "COIN", "MSFT", "WEIRD"]
        );
    }

    #[test]
    fn list_tickers_missing_directory() {
        let adapter = JsonAdapter::new(PathBuf::from("/nonexistent/snapshots"));
        assert!(matches!(
            adapter.list_tickers(),
            Err(ScreenerError::DataSource { .. })
        ));
    }
}
