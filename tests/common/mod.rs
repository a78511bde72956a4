#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use valuescreen::domain::error::ScreenerError;
use valuescreen::domain::record::{RawField, RawRecord};
use valuescreen::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, RawRecord>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_record(mut self, record: RawRecord) -> Self {
        self.data.insert(record.ticker().to_string(), record);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_snapshot(&self, ticker: &str) -> Result<RawRecord, ScreenerError> {
        self.calls.borrow_mut().push(ticker.to_string());
        if let Some(reason) = self.errors.get(ticker) {
            return Err(ScreenerError::DataSource {
                reason: reason.clone(),
            });
        }
        self.data
            .get(ticker)
            .cloned()
            .ok_or_else(|| ScreenerError::UnknownTicker {
                ticker: ticker.to_string(),
            })
    }

    fn list_tickers(&self) -> Result<Vec<String>, ScreenerError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

/// Every field present; passes both built-in presets.
pub fn value_stock(ticker: &str) -> RawRecord {
    RawRecord::new(ticker)
        .with(RawField::TrailingPe, 10.0)
        .with(RawField::PriceToBook, 2.0)
        .with(RawField::PegRatio, 0.8)
        .with(RawField::DividendYield, 0.05)
        .with(RawField::EnterpriseToEbitda, 8.0)
        .with(RawField::MarketCap, 1000.0)
        .with(RawField::FreeCashFlow, 50.0)
        .with(RawField::Ebitda, 100.0)
        .with(RawField::InterestExpense, 20.0)
        .with(RawField::OperatingMargins, 0.15)
        .with(RawField::ReturnOnEquity, 0.2)
}

/// Richly priced growth stock; fails on valuation.
pub fn growth_stock(ticker: &str) -> RawRecord {
    value_stock(ticker)
        .with(RawField::TrailingPe, 80.0)
        .with(RawField::PriceToBook, 15.0)
        .with(RawField::DividendYield, None::<f64>)
}

pub fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// ExitCode has no stable accessor for its value, so compare Debug output.
pub fn exit_code_of(code: std::process::ExitCode) -> String {
    format!("{code:?}")
}

pub fn is_success(code: std::process::ExitCode) -> bool {
    exit_code_of(code) == exit_code_of(std::process::ExitCode::SUCCESS)
}

pub fn is_exit(code: std::process::ExitCode, expected: u8) -> bool {
    exit_code_of(code) == exit_code_of(std::process::ExitCode::from(expected))
}
