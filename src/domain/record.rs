//! Raw per-instrument financial snapshot.
//!
//! A [`RawRecord`] holds one optional value per [`RawField`]. Values that are
//! not finite never make it into a record, so "absent" is the only way a
//! field can be unknown.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RawField {
    TrailingPe,
    PriceToBook,
    PegRatio,
    /// Fraction, e.g. 0.05 for 5%.
    DividendYield,
    EnterpriseToEbitda,
    MarketCap,
    FreeCashFlow,
    Ebitda,
    InterestExpense,
    /// Fraction.
    OperatingMargins,
    /// Fraction.
    ReturnOnEquity,
}

impl RawField {
    pub const ALL: [RawField; 11] = [
        RawField::TrailingPe,
        RawField::PriceToBook,
        RawField::PegRatio,
        RawField::DividendYield,
        RawField::EnterpriseToEbitda,
        RawField::MarketCap,
        RawField::FreeCashFlow,
        RawField::Ebitda,
        RawField::InterestExpense,
        RawField::OperatingMargins,
        RawField::ReturnOnEquity,
    ];

    /// Column name used by CSV snapshots.
    pub fn key(&self) -> &'static str {
        match self {
            RawField::TrailingPe => "trailing_pe",
            RawField::PriceToBook => "price_to_book",
            RawField::PegRatio => "peg_ratio",
            RawField::DividendYield => "dividend_yield",
            RawField::EnterpriseToEbitda => "enterprise_to_ebitda",
            RawField::MarketCap => "market_cap",
            RawField::FreeCashFlow => "free_cash_flow",
            RawField::Ebitda => "ebitda",
            RawField::InterestExpense => "interest_expense",
            RawField::OperatingMargins => "operating_margins",
            RawField::ReturnOnEquity => "return_on_equity",
        }
    }

    /// Key used by the market-data provider's `info` payload.
    pub fn provider_key(&self) -> &'static str {
        match self {
            RawField::TrailingPe => "trailingPE",
            RawField::PriceToBook => "priceToBook",
            RawField::PegRatio => "pegRatio",
            RawField::DividendYield => "dividendYield",
            RawField::EnterpriseToEbitda => "enterpriseToEbitda",
            RawField::MarketCap => "marketCap",
            RawField::FreeCashFlow => "freeCashflow",
            RawField::Ebitda => "ebitda",
            RawField::InterestExpense => "interestExpense",
            RawField::OperatingMargins => "operatingMargins",
            RawField::ReturnOnEquity => "returnOnEquity",
        }
    }
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RawField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        RawField::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(needle) || f.provider_key() == needle)
            .ok_or_else(|| format!("unknown field '{}'", needle))
    }
}

/// Parse a snapshot cell. Blank cells and the usual "unavailable" markers are
/// absent; anything else must be a number.
pub fn parse_cell(cell: &str) -> Result<Option<f64>, String> {
    let trimmed = cell.trim();
    if is_unavailable_marker(trimmed) {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(finite)
        .map_err(|_| format!("'{}' is not a number", trimmed))
}

fn is_unavailable_marker(s: &str) -> bool {
    s.is_empty()
        || s == "-"
        || s.eq_ignore_ascii_case("n/a")
        || s.eq_ignore_ascii_case("na")
        || s.eq_ignore_ascii_case("nan")
        || s.eq_ignore_ascii_case("none")
        || s.eq_ignore_ascii_case("null")
        || s.eq_ignore_ascii_case("infinity")
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    ticker: String,
    values: BTreeMap<RawField, f64>,
}

impl RawRecord {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter. `None` and non-finite values leave the field absent.
    pub fn with(mut self, field: RawField, value: impl Into<Option<f64>>) -> Self {
        match value.into().and_then(finite) {
            Some(v) => {
                self.values.insert(field, v);
            }
            None => {
                self.values.remove(&field);
            }
        }
        self
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn get(&self, field: RawField) -> Option<f64> {
        self.values.get(&field).copied()
    }

    pub fn is_present(&self, field: RawField) -> bool {
        self.values.contains_key(&field)
    }

    pub fn present_count(&self) -> usize {
        self.values.len()
    }
}
