//! Comparable metrics and their derivation from raw fields.
//!
//! Every metric is either a raw ratio passed through, a fraction scaled to a
//! percentage, or a quotient of two raw fields. A quotient is only defined when
//! both inputs are present and the denominator is non-zero.

use crate::domain::record::{RawField, RawRecord};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    PeRatio,
    PbRatio,
    PegRatio,
    DividendYield,
    EarningsYield,
    EvToEbitda,
    FreeCashFlowYield,
    InterestCoverage,
    OperatingMargin,
    ReturnOnEquity,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::PeRatio,
        Metric::PbRatio,
        Metric::PegRatio,
        Metric::DividendYield,
        Metric::EarningsYield,
        Metric::EvToEbitda,
        Metric::FreeCashFlowYield,
        Metric::InterestCoverage,
        Metric::OperatingMargin,
        Metric::ReturnOnEquity,
    ];

    /// Config key, e.g. `pe_ratio`.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::PeRatio => "pe_ratio",
            Metric::PbRatio => "pb_ratio",
            Metric::PegRatio => "peg_ratio",
            Metric::DividendYield => "dividend_yield",
            Metric::EarningsYield => "earnings_yield",
            Metric::EvToEbitda => "ev_to_ebitda",
            Metric::FreeCashFlowYield => "free_cash_flow_yield",
            Metric::InterestCoverage => "interest_coverage",
            Metric::OperatingMargin => "operating_margin",
            Metric::ReturnOnEquity => "return_on_equity",
        }
    }

    /// Column header used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::PeRatio => "P/E Ratio",
            Metric::PbRatio => "P/B Ratio",
            Metric::PegRatio => "PEG Ratio",
            Metric::DividendYield => "Dividend Yield (%)",
            Metric::EarningsYield => "Earnings Yield (%)",
            Metric::EvToEbitda => "EV/EBITDA",
            Metric::FreeCashFlowYield => "Free Cash Flow (%)",
            Metric::InterestCoverage => "Interest Coverage",
            Metric::OperatingMargin => "Operating Margin (%)",
            Metric::ReturnOnEquity => "Return on Equity (%)",
        }
    }

    /// Raw fields this metric is computed from.
    pub fn inputs(&self) -> &'static [RawField] {
        match self {
            Metric::PeRatio | Metric::EarningsYield => &[RawField::TrailingPe],
            Metric::PbRatio => &[RawField::PriceToBook],
            Metric::PegRatio => &[RawField::PegRatio],
            Metric::DividendYield => &[RawField::DividendYield],
            Metric::EvToEbitda => &[RawField::EnterpriseToEbitda],
            Metric::FreeCashFlowYield => &[RawField::FreeCashFlow, RawField::MarketCap],
            Metric::InterestCoverage => &[RawField::Ebitda, RawField::InterestExpense],
            Metric::OperatingMargin => &[RawField::OperatingMargins],
            Metric::ReturnOnEquity => &[RawField::ReturnOnEquity],
        }
    }

    /// Compute this metric from a raw record.
    pub fn compute(&self, raw: &RawRecord) -> Option<f64> {
        let value = match self {
            Metric::PeRatio => raw.get(RawField::TrailingPe),
            Metric::PbRatio => raw.get(RawField::PriceToBook),
            Metric::PegRatio => raw.get(RawField::PegRatio),
            Metric::EvToEbitda => raw.get(RawField::EnterpriseToEbitda),
            Metric::DividendYield => as_percent(raw.get(RawField::DividendYield)),
            Metric::OperatingMargin => as_percent(raw.get(RawField::OperatingMargins)),
            Metric::ReturnOnEquity => as_percent(raw.get(RawField::ReturnOnEquity)),
            Metric::EarningsYield => earnings_yield(raw.get(RawField::TrailingPe)),
            Metric::FreeCashFlowYield => free_cash_flow_yield(
                raw.get(RawField::FreeCashFlow),
                raw.get(RawField::MarketCap),
            ),
            Metric::InterestCoverage => interest_coverage(
                raw.get(RawField::Ebitda),
                raw.get(RawField::InterestExpense),
            ),
        };
        value.filter(|v| v.is_finite())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.key().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown metric '{}'", needle))
    }
}

/// fraction × 100
pub fn as_percent(fraction: Option<f64>) -> Option<f64> {
    fraction.map(|f| f * 100.0)
}

/// 100 / P/E
pub fn earnings_yield(pe: Option<f64>) -> Option<f64> {
    pe.filter(|&pe| pe != 0.0).map(|pe| 100.0 / pe)
}

/// (FCF / market cap) × 100
pub fn free_cash_flow_yield(free_cash_flow: Option<f64>, market_cap: Option<f64>) -> Option<f64> {
    match (free_cash_flow, market_cap) {
        (Some(fcf), Some(cap)) if cap != 0.0 => Some((fcf / cap) * 100.0),
        _ => None,
    }
}

/// EBITDA / interest expense
pub fn interest_coverage(ebitda: Option<f64>, interest_expense: Option<f64>) -> Option<f64> {
    match (ebitda, interest_expense) {
        (Some(e), Some(i)) if i != 0.0 => Some(e / i),
        _ => None,
    }
}
