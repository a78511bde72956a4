//! Data access port trait.
//!
//! A data port hands out one raw snapshot per ticker. Failing to produce one
//! is a per-ticker condition; callers decide whether to skip or abort.

use crate::domain::error::ScreenerError;
use crate::domain::record::RawRecord;

pub trait DataPort {
    fn fetch_snapshot(&self, ticker: &str) -> Result<RawRecord, ScreenerError>;

    fn list_tickers(&self) -> Result<Vec<String>, ScreenerError>;
}
