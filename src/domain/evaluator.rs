//! Metric evaluator.
//!
//! Derives every [`Metric`] from a [`RawRecord`] and applies a
//! [`ThresholdSet`] conjunctively. The decision is `Invest` only when every
//! configured comparison has a present value that satisfies its bound; a
//! missing metric counts the same as a failing one.
//!
//! All comparisons are evaluated (no short-circuit) so the per-check outcome
//! list is complete for diagnostics. The function is pure: same inputs, same
//! output.

use crate::domain::metric::Metric;
use crate::domain::record::RawRecord;
use crate::domain::threshold::{Threshold, ThresholdSet};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Invest,
    Hold,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Invest => "Invest",
            Decision::Hold => "Hold",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckOutcome {
    pub threshold: Threshold,
    pub value: Option<f64>,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedRecord {
    pub raw: RawRecord,
    pub metrics: BTreeMap<Metric, Option<f64>>,
    pub checks: Vec<CheckOutcome>,
    pub decision: Decision,
}

impl EvaluatedRecord {
    pub fn ticker(&self) -> &str {
        self.raw.ticker()
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied().flatten()
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| c.status != CheckStatus::Pass)
    }
}

pub fn derive_metrics(raw: &RawRecord) -> BTreeMap<Metric, Option<f64>> {
    Metric::ALL
        .iter()
        .map(|&m| (m, m.compute(raw)))
        .collect()
}

pub fn evaluate(raw: &RawRecord, thresholds: &ThresholdSet) -> EvaluatedRecord {
    let metrics = derive_metrics(raw);

    let checks: Vec<CheckOutcome> = thresholds
        .iter()
        .map(|t| {
            let value = metrics.get(&t.metric).copied().flatten();
            let status = match t.check(value) {
                Some(true) => CheckStatus::Pass,
                Some(false) => CheckStatus::Fail,
                None => CheckStatus::Missing,
            };
            CheckOutcome {
                threshold: *t,
                value,
                status,
            }
        })
        .collect();

    let decision = if checks.iter().all(|c| c.status == CheckStatus::Pass) {
        Decision::Invest
    } else {
        Decision::Hold
    };

    EvaluatedRecord {
        raw: raw.clone(),
        metrics,
        checks,
        decision,
    }
}
