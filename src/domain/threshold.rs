//! Threshold comparisons and immutable threshold sets.
//!
//! A [`ThresholdSet`] is plain data: which metrics gate the decision, each
//! with an inclusive bound and direction. Two built-in presets are provided;
//! any other set comes from configuration.

use crate::domain::error::ScreenerError;
use crate::domain::metric::Metric;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// metric <= bound
    AtMost,
    /// metric >= bound
    AtLeast,
}

impl Direction {
    pub fn symbol(&self) -> &'static str {
        match self {
            Direction::AtMost => "<=",
            Direction::AtLeast => ">=",
        }
    }

    pub fn holds(&self, value: f64, bound: f64) -> bool {
        match self {
            Direction::AtMost => value <= bound,
            Direction::AtLeast => value >= bound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub metric: Metric,
    pub direction: Direction,
    pub bound: f64,
}

impl Threshold {
    pub fn at_most(metric: Metric, bound: f64) -> Self {
        Self {
            metric,
            direction: Direction::AtMost,
            bound,
        }
    }

    pub fn at_least(metric: Metric, bound: f64) -> Self {
        Self {
            metric,
            direction: Direction::AtLeast,
            bound,
        }
    }

    /// `None` when the value is absent.
    pub fn check(&self, value: Option<f64>) -> Option<bool> {
        value.map(|v| self.direction.holds(v, self.bound))
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.metric, self.direction.symbol(), self.bound)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSet {
    thresholds: Vec<Threshold>,
}

impl ThresholdSet {
    pub fn new(thresholds: Vec<Threshold>) -> Result<Self, ScreenerError> {
        if thresholds.is_empty() {
            return Err(ScreenerError::ThresholdInvalid {
                reason: "at least one threshold is required".into(),
            });
        }
        let mut seen = HashSet::new();
        for t in &thresholds {
            if !seen.insert(t.metric) {
                return Err(ScreenerError::ThresholdInvalid {
                    reason: format!("duplicate threshold for {}", t.metric),
                });
            }
            if !t.bound.is_finite() {
                return Err(ScreenerError::ThresholdInvalid {
                    reason: format!("bound for {} must be finite", t.metric),
                });
            }
        }
        Ok(Self { thresholds })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Threshold> {
        self.thresholds.iter()
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn get(&self, metric: Metric) -> Option<&Threshold> {
        self.thresholds.iter().find(|t| t.metric == metric)
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.thresholds.iter().map(|t| t.metric).collect()
    }
}

/// Named built-in threshold sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Nine comparisons across valuation, yield, leverage and profitability.
    Comprehensive,
    /// Five comparisons: valuation, dividend and profitability.
    Core,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Comprehensive, Preset::Core];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Comprehensive => "comprehensive",
            Preset::Core => "core",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn thresholds(&self) -> ThresholdSet {
        let list = match self {
            Preset::Comprehensive => vec![
                Threshold::at_most(Metric::PeRatio, 15.0),
                Threshold::at_most(Metric::PbRatio, 3.0),
                Threshold::at_most(Metric::PegRatio, 1.0),
                Threshold::at_least(Metric::DividendYield, 4.0),
                Threshold::at_least(Metric::EarningsYield, 5.0),
                Threshold::at_most(Metric::EvToEbitda, 13.0),
                Threshold::at_least(Metric::FreeCashFlowYield, 4.0),
                Threshold::at_least(Metric::InterestCoverage, 1.5),
                Threshold::at_least(Metric::OperatingMargin, 12.0),
            ],
            Preset::Core => vec![
                Threshold::at_most(Metric::PeRatio, 15.0),
                Threshold::at_most(Metric::PbRatio, 3.0),
                Threshold::at_least(Metric::DividendYield, 4.0),
                Threshold::at_least(Metric::OperatingMargin, 12.0),
                Threshold::at_least(Metric::ReturnOnEquity, 15.0),
            ],
        };
        ThresholdSet { thresholds: list }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let t = Threshold::at_most(Metric::PeRatio, 15.0);
        assert_eq!(t.check(Some(15.0)), Some(true));
        assert_eq!(t.check(Some(15.01)), Some(false));
        let t = Threshold::at_least(Metric::DividendYield, 4.0);
        assert_eq!(t.check(Some(4.0)), Some(true));
        assert_eq!(t.check(Some(3.99)), Some(false));
    }

    #[test]
    fn absent_value_has_no_outcome() {
        let t = Threshold::at_most(Metric::PeRatio, 15.0);
        assert_eq!(t.check(None), None);
    }

    #[test]
    fn empty_set_rejected() {
        let err = ThresholdSet::new(vec![]).unwrap_err();
        assert!(matches!(err, ScreenerError::ThresholdInvalid { .. }));
    }

    #[test]
    fn duplicate_metric_rejected() {
        let err = ThresholdSet::new(vec![
            Threshold::at_most(Metric::PeRatio, 15.0),
            Threshold::at_most(Metric::PeRatio, 20.0),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ScreenerError::ThresholdInvalid { reason } if reason.contains("pe_ratio"))
        );
    }

    #[test]
    fn non_finite_bound_rejected() {
        let err =
            ThresholdSet::new(vec![Threshold::at_least(Metric::EarningsYield, f64::NAN)])
                .unwrap_err();
        assert!(matches!(err, ScreenerError::ThresholdInvalid { .. }));
    }

    #[test]
    fn comprehensive_preset_has_nine_comparisons() {
        let set = Preset::Comprehensive.thresholds();
        assert_eq!(set.len(), 9);
        assert_eq!(
            set.get(Metric::EvToEbitda),
            Some(&Threshold::at_most(Metric::EvToEbitda, 13.0))
        );
        assert!(set.get(Metric::ReturnOnEquity).is_none());
    }

    #[test]
    fn core_preset_has_five_comparisons() {
        let set = Preset::Core.thresholds();
        assert_eq!(set.len(), 5);
        assert_eq!(
            set.get(Metric::ReturnOnEquity),
            Some(&Threshold::at_least(Metric::ReturnOnEquity, 15.0))
        );
    }

    #[test]
    fn presets_pass_validation() {
        for preset in Preset::ALL {
            let set = preset.thresholds();
            let rebuilt = ThresholdSet::new(set.iter().copied().collect()).unwrap();
            assert_eq!(rebuilt, set);
        }
    }

    #[test]
    fn preset_lookup_by_name() {
        assert_eq!(Preset::from_name("Core"), Some(Preset::Core));
        assert_eq!(
            Preset::from_name(" comprehensive "),
            Some(Preset::Comprehensive)
        );
        assert_eq!(Preset::from_name("aggressive"), None);
    }

    #[test]
    fn threshold_display() {
        let t = Threshold::at_least(Metric::InterestCoverage, 1.5);
        assert_eq!(t.to_string(), "interest_coverage >= 1.5");
    }
}
