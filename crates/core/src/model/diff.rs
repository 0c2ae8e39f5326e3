use serde::Serialize;

/// How a node's share of the profile moved from baseline to comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum DiffChange {
    /// Absent from the baseline.
    New,
    /// Absent from the comparison.
    Removed,
    /// Relative change of the share, in percent (`+50` means half again as much).
    Changed(f64),
}

impl DiffChange {
    /// Compare two shares given in percent of their own side's total.
    pub fn between(baseline_percent: f64, comparison_percent: f64) -> Self {
        if baseline_percent == 0.0 {
            return if comparison_percent > 0.0 {
                Self::New
            } else {
                Self::Changed(0.0)
            };
        }
        if comparison_percent == 0.0 {
            return Self::Removed;
        }
        Self::Changed((comparison_percent - baseline_percent) / baseline_percent * 100.0)
    }

    /// The change as a signed percentage, with `New` and `Removed` at the
    /// ends of the scale.
    pub fn percent(self) -> f64 {
        match self {
            Self::New => f64::INFINITY,
            Self::Removed => -100.0,
            Self::Changed(p) => p,
        }
    }
}

/// Baseline and comparison shares of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffShares {
    pub baseline_percent: f64,
    pub comparison_percent: f64,
    pub change: DiffChange,
}

impl DiffShares {
    /// Shares of `baseline` and `comparison` ticks in their sides' totals.
    pub fn new(baseline: f64, baseline_total: f64, comparison: f64, comparison_total: f64) -> Self {
        let baseline_percent = percent_of(baseline, baseline_total);
        let comparison_percent = percent_of(comparison, comparison_total);
        Self {
            baseline_percent,
            comparison_percent,
            change: DiffChange::between(baseline_percent, comparison_percent),
        }
    }
}

pub(crate) fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}
