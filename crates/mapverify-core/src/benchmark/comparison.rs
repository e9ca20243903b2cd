//! Comparing a benchmark mean with earlier runs.
use serde::{Deserialize, Serialize};

use crate::grade::mean;
use crate::history::HistoryRecord;

/// Direction of an operation's timings over recent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Degrading,
    /// Only one earlier measurement exists.
    InsufficientData,
    /// No earlier measurement exists.
    Baseline,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Degrading => "degrading",
            Self::InsufficientData => "insufficient_data",
            Self::Baseline => "baseline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// Mean of the most recent earlier run.
    pub previous_mean: Option<f64>,
    /// `(previous − current) / previous × 100`; positive means faster.
    pub improvement_percent: Option<f64>,
    /// Mean over the trend window.
    pub window_mean: Option<f64>,
    pub trend: Trend,
}

/// Compares `current_mean` for `operation` with the records in `history`
/// (oldest first) that measured it.
///
/// The trend looks at the last `window` measurements: more than 5 % under
/// their mean is improving, more than 5 % over is degrading.
pub fn compare(
    operation: &str,
    current_mean: f64,
    history: &[HistoryRecord],
    window: usize,
) -> Comparison {
    let previous: Vec<f64> = history
        .iter()
        .filter_map(|r| r.benchmark_means.get(operation).copied())
        .collect();

    let previous_mean = previous.last().copied();
    let improvement_percent = previous_mean
        .filter(|p| *p > 0.0)
        .map(|p| (p - current_mean) / p * 100.0);

    let recent = &previous[previous.len().saturating_sub(window.max(1))..];
    let window_mean = mean(recent);
    let trend = match (previous.len(), window_mean) {
        (0, _) | (_, None) => Trend::Baseline,
        (1, _) => Trend::InsufficientData,
        (_, Some(m)) if current_mean < m * 0.95 => Trend::Improving,
        (_, Some(m)) if current_mean > m * 1.05 => Trend::Degrading,
        (_, Some(_)) => Trend::Stable,
    };

    Comparison {
        previous_mean,
        improvement_percent,
        window_mean,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::record;

    fn with_means(means: &[f64]) -> Vec<HistoryRecord> {
        means
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mut r = record(&format!("run-{i}"), &[]);
                r.benchmark_means.insert("connectivityValidation".to_owned(), *m);
                r
            })
            .collect()
    }

    #[test]
    fn no_history_is_baseline() {
        let c = compare("connectivityValidation", 10.0, &[], 5);
        assert_eq!(c.trend, Trend::Baseline);
        assert_eq!(c.previous_mean, None);
        assert_eq!(c.improvement_percent, None);
    }

    #[test]
    fn single_record_is_insufficient_but_still_compared() {
        let c = compare("connectivityValidation", 8.0, &with_means(&[10.0]), 5);
        assert_eq!(c.trend, Trend::InsufficientData);
        assert!((c.improvement_percent.unwrap_or_default() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn trend_uses_window_mean_with_dead_band() {
        let history = with_means(&[100.0, 10.0, 10.0, 10.0, 10.0, 10.0]);
        assert_eq!(compare("connectivityValidation", 10.4, &history, 5).trend, Trend::Stable);
        assert_eq!(compare("connectivityValidation", 9.0, &history, 5).trend, Trend::Improving);
        assert_eq!(compare("connectivityValidation", 11.0, &history, 5).trend, Trend::Degrading);
    }

    #[test]
    fn records_without_the_operation_are_skipped() {
        let mut history = with_means(&[10.0, 10.0]);
        history.push(record("unrelated", &[]));
        let c = compare("connectivityValidation", 12.0, &history, 5);
        assert_eq!(c.previous_mean, Some(10.0));
        assert_eq!(c.trend, Trend::Degrading);
    }
}
