//! Summary statistics over benchmark samples.
use serde::{Deserialize, Serialize};

/// Descriptive statistics of a sample set.
///
/// Variance is the population variance; the median of an even-sized set is
/// the mean of its two middle values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl Statistics {
    /// Computes statistics over `samples`; `None` when empty or when any
    /// sample is NaN.
    pub fn from_samples(samples: &[f64]) -> Option<Statistics> {
        if samples.is_empty() || samples.iter().any(|s| s.is_nan()) {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Statistics {
            count,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            variance,
            std_dev: variance.sqrt(),
        })
    }
}
