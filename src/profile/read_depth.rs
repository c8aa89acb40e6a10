//! Sequencing depth profiling across time points.

use crate::data::ReadMatrix;
use serde::{Deserialize, Serialize};

/// Profile of sequencing depth across a mouse's time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadDepthProfile {
    /// Number of time points.
    pub n_time_points: usize,
    /// Total reads per time point.
    pub depths: Vec<u64>,
    /// Mean depth.
    pub mean: f64,
    /// Median depth.
    pub median: f64,
    /// Population standard deviation of depths.
    pub std_dev: f64,
    /// Minimum depth.
    pub min: u64,
    /// Maximum depth.
    pub max: u64,
    /// Coefficient of variation (std_dev / mean).
    pub cv: f64,
    /// Labels of time points with zero total reads.
    pub degenerate_time_points: Vec<String>,
}

impl ReadDepthProfile {
    /// Whether any time point has zero total reads.
    ///
    /// Such a time point makes the proportion conversion impossible and
    /// will be rejected by `convert`.
    pub fn has_degenerate_time_points(&self) -> bool {
        !self.degenerate_time_points.is_empty()
    }

    /// Check if depth is highly variable across time (CV > 0.5).
    pub fn is_highly_variable(&self) -> bool {
        self.cv > 0.5
    }

    /// Get indices of time points with depth below a threshold.
    pub fn time_points_below(&self, threshold: u64) -> Vec<usize> {
        self.depths
            .iter()
            .enumerate()
            .filter(|(_, &d)| d < threshold)
            .map(|(i, _)| i)
            .collect()
    }
}

impl std::fmt::Display for ReadDepthProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Read Depth Profile")?;
        writeln!(f, "  Time points: {}", self.n_time_points)?;
        writeln!(f, "  Mean:    {:.0}", self.mean)?;
        writeln!(f, "  Median:  {:.0}", self.median)?;
        writeln!(f, "  Std Dev: {:.0}", self.std_dev)?;
        writeln!(f, "  Min:     {}", self.min)?;
        writeln!(f, "  Max:     {}", self.max)?;
        writeln!(f, "  CV:      {:.2}", self.cv)?;
        if self.has_degenerate_time_points() {
            writeln!(
                f,
                "  Degenerate time points: {}",
                self.degenerate_time_points.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Profile sequencing depth across a read matrix's time points.
pub fn profile_read_depth(reads: &ReadMatrix) -> ReadDepthProfile {
    let depths = reads.col_sums();
    let n_time_points = depths.len();

    if n_time_points == 0 {
        return ReadDepthProfile {
            n_time_points: 0,
            depths: vec![],
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0,
            max: 0,
            cv: 0.0,
            degenerate_time_points: vec![],
        };
    }

    let mean = depths.iter().sum::<u64>() as f64 / n_time_points as f64;

    let variance = depths
        .iter()
        .map(|&x| {
            let diff = x as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n_time_points as f64;
    let std_dev = variance.sqrt();

    let median = median_u64(&depths);
    let min = *depths.iter().min().unwrap_or(&0);
    let max = *depths.iter().max().unwrap_or(&0);
    let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };

    let degenerate_time_points = depths
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(j, _)| reads.time_labels()[j].clone())
        .collect();

    ReadDepthProfile {
        n_time_points,
        depths,
        mean,
        median,
        std_dev,
        min,
        max,
        cv,
        degenerate_time_points,
    }
}

fn median_u64(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
    } else {
        sorted[n / 2] as f64
    }
}
