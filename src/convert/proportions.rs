//! Relative abundance: rescaling read counts to per-time-point proportions.

use crate::data::ReadMatrix;
use crate::error::{AbundError, Result};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Tolerance for the per-column proportion sum check.
pub const PROPORTION_TOL: f64 = 1e-9;

/// Relative abundances for one mouse.
///
/// Each column is the corresponding read column rescaled so its entries
/// sum to 1 (a composition per time point).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProportionMatrix {
    /// The proportion data (features × time points).
    #[serde(skip)]
    pub data: DMatrix<f64>,
    /// Feature (OTU) identifiers.
    pub feature_ids: Vec<String>,
    /// Time point labels.
    pub time_labels: Vec<String>,
    /// Total read counts per time point before rescaling.
    pub read_totals: Vec<u64>,
}

impl ProportionMatrix {
    /// Get the proportion for a feature at a time point.
    pub fn get(&self, feature: usize, time: usize) -> f64 {
        self.data[(feature, time)]
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.data.nrows()
    }

    /// Number of time points.
    pub fn n_time_points(&self) -> usize {
        self.data.ncols()
    }

    /// Get a feature's proportions across time.
    pub fn row(&self, feature: usize) -> Vec<f64> {
        self.data.row(feature).iter().cloned().collect()
    }

    /// Get one time point's composition.
    pub fn col(&self, time: usize) -> Vec<f64> {
        self.data.column(time).iter().cloned().collect()
    }

    /// Get reference to the underlying matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Write the proportions to a TSV file.
    pub fn to_tsv<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        crate::data::write_matrix_tsv(path, &self.data, &self.feature_ids, &self.time_labels)
    }
}

/// Rescale each column of a dense matrix so it sums to 1.
///
/// A column whose total is zero is reported as a degenerate time point
/// before any division happens. After rescaling, every column sum is
/// re-checked against 1 within [`PROPORTION_TOL`]; a miss means the
/// normalization itself is wrong and the data must not be used.
pub fn normalize_columns(data: &DMatrix<f64>, time_labels: &[String]) -> Result<DMatrix<f64>> {
    let (n_features, n_times) = data.shape();
    if n_times != time_labels.len() {
        return Err(AbundError::DimensionMismatch {
            expected: n_times,
            actual: time_labels.len(),
        });
    }

    // Column totals, checked before dividing
    let totals: Vec<f64> = (0..n_times)
        .map(|j| (0..n_features).map(|i| data[(i, j)]).sum())
        .collect();
    for (j, &total) in totals.iter().enumerate() {
        if total <= 0.0 {
            return Err(AbundError::DegenerateTimePoint {
                time: time_labels[j].clone(),
            });
        }
    }

    let normalized_cols: Vec<Vec<f64>> = (0..n_times)
        .into_par_iter()
        .map(|j| {
            let total = totals[j];
            (0..n_features).map(|i| data[(i, j)] / total).collect()
        })
        .collect();

    let mut normalized = DMatrix::zeros(n_features, n_times);
    for (j, col) in normalized_cols.iter().enumerate() {
        for (i, &val) in col.iter().enumerate() {
            normalized[(i, j)] = val;
        }
    }

    // Sanity check: each column must sum to 1. Checked per column so a
    // low column cannot hide behind a compensating high one.
    for j in 0..n_times {
        let sum: f64 = (0..n_features).map(|i| normalized[(i, j)]).sum();
        if (sum - 1.0).abs() > PROPORTION_TOL {
            return Err(AbundError::ProportionSum {
                time: time_labels[j].clone(),
                sum,
            });
        }
    }

    Ok(normalized)
}

/// Convert raw read counts to per-time-point proportions.
///
/// # Formula
/// For time point t: p_it = reads_it / sum_i(reads_it)
///
/// # Errors
/// [`AbundError::DegenerateTimePoint`] if any time point has zero total
/// reads; [`AbundError::ProportionSum`] if a normalized column fails the
/// sum-to-1 check.
pub fn to_proportions(reads: &ReadMatrix) -> Result<ProportionMatrix> {
    if reads.n_features() == 0 || reads.n_time_points() == 0 {
        return Err(AbundError::EmptyData(
            "Cannot compute proportions of an empty read matrix".to_string(),
        ));
    }

    let read_totals = reads.col_sums();
    let data = normalize_columns(&reads.to_dense(), reads.time_labels())?;

    Ok(ProportionMatrix {
        data,
        feature_ids: reads.feature_ids().to_vec(),
        time_labels: reads.time_labels().to_vec(),
        read_totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|j| format!("d{}", j)).collect()
    }

    fn create_test_reads() -> ReadMatrix {
        // 3 OTUs × 4 time points, constant 50/30/20 composition
        ReadMatrix::from_rows(
            &[
                vec![50, 100, 25, 500],
                vec![30, 60, 15, 300],
                vec![20, 40, 10, 200],
            ],
            vec!["A".into(), "B".into(), "C".into()],
            labels(4),
        )
        .unwrap()
    }

    #[test]
    fn test_proportions() {
        let reads = create_test_reads();
        let props = to_proportions(&reads).unwrap();

        assert_eq!(props.n_features(), 3);
        assert_eq!(props.n_time_points(), 4);
        for j in 0..4 {
            assert_relative_eq!(props.get(0, j), 0.50, epsilon = 1e-10);
            assert_relative_eq!(props.get(1, j), 0.30, epsilon = 1e-10);
            assert_relative_eq!(props.get(2, j), 0.20, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_column_sums_to_one() {
        let reads = create_test_reads();
        let props = to_proportions(&reads).unwrap();

        for j in 0..props.n_time_points() {
            let col_sum: f64 = (0..props.n_features()).map(|i| props.get(i, j)).sum();
            assert_relative_eq!(col_sum, 1.0, epsilon = PROPORTION_TOL);
        }
    }

    #[test]
    fn test_read_totals() {
        let reads = create_test_reads();
        let props = to_proportions(&reads).unwrap();
        assert_eq!(props.read_totals, vec![100, 200, 50, 1000]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let reads = create_test_reads();
        let time_labels = reads.time_labels().to_vec();

        let once = normalize_columns(&reads.to_dense(), &time_labels).unwrap();
        let twice = normalize_columns(&once, &time_labels).unwrap();

        for i in 0..once.nrows() {
            for j in 0..once.ncols() {
                assert_relative_eq!(twice[(i, j)], once[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_degenerate_time_point() {
        // Time point d1 has zero total reads
        let reads = ReadMatrix::from_rows(
            &[vec![10, 0], vec![5, 0]],
            vec!["A".into(), "B".into()],
            vec!["d0".into(), "d1".into()],
        )
        .unwrap();

        let result = to_proportions(&reads);
        assert!(matches!(
            result,
            Err(AbundError::DegenerateTimePoint { time }) if time == "d1"
        ));
    }

    #[test]
    fn test_no_silent_nan() {
        // Degenerate input must error, never produce NaN output
        let reads = ReadMatrix::from_rows(
            &[vec![0, 3], vec![0, 7]],
            vec!["A".into(), "B".into()],
            vec!["d0".into(), "d1".into()],
        )
        .unwrap();
        assert!(to_proportions(&reads).is_err());
    }

    #[test]
    fn test_empty_matrix() {
        let reads = ReadMatrix::from_rows(&[], vec![], vec![]);
        // Empty matrices are rejected at construction or at conversion
        match reads {
            Ok(r) => assert!(to_proportions(&r).is_err()),
            Err(_) => {}
        }
    }

    #[test]
    fn test_single_feature_is_all_ones() {
        let reads = ReadMatrix::from_rows(
            &[vec![7, 3, 19]],
            vec!["A".into()],
            labels(3),
        )
        .unwrap();
        let props = to_proportions(&reads).unwrap();
        for j in 0..3 {
            assert_relative_eq!(props.get(0, j), 1.0, epsilon = 1e-12);
        }
    }
}
