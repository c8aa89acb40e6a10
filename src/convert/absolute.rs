//! Absolute abundance estimation from proportions and qPCR calibration.

use crate::convert::proportions::{to_proportions, ProportionMatrix};
use crate::data::{QpcrCalibration, ReadMatrix};
use crate::error::{AbundError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Absolute abundance estimate for one mouse.
///
/// Holds the mean and standard-deviation bands obtained by scaling each
/// time point's composition by that time point's qPCR calibration, along
/// with the proportions they were derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbundanceEstimate {
    /// Absolute abundance means (features × time points).
    #[serde(skip)]
    pub absolute_mean: DMatrix<f64>,
    /// Absolute abundance standard deviations (features × time points).
    #[serde(skip)]
    pub absolute_std: DMatrix<f64>,
    /// The proportions the estimate was derived from.
    pub proportions: ProportionMatrix,
}

impl AbundanceEstimate {
    /// Absolute mean abundance for a feature at a time point.
    pub fn mean(&self, feature: usize, time: usize) -> f64 {
        self.absolute_mean[(feature, time)]
    }

    /// Absolute abundance standard deviation for a feature at a time point.
    pub fn std(&self, feature: usize, time: usize) -> f64 {
        self.absolute_std[(feature, time)]
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.absolute_mean.nrows()
    }

    /// Number of time points.
    pub fn n_time_points(&self) -> usize {
        self.absolute_mean.ncols()
    }

    /// Feature (OTU) identifiers.
    pub fn feature_ids(&self) -> &[String] {
        &self.proportions.feature_ids
    }

    /// Time point labels.
    pub fn time_labels(&self) -> &[String] {
        &self.proportions.time_labels
    }

    /// Write the absolute-mean matrix to a TSV file.
    pub fn mean_to_tsv<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        crate::data::write_matrix_tsv(
            path,
            &self.absolute_mean,
            self.feature_ids(),
            self.time_labels(),
        )
    }

    /// Write the absolute-std matrix to a TSV file.
    pub fn std_to_tsv<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        crate::data::write_matrix_tsv(
            path,
            &self.absolute_std,
            self.feature_ids(),
            self.time_labels(),
        )
    }
}

/// Convert raw read counts to absolute abundance estimates.
///
/// The read counts are first rescaled to per-time-point proportions, then
/// each time point's composition is multiplied by that time point's qPCR
/// calibration mean (for the abundance estimate) and standard deviation
/// (for the uncertainty band).
///
/// # Formula
/// For feature i at time t:
///   mean_it = p_it × qpcr_mean_t
///   std_it  = p_it × qpcr_std_t
///
/// # Errors
/// [`AbundError::DimensionMismatch`] if the calibration has a different
/// number of time points than the reads; [`AbundError::TimePointMismatch`]
/// if their labels disagree; plus everything [`to_proportions`] reports.
pub fn convert(reads: &ReadMatrix, qpcr: &QpcrCalibration) -> Result<AbundanceEstimate> {
    if qpcr.n_time_points() != reads.n_time_points() {
        return Err(AbundError::DimensionMismatch {
            expected: reads.n_time_points(),
            actual: qpcr.n_time_points(),
        });
    }
    for (j, (r, q)) in reads
        .time_labels()
        .iter()
        .zip(qpcr.time_labels().iter())
        .enumerate()
    {
        if r != q {
            return Err(AbundError::TimePointMismatch(format!(
                "reads have '{}' where calibration has '{}' at position {}",
                r, q, j
            )));
        }
    }

    let proportions = to_proportions(reads)?;
    let n_features = proportions.n_features();
    let n_times = proportions.n_time_points();

    let mut absolute_mean = DMatrix::zeros(n_features, n_times);
    let mut absolute_std = DMatrix::zeros(n_features, n_times);
    for j in 0..n_times {
        let (cal_mean, cal_std) = qpcr.get(j);
        for i in 0..n_features {
            let p = proportions.data[(i, j)];
            absolute_mean[(i, j)] = p * cal_mean;
            absolute_std[(i, j)] = p * cal_std;
        }
    }

    Ok(AbundanceEstimate {
        absolute_mean,
        absolute_std,
        proportions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_by_two() -> (ReadMatrix, QpcrCalibration) {
        let reads = ReadMatrix::from_rows(
            &[vec![2, 0], vec![2, 4]],
            vec!["A".into(), "B".into()],
            vec!["d0".into(), "d1".into()],
        )
        .unwrap();
        let qpcr = QpcrCalibration::new(
            vec!["d0".into(), "d1".into()],
            vec![10.0, 20.0],
            vec![1.0, 2.0],
        )
        .unwrap();
        (reads, qpcr)
    }

    #[test]
    fn test_known_scenario() {
        let (reads, qpcr) = two_by_two();
        let estimate = convert(&reads, &qpcr).unwrap();

        // proportions [[0.5, 0], [0.5, 1]]
        assert_relative_eq!(estimate.proportions.get(0, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(estimate.proportions.get(0, 1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.proportions.get(1, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(estimate.proportions.get(1, 1), 1.0, epsilon = 1e-12);

        // absolute mean [[5, 0], [5, 20]]
        assert_relative_eq!(estimate.mean(0, 0), 5.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.mean(0, 1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.mean(1, 0), 5.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.mean(1, 1), 20.0, epsilon = 1e-12);

        // absolute std [[0.5, 0], [0.5, 2]]
        assert_relative_eq!(estimate.std(0, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(estimate.std(0, 1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(estimate.std(1, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(estimate.std(1, 1), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_is_scaled_proportions() {
        let (reads, qpcr) = two_by_two();
        let estimate = convert(&reads, &qpcr).unwrap();

        for j in 0..estimate.n_time_points() {
            let (cal_mean, cal_std) = qpcr.get(j);
            for i in 0..estimate.n_features() {
                let p = estimate.proportions.get(i, j);
                assert_relative_eq!(estimate.mean(i, j), p * cal_mean, epsilon = 1e-12);
                assert_relative_eq!(estimate.std(i, j), p * cal_std, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_time_point_count_mismatch() {
        let (reads, _) = two_by_two();
        let qpcr = QpcrCalibration::new(vec!["d0".into()], vec![10.0], vec![1.0]).unwrap();

        let result = convert(&reads, &qpcr);
        assert!(matches!(
            result,
            Err(AbundError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_time_label_mismatch() {
        let (reads, _) = two_by_two();
        let qpcr = QpcrCalibration::new(
            vec!["d0".into(), "d7".into()],
            vec![10.0, 20.0],
            vec![1.0, 2.0],
        )
        .unwrap();

        let result = convert(&reads, &qpcr);
        assert!(matches!(result, Err(AbundError::TimePointMismatch(_))));
    }

    #[test]
    fn test_degenerate_column_propagates() {
        let reads = ReadMatrix::from_rows(
            &[vec![2, 0], vec![2, 0]],
            vec!["A".into(), "B".into()],
            vec!["d0".into(), "d1".into()],
        )
        .unwrap();
        let qpcr = QpcrCalibration::new(
            vec!["d0".into(), "d1".into()],
            vec![10.0, 20.0],
            vec![1.0, 2.0],
        )
        .unwrap();

        let result = convert(&reads, &qpcr);
        assert!(matches!(
            result,
            Err(AbundError::DegenerateTimePoint { time }) if time == "d1"
        ));
    }
}
