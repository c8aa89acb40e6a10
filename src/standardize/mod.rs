//! Per-feature standardization (z-scoring) across time.

use crate::convert::AbundanceEstimate;
use crate::error::{AbundError, Result};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A row-standardized matrix with the statistics used to produce it.
///
/// Each row (feature) has been centered by its own mean across time and
/// scaled by its own population standard deviation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardizedMatrix {
    /// The standardized data (features × time points).
    #[serde(skip)]
    pub data: DMatrix<f64>,
    /// Feature (OTU) identifiers.
    pub feature_ids: Vec<String>,
    /// Time point labels.
    pub time_labels: Vec<String>,
    /// Per-feature means across time, before centering.
    pub row_means: Vec<f64>,
    /// Per-feature population standard deviations across time.
    pub row_stds: Vec<f64>,
}

impl StandardizedMatrix {
    /// Get the standardized value for a feature at a time point.
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

    /// Get a feature's standardized trajectory.
    pub fn row(&self, feature: usize) -> Vec<f64> {
        self.data.row(feature).iter().cloned().collect()
    }

    /// Get reference to the underlying matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Write the standardized matrix to a TSV file.
    pub fn to_tsv<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        crate::data::write_matrix_tsv(path, &self.data, &self.feature_ids, &self.time_labels)
    }
}

/// Standardize each row of a matrix across time.
///
/// # Formula
/// For feature i at time t: z_it = (x_it − mean_i) / std_i
///
/// where mean and std are taken over the feature's row and std is the
/// population estimator (divide by n, not n−1).
///
/// # Errors
/// [`AbundError::ConstantFeature`] if any row has zero variance, named by
/// its feature id and detected before any division happens.
pub fn standardize(
    data: &DMatrix<f64>,
    feature_ids: Vec<String>,
    time_labels: Vec<String>,
) -> Result<StandardizedMatrix> {
    let (n_features, n_times) = data.shape();

    if n_features == 0 || n_times == 0 {
        return Err(AbundError::EmptyData(
            "Cannot standardize an empty matrix".to_string(),
        ));
    }
    if feature_ids.len() != n_features {
        return Err(AbundError::DimensionMismatch {
            expected: n_features,
            actual: feature_ids.len(),
        });
    }
    if time_labels.len() != n_times {
        return Err(AbundError::DimensionMismatch {
            expected: n_times,
            actual: time_labels.len(),
        });
    }

    // Per-row mean and population std
    let stats: Vec<(f64, f64)> = (0..n_features)
        .into_par_iter()
        .map(|i| {
            let mean = (0..n_times).map(|j| data[(i, j)]).sum::<f64>() / n_times as f64;
            let variance = (0..n_times)
                .map(|j| {
                    let diff = data[(i, j)] - mean;
                    diff * diff
                })
                .sum::<f64>()
                / n_times as f64;
            (mean, variance.sqrt())
        })
        .collect();

    // A constant row has exactly zero variance; reject before dividing
    for (i, &(_, sd)) in stats.iter().enumerate() {
        if sd == 0.0 {
            return Err(AbundError::ConstantFeature {
                feature: feature_ids[i].clone(),
            });
        }
    }

    let mut standardized = DMatrix::zeros(n_features, n_times);
    for i in 0..n_features {
        let (mean, sd) = stats[i];
        for j in 0..n_times {
            standardized[(i, j)] = (data[(i, j)] - mean) / sd;
        }
    }

    let (row_means, row_stds) = stats.into_iter().unzip();

    Ok(StandardizedMatrix {
        data: standardized,
        feature_ids,
        time_labels,
        row_means,
        row_stds,
    })
}

/// Standardize an abundance estimate's absolute-mean matrix.
pub fn standardize_estimate(estimate: &AbundanceEstimate) -> Result<StandardizedMatrix> {
    standardize(
        &estimate.absolute_mean,
        estimate.feature_ids().to_vec(),
        estimate.time_labels().to_vec(),
    )
}
