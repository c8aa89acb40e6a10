//! qPCR calibration data: absolute total-abundance measurements per time point.

use crate::error::{AbundError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One qPCR measurement row as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QpcrRecord {
    time: String,
    mean: f64,
    std: f64,
}

/// Per-time-point qPCR calibration for one mouse.
///
/// Each time point carries an independent measurement of total absolute
/// abundance: a mean and its standard deviation. Rows here correspond to
/// the read matrix's columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpcrCalibration {
    /// Time point labels, in measurement order.
    time_labels: Vec<String>,
    /// Calibration mean per time point.
    means: Vec<f64>,
    /// Calibration standard deviation per time point.
    stds: Vec<f64>,
}

impl QpcrCalibration {
    /// Create a calibration table, validating the measurement values.
    ///
    /// Means must be positive (a qPCR total of zero or less is not a
    /// usable calibration), stds must be non-negative, and all values
    /// must be finite.
    pub fn new(time_labels: Vec<String>, means: Vec<f64>, stds: Vec<f64>) -> Result<Self> {
        if means.len() != time_labels.len() {
            return Err(AbundError::DimensionMismatch {
                expected: time_labels.len(),
                actual: means.len(),
            });
        }
        if stds.len() != time_labels.len() {
            return Err(AbundError::DimensionMismatch {
                expected: time_labels.len(),
                actual: stds.len(),
            });
        }
        if time_labels.is_empty() {
            return Err(AbundError::EmptyData(
                "Calibration table has no time points".to_string(),
            ));
        }

        for (i, (&mean, &std)) in means.iter().zip(stds.iter()).enumerate() {
            if !mean.is_finite() || !std.is_finite() {
                return Err(AbundError::Numerical(format!(
                    "Non-finite calibration value at time point '{}'",
                    time_labels[i]
                )));
            }
            if mean <= 0.0 {
                return Err(AbundError::InvalidParameter(format!(
                    "Calibration mean at time point '{}' must be positive, got {}",
                    time_labels[i], mean
                )));
            }
            if std < 0.0 {
                return Err(AbundError::InvalidParameter(format!(
                    "Calibration std at time point '{}' must be non-negative, got {}",
                    time_labels[i], std
                )));
            }
        }

        Ok(Self {
            time_labels,
            means,
            stds,
        })
    }

    /// Load a calibration table from a CSV file.
    ///
    /// Expected columns: `time,mean,std` with a header row.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);

        let mut time_labels = Vec::new();
        let mut means = Vec::new();
        let mut stds = Vec::new();
        for record in reader.deserialize() {
            let record: QpcrRecord = record?;
            time_labels.push(record.time);
            means.push(record.mean);
            stds.push(record.std);
        }

        Self::new(time_labels, means, stds)
    }

    /// Write the calibration table to a CSV file.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for i in 0..self.n_time_points() {
            writer.serialize(QpcrRecord {
                time: self.time_labels[i].clone(),
                mean: self.means[i],
                std: self.stds[i],
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Number of time points.
    #[inline]
    pub fn n_time_points(&self) -> usize {
        self.time_labels.len()
    }

    /// Time point labels.
    #[inline]
    pub fn time_labels(&self) -> &[String] {
        &self.time_labels
    }

    /// Calibration means, one per time point.
    #[inline]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Calibration standard deviations, one per time point.
    #[inline]
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Calibration (mean, std) for one time point.
    #[inline]
    pub fn get(&self, time: usize) -> (f64, f64) {
        (self.means[time], self.stds[time])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_calibration() -> QpcrCalibration {
        QpcrCalibration::new(
            vec!["d0".into(), "d1".into(), "d2".into()],
            vec![1.2e9, 3.4e9, 2.1e9],
            vec![1.5e8, 2.0e8, 9.0e7],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let qpcr = create_test_calibration();
        assert_eq!(qpcr.n_time_points(), 3);
        assert_eq!(qpcr.get(1), (3.4e9, 2.0e8));
        assert_eq!(qpcr.time_labels()[2], "d2");
    }

    #[test]
    fn test_length_mismatch() {
        let result = QpcrCalibration::new(
            vec!["d0".into(), "d1".into()],
            vec![1.0],
            vec![0.1, 0.2],
        );
        assert!(matches!(
            result,
            Err(AbundError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_nonpositive_mean() {
        let result = QpcrCalibration::new(vec!["d0".into()], vec![0.0], vec![0.1]);
        assert!(matches!(result, Err(AbundError::InvalidParameter(_))));

        let result = QpcrCalibration::new(vec!["d0".into()], vec![-5.0], vec![0.1]);
        assert!(matches!(result, Err(AbundError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_negative_std() {
        let result = QpcrCalibration::new(vec!["d0".into()], vec![10.0], vec![-0.1]);
        assert!(matches!(result, Err(AbundError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_non_finite() {
        let result = QpcrCalibration::new(vec!["d0".into()], vec![f64::NAN], vec![0.1]);
        assert!(matches!(result, Err(AbundError::Numerical(_))));
    }

    #[test]
    fn test_csv_roundtrip() {
        let qpcr = create_test_calibration();

        let temp_file = NamedTempFile::new().unwrap();
        qpcr.to_csv(temp_file.path()).unwrap();

        let loaded = QpcrCalibration::from_csv(temp_file.path()).unwrap();
        assert_eq!(loaded.time_labels(), qpcr.time_labels());
        assert_eq!(loaded.means(), qpcr.means());
        assert_eq!(loaded.stds(), qpcr.stds());
    }

    #[test]
    fn test_csv_parse() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "time,mean,std").unwrap();
        writeln!(temp_file, "d0,1e9,1e8").unwrap();
        writeln!(temp_file, "d1,2e9,2e8").unwrap();
        temp_file.flush().unwrap();

        let qpcr = QpcrCalibration::from_csv(temp_file.path()).unwrap();
        assert_eq!(qpcr.n_time_points(), 2);
        assert_eq!(qpcr.means(), &[1e9, 2e9]);
    }
}
