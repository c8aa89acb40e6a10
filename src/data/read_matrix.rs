//! Sparse read count matrix for one mouse's sequencing time series.

use crate::error::{AbundError, Result};
use rayon::prelude::*;
use sprs::{CsMat, TriMat};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Raw sequencing read counts for one mouse.
///
/// Rows represent taxonomic features (OTUs), columns represent time
/// points. Uses CSR (Compressed Sparse Row) format since OTU tables are
/// typically sparse.
#[derive(Debug, Clone)]
pub struct ReadMatrix {
    /// Sparse matrix in CSR format (features × time points)
    data: CsMat<u64>,
    /// Feature (OTU) identifiers (row names)
    feature_ids: Vec<String>,
    /// Time point labels (column names)
    time_labels: Vec<String>,
}

impl ReadMatrix {
    /// Create a new ReadMatrix from a sparse matrix and labels.
    pub fn new(
        data: CsMat<u64>,
        feature_ids: Vec<String>,
        time_labels: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != feature_ids.len() {
            return Err(AbundError::DimensionMismatch {
                expected: nrows,
                actual: feature_ids.len(),
            });
        }
        if ncols != time_labels.len() {
            return Err(AbundError::DimensionMismatch {
                expected: ncols,
                actual: time_labels.len(),
            });
        }
        Ok(Self {
            data,
            feature_ids,
            time_labels,
        })
    }

    /// Load a read matrix from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with time point labels (first column is the
    ///   feature ID header)
    /// - Subsequent rows: feature ID followed by counts
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        // Parse header
        let header_line = lines
            .next()
            .ok_or_else(|| AbundError::EmptyData("Empty TSV file".to_string()))??;
        let header: Vec<&str> = header_line.split('\t').collect();
        if header.len() < 2 {
            return Err(AbundError::EmptyData(
                "TSV must have at least one time point".to_string(),
            ));
        }
        let time_labels: Vec<String> = header[1..].iter().map(|s| s.to_string()).collect();
        let n_times = time_labels.len();

        // Parse data rows into triplets for sparse matrix construction
        let mut triplets: Vec<(usize, usize, u64)> = Vec::new();
        let mut feature_ids: Vec<String> = Vec::new();

        for (row_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.is_empty() {
                continue;
            }

            let feature_id = fields[0].to_string();
            feature_ids.push(feature_id);

            for (col_idx, value_str) in fields[1..].iter().enumerate() {
                if col_idx >= n_times {
                    break;
                }
                let value: u64 = value_str.trim().parse().map_err(|_| AbundError::InvalidCount {
                    value: value_str.to_string(),
                    row: row_idx,
                    col: col_idx,
                })?;
                if value > 0 {
                    triplets.push((row_idx, col_idx, value));
                }
            }
        }

        let n_features = feature_ids.len();
        if n_features == 0 {
            return Err(AbundError::EmptyData("No features in TSV".to_string()));
        }

        // Build sparse matrix from triplets
        let mut tri_mat = TriMat::new((n_features, n_times));
        for (row, col, val) in triplets {
            tri_mat.add_triplet(row, col, val);
        }
        let data: CsMat<u64> = tri_mat.to_csr();

        Self::new(data, feature_ids, time_labels)
    }

    /// Write the read matrix to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Write header
        write!(writer, "otu_id")?;
        for label in &self.time_labels {
            write!(writer, "\t{}", label)?;
        }
        writeln!(writer)?;

        // Write data rows
        for (row_idx, feature_id) in self.feature_ids.iter().enumerate() {
            write!(writer, "{}", feature_id)?;
            for col_idx in 0..self.n_time_points() {
                let value = self.get(row_idx, col_idx);
                write!(writer, "\t{}", value)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    /// Get the count at (feature, time), returning 0 for missing entries.
    #[inline]
    pub fn get(&self, feature: usize, time: usize) -> u64 {
        self.data.get(feature, time).copied().unwrap_or(0)
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.rows()
    }

    /// Number of time points (columns).
    #[inline]
    pub fn n_time_points(&self) -> usize {
        self.data.cols()
    }

    /// Total number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.nnz()
    }

    /// Feature (OTU) identifiers.
    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Time point labels.
    #[inline]
    pub fn time_labels(&self) -> &[String] {
        &self.time_labels
    }

    /// Get the underlying sparse matrix.
    #[inline]
    pub fn data(&self) -> &CsMat<u64> {
        &self.data
    }

    /// Get a dense vector of counts for one feature across time.
    pub fn feature_dense(&self, feature: usize) -> Vec<u64> {
        let mut dense = vec![0u64; self.n_time_points()];
        if let Some(row_vec) = self.data.outer_view(feature) {
            for (col, &val) in row_vec.iter() {
                dense[col] = val;
            }
        }
        dense
    }

    /// Compute row sums (total counts per feature across time).
    pub fn row_sums(&self) -> Vec<u64> {
        (0..self.n_features())
            .into_par_iter()
            .map(|row| {
                self.data
                    .outer_view(row)
                    .map(|v| v.iter().map(|(_, &val)| val).sum())
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Compute column sums (total reads per time point).
    pub fn col_sums(&self) -> Vec<u64> {
        let mut sums = vec![0u64; self.n_time_points()];
        for row_vec in self.data.outer_iterator() {
            for (col, &val) in row_vec.iter() {
                sums[col] += val;
            }
        }
        sums
    }

    /// Convert to a dense matrix (f64).
    pub fn to_dense(&self) -> nalgebra::DMatrix<f64> {
        let mut dense = nalgebra::DMatrix::zeros(self.n_features(), self.n_time_points());
        for (row, row_vec) in self.data.outer_iterator().enumerate() {
            for (col, &val) in row_vec.iter() {
                dense[(row, col)] = val as f64;
            }
        }
        dense
    }

    /// Create from dense integer counts, one row per feature.
    ///
    /// Convenience for tests and synthetic data.
    pub fn from_rows(
        rows: &[Vec<u64>],
        feature_ids: Vec<String>,
        time_labels: Vec<String>,
    ) -> Result<Self> {
        let n_features = rows.len();
        let n_times = rows.first().map(|r| r.len()).unwrap_or(0);
        for row in rows {
            if row.len() != n_times {
                return Err(AbundError::DimensionMismatch {
                    expected: n_times,
                    actual: row.len(),
                });
            }
        }

        let mut tri_mat = TriMat::new((n_features, n_times));
        for (i, row) in rows.iter().enumerate() {
            for (j, &val) in row.iter().enumerate() {
                if val > 0 {
                    tri_mat.add_triplet(i, j, val);
                }
            }
        }

        Self::new(tri_mat.to_csr(), feature_ids, time_labels)
    }
}
