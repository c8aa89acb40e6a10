//! Data structures for abundance estimation.

mod bundle;
mod dataset;
mod qpcr;
mod read_matrix;

pub use bundle::MouseAbundance;
pub use dataset::{DatasetManifest, MouseDataset, MouseEntry, MouseRecord};
pub use qpcr::QpcrCalibration;
pub use read_matrix::ReadMatrix;

use crate::error::Result;
use nalgebra::DMatrix;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a dense labeled matrix as TSV: one header row of time labels,
/// then one row per feature.
pub(crate) fn write_matrix_tsv<P: AsRef<Path>>(
    path: P,
    data: &DMatrix<f64>,
    feature_ids: &[String],
    time_labels: &[String],
) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write!(writer, "otu_id")?;
    for label in time_labels {
        write!(writer, "\t{}", label)?;
    }
    writeln!(writer)?;

    for (i, feature_id) in feature_ids.iter().enumerate() {
        write!(writer, "{}", feature_id)?;
        for j in 0..data.ncols() {
            write!(writer, "\t{}", data[(i, j)])?;
        }
        writeln!(writer)?;
    }

    Ok(())
}
