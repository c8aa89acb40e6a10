//! Per-mouse result bundle.

use crate::convert::AbundanceEstimate;
use crate::data::{QpcrCalibration, ReadMatrix};
use crate::error::Result;
use crate::standardize::StandardizedMatrix;
use std::path::Path;

/// Everything derived for one mouse, plus the inputs it came from.
#[derive(Debug, Clone)]
pub struct MouseAbundance {
    /// Feature (OTU) identifiers, pass-through metadata.
    pub otus: Vec<String>,
    /// Time point labels, pass-through metadata.
    pub times: Vec<String>,
    /// Raw read counts.
    pub reads: ReadMatrix,
    /// qPCR calibration used for the conversion.
    pub qpcr: QpcrCalibration,
    /// Absolute abundance estimate (mean, std, proportions).
    pub estimate: AbundanceEstimate,
    /// Row-standardized absolute means.
    pub standardized: StandardizedMatrix,
}

impl MouseAbundance {
    /// Write all derived tables for this mouse into a directory.
    ///
    /// Produces `<id>_reads.tsv`, `<id>_qpcr.csv`, `<id>_proportions.tsv`,
    /// `<id>_absolute_mean.tsv`, `<id>_absolute_std.tsv` and
    /// `<id>_standardized.tsv`.
    pub fn write_dir<P: AsRef<Path>>(&self, dir: P, id: &str) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        self.reads.to_tsv(dir.join(format!("{}_reads.tsv", id)))?;
        self.qpcr.to_csv(dir.join(format!("{}_qpcr.csv", id)))?;
        self.estimate
            .proportions
            .to_tsv(dir.join(format!("{}_proportions.tsv", id)))?;
        self.estimate
            .mean_to_tsv(dir.join(format!("{}_absolute_mean.tsv", id)))?;
        self.estimate
            .std_to_tsv(dir.join(format!("{}_absolute_std.tsv", id)))?;
        self.standardized
            .to_tsv(dir.join(format!("{}_standardized.tsv", id)))?;
        Ok(())
    }
}
