//! qPCR-calibrated absolute abundance estimation for microbiome time series.
//!
//! Sequencing read counts are compositional: a taxon's read count only
//! carries meaning relative to the other taxa sequenced at the same time
//! point. This library combines read counts with an independent qPCR
//! measurement of total abundance to recover absolute abundance
//! estimates, with an uncertainty band from the qPCR standard deviation,
//! plus a per-feature standardized (z-scored) view across time.
//!
//! # Overview
//!
//! - **data**: Core data structures (ReadMatrix, QpcrCalibration,
//!   MouseDataset, MouseAbundance)
//! - **convert**: Read counts → proportions → absolute abundance
//! - **standardize**: Per-feature z-scoring across time
//! - **profile**: Sequencing depth profiling
//! - **assembly**: Per-mouse orchestration over a dataset
//!
//! # Example
//!
//! ```no_run
//! use qpcr_abund::prelude::*;
//!
//! // Load one mouse's data
//! let reads = ReadMatrix::from_tsv("mouse2_reads.tsv").unwrap();
//! let qpcr = QpcrCalibration::from_csv("mouse2_qpcr.csv").unwrap();
//!
//! // Convert to absolute abundance and standardize
//! let estimate = convert(&reads, &qpcr).unwrap();
//! let standardized = standardize_estimate(&estimate).unwrap();
//! ```

pub mod assembly;
pub mod convert;
pub mod data;
pub mod error;
pub mod profile;
pub mod standardize;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::assembly::{process_dataset, process_mouse, MouseFailure, ProcessOutcome};
    pub use crate::convert::{
        convert, normalize_columns, to_proportions, AbundanceEstimate, ProportionMatrix,
        PROPORTION_TOL,
    };
    pub use crate::data::{
        DatasetManifest, MouseAbundance, MouseDataset, MouseEntry, MouseRecord, QpcrCalibration,
        ReadMatrix,
    };
    pub use crate::error::{AbundError, Result};
    pub use crate::profile::{profile_read_depth, ReadDepthProfile};
    pub use crate::standardize::{standardize, standardize_estimate, StandardizedMatrix};
}
