//! Per-mouse orchestration: convert, standardize, bundle.

use crate::convert::convert;
use crate::data::{MouseAbundance, MouseDataset, MouseRecord};
use crate::error::{AbundError, Result};
use crate::standardize::standardize_estimate;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// A mouse whose processing failed, with the reason.
#[derive(Debug)]
pub struct MouseFailure {
    /// Mouse identifier.
    pub id: String,
    /// What went wrong for this mouse.
    pub error: AbundError,
}

/// Outcome of processing a whole dataset.
///
/// A failing mouse never aborts the run; its error lands in `failures`
/// and every other mouse is processed normally.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// Successfully processed mice, keyed by id.
    pub mice: BTreeMap<String, MouseAbundance>,
    /// Mice whose processing failed.
    pub failures: Vec<MouseFailure>,
}

impl ProcessOutcome {
    /// Number of successfully processed mice.
    pub fn n_processed(&self) -> usize {
        self.mice.len()
    }

    /// Number of failed mice.
    pub fn n_failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every mouse was processed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Look up a processed mouse by id.
    pub fn get(&self, id: &str) -> Result<&MouseAbundance> {
        self.mice
            .get(id)
            .ok_or_else(|| AbundError::MissingMouse(id.to_string()))
    }
}

/// Process one mouse: convert reads to absolute abundance and standardize.
///
/// Any error is wrapped with the mouse id so failures name the offending
/// mouse.
pub fn process_mouse(id: &str, record: &MouseRecord) -> Result<MouseAbundance> {
    let estimate = convert(&record.reads, &record.qpcr).map_err(|e| e.for_mouse(id))?;
    let standardized = standardize_estimate(&estimate).map_err(|e| e.for_mouse(id))?;

    Ok(MouseAbundance {
        otus: record.reads.feature_ids().to_vec(),
        times: record.reads.time_labels().to_vec(),
        reads: record.reads.clone(),
        qpcr: record.qpcr.clone(),
        estimate,
        standardized,
    })
}

/// Process every mouse in a dataset, in parallel.
///
/// Mice are independent, so the fan-out is safe; results come back in id
/// order regardless of completion order.
pub fn process_dataset(dataset: &MouseDataset) -> ProcessOutcome {
    let entries: Vec<(&String, &MouseRecord)> = dataset.iter().collect();
    let results: Vec<(String, Result<MouseAbundance>)> = entries
        .into_par_iter()
        .map(|(id, record)| (id.clone(), process_mouse(id, record)))
        .collect();

    let mut outcome = ProcessOutcome::default();
    for (id, result) in results {
        match result {
            Ok(bundle) => {
                outcome.mice.insert(id, bundle);
            }
            Err(error) => outcome.failures.push(MouseFailure { id, error }),
        }
    }
    outcome
}
