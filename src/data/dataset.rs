//! Dataset manifest and the unified mouse-id → record mapping.

use crate::data::{QpcrCalibration, ReadMatrix};
use crate::error::{AbundError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One mouse's entry in a dataset manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MouseEntry {
    /// Mouse identifier.
    pub id: String,
    /// Path to the read count TSV.
    pub reads: PathBuf,
    /// Path to the qPCR calibration CSV.
    pub qpcr: PathBuf,
}

/// Dataset manifest describing where each mouse's data lives.
///
/// Relative paths resolve against the manifest file's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    /// Name of the dataset.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Mice in the dataset.
    pub mice: Vec<MouseEntry>,
}

impl DatasetManifest {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(AbundError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(AbundError::from)
    }
}

/// One mouse's loaded input data.
#[derive(Debug, Clone)]
pub struct MouseRecord {
    /// Raw sequencing read counts (features × time points).
    pub reads: ReadMatrix,
    /// qPCR calibration (one row per time point).
    pub qpcr: QpcrCalibration,
}

/// All mice in a dataset, keyed by mouse id.
///
/// A single ordered mapping assembled once at load time; every lookup
/// goes through it regardless of which source file a mouse came from.
#[derive(Debug, Clone, Default)]
pub struct MouseDataset {
    mice: BTreeMap<String, MouseRecord>,
}

impl MouseDataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dataset from a YAML manifest file.
    pub fn load<P: AsRef<Path>>(manifest_path: P) -> Result<Self> {
        let manifest_path = manifest_path.as_ref();
        let yaml = std::fs::read_to_string(manifest_path)?;
        let manifest = DatasetManifest::from_yaml(&yaml)?;
        let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_manifest(&manifest, base_dir)
    }

    /// Load every entry of a manifest, resolving paths against `base_dir`.
    pub fn from_manifest(manifest: &DatasetManifest, base_dir: &Path) -> Result<Self> {
        let mut dataset = Self::new();
        for entry in &manifest.mice {
            let reads = ReadMatrix::from_tsv(base_dir.join(&entry.reads))
                .map_err(|e| e.for_mouse(&entry.id))?;
            let qpcr = QpcrCalibration::from_csv(base_dir.join(&entry.qpcr))
                .map_err(|e| e.for_mouse(&entry.id))?;
            dataset.insert(&entry.id, MouseRecord { reads, qpcr })?;
        }
        Ok(dataset)
    }

    /// Add a mouse record. Duplicate ids are rejected.
    pub fn insert(&mut self, id: &str, record: MouseRecord) -> Result<()> {
        if self.mice.contains_key(id) {
            return Err(AbundError::InvalidParameter(format!(
                "Duplicate mouse id '{}' in dataset",
                id
            )));
        }
        self.mice.insert(id.to_string(), record);
        Ok(())
    }

    /// Look up a mouse by id.
    pub fn get(&self, id: &str) -> Result<&MouseRecord> {
        self.mice
            .get(id)
            .ok_or_else(|| AbundError::MissingMouse(id.to_string()))
    }

    /// Iterate over (id, record) pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MouseRecord)> {
        self.mice.iter()
    }

    /// Mouse ids in order.
    pub fn ids(&self) -> Vec<&str> {
        self.mice.keys().map(|s| s.as_str()).collect()
    }

    /// Number of mice.
    pub fn len(&self) -> usize {
        self.mice.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.mice.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record() -> MouseRecord {
        let reads = ReadMatrix::from_rows(
            &[vec![10, 20], vec![30, 40]],
            vec!["otu_A".into(), "otu_B".into()],
            vec!["d0".into(), "d1".into()],
        )
        .unwrap();
        let qpcr = QpcrCalibration::new(
            vec!["d0".into(), "d1".into()],
            vec![1e9, 2e9],
            vec![1e8, 2e8],
        )
        .unwrap();
        MouseRecord { reads, qpcr }
    }

    #[test]
    fn test_manifest_yaml_roundtrip() {
        let manifest = DatasetManifest {
            name: "mouse-study".to_string(),
            description: Some("Two cages".to_string()),
            mice: vec![
                MouseEntry {
                    id: "2".to_string(),
                    reads: PathBuf::from("mouse2_reads.tsv"),
                    qpcr: PathBuf::from("mouse2_qpcr.csv"),
                },
                MouseEntry {
                    id: "3".to_string(),
                    reads: PathBuf::from("mouse3_reads.tsv"),
                    qpcr: PathBuf::from("mouse3_qpcr.csv"),
                },
            ],
        };

        let yaml = manifest.to_yaml().unwrap();
        let parsed = DatasetManifest::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.name, "mouse-study");
        assert_eq!(parsed.mice.len(), 2);
        assert_eq!(parsed.mice[1].id, "3");
    }

    #[test]
    fn test_lookup() {
        let mut dataset = MouseDataset::new();
        dataset.insert("7", test_record()).unwrap();

        assert!(dataset.get("7").is_ok());
        assert!(matches!(
            dataset.get("8"),
            Err(AbundError::MissingMouse(id)) if id == "8"
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut dataset = MouseDataset::new();
        dataset.insert("7", test_record()).unwrap();
        let result = dataset.insert("7", test_record());
        assert!(matches!(result, Err(AbundError::InvalidParameter(_))));
    }

    #[test]
    fn test_id_ordering() {
        let mut dataset = MouseDataset::new();
        dataset.insert("10", test_record()).unwrap();
        dataset.insert("2", test_record()).unwrap();
        // BTreeMap orders lexicographically
        assert_eq!(dataset.ids(), vec!["10", "2"]);
    }
}
