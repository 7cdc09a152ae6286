//! Model serialization utilities

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{PlacementError, Result};

/// Descriptive metadata stored next to the model payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,
    /// Version of the crate that wrote the artifact
    pub crate_version: String,
    /// Training timestamp (RFC 3339)
    pub trained_at: String,
    /// Input columns the model reads
    pub input_columns: Vec<String>,
    /// Feature names after transformation
    pub feature_names: Vec<String>,
    /// Target name
    pub target_name: String,
    /// Model type
    pub model_type: String,
    /// Hyperparameters
    pub hyperparameters: BTreeMap<String, String>,
    /// Training metrics
    pub metrics: BTreeMap<String, f64>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "model".to_string(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: String::new(),
            input_columns: Vec::new(),
            feature_names: Vec::new(),
            target_name: "target".to_string(),
            model_type: "unknown".to_string(),
            hyperparameters: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }
}

impl ModelMetadata {
    /// Create new metadata with name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set model type
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    /// Set input columns
    pub fn with_input_columns(mut self, columns: Vec<String>) -> Self {
        self.input_columns = columns;
        self
    }

    /// Set transformed feature names
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    /// Set target name
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_name = target.into();
        self
    }

    /// Stamp with the current time
    pub fn stamped_now(mut self) -> Self {
        self.trained_at = chrono::Utc::now().to_rfc3339();
        self
    }

    /// Add hyperparameter
    pub fn add_hyperparameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.hyperparameters.insert(key.into(), value.to_string());
        self
    }

    /// Add or replace a metric
    pub fn set_metric(&mut self, key: impl Into<String>, value: f64) {
        self.metrics.insert(key.into(), value);
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
}

/// On-disk envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedModel {
    /// Magic bytes for format detection
    magic: [u8; 4],
    metadata: ModelMetadata,
    /// bincode-encoded model
    model_data: Vec<u8>,
    /// Checksum for integrity verification
    checksum: u64,
}

impl SerializedModel {
    /// Magic bytes for placement model files
    const MAGIC: [u8; 4] = [b'P', b'L', b'C', b'M'];

    fn new(metadata: ModelMetadata, model_data: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(&model_data);
        Self {
            magic: Self::MAGIC,
            metadata,
            model_data,
            checksum,
        }
    }

    /// Compute checksum using FNV-1a hash
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    fn verify(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(PlacementError::CorruptArtifact(
                "unrecognized file header".to_string(),
            ));
        }
        if Self::compute_checksum(&self.model_data) != self.checksum {
            return Err(PlacementError::CorruptArtifact(
                "checksum verification failed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Encode a model and its metadata as artifact bytes
pub fn to_artifact_bytes<M: Serialize>(model: &M, metadata: ModelMetadata) -> Result<Vec<u8>> {
    let model_data = bincode::serialize(model)?;
    let serialized = SerializedModel::new(metadata, model_data);
    Ok(bincode::serialize(&serialized)?)
}

/// Decode artifact bytes, verifying header and checksum
pub fn from_artifact_bytes<M: DeserializeOwned>(bytes: &[u8]) -> Result<(M, ModelMetadata)> {
    let serialized: SerializedModel = bincode::deserialize(bytes)
        .map_err(|e| PlacementError::CorruptArtifact(format!("unreadable envelope: {}", e)))?;
    serialized.verify()?;

    let model: M = bincode::deserialize(&serialized.model_data)
        .map_err(|e| PlacementError::CorruptArtifact(format!("unreadable model payload: {}", e)))?;
    Ok((model, serialized.metadata))
}

/// Save a serializable model to file
pub fn save_model<M: Serialize>(
    model: &M,
    path: impl AsRef<Path>,
    metadata: ModelMetadata,
) -> Result<()> {
    let bytes = to_artifact_bytes(model, metadata)?;

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;

    Ok(())
}

/// Load a model from file
pub fn load_model<M: DeserializeOwned>(path: impl AsRef<Path>) -> Result<(M, ModelMetadata)> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    from_artifact_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Toy {
        weights: Vec<f64>,
        bias: f64,
    }

    fn toy() -> Toy {
        Toy {
            weights: vec![0.1, -2.5, 3.75],
            bias: 0.3,
        }
    }

    #[test]
    fn test_bytes_roundtrip() {
        let meta = ModelMetadata::new("toy").add_hyperparameter("c", 1.0);
        let bytes = to_artifact_bytes(&toy(), meta.clone()).unwrap();
        let (model, loaded_meta): (Toy, ModelMetadata) = from_artifact_bytes(&bytes).unwrap();
        assert_eq!(model, toy());
        assert_eq!(loaded_meta, meta);
    }

    #[test]
    fn test_file_roundtrip() {
        let file = NamedTempFile::new().unwrap();
        save_model(&toy(), file.path(), ModelMetadata::new("toy")).unwrap();
        let (model, meta): (Toy, ModelMetadata) = load_model(file.path()).unwrap();
        assert_eq!(model, toy());
        assert_eq!(meta.name, "toy");
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let mut bytes = to_artifact_bytes(&toy(), ModelMetadata::new("toy")).unwrap();
        // flip a bit inside the trailing payload / checksum area
        let idx = bytes.len() - 12;
        bytes[idx] ^= 0xFF;
        let result: Result<(Toy, ModelMetadata)> = from_artifact_bytes(&bytes);
        assert!(matches!(result, Err(PlacementError::CorruptArtifact(_))));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let result: Result<(Toy, ModelMetadata)> = from_artifact_bytes(b"definitely not a model");
        assert!(matches!(result, Err(PlacementError::CorruptArtifact(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<(Toy, ModelMetadata)> = load_model("/nonexistent/placement.bin");
        assert!(matches!(result, Err(PlacementError::IoError(_))));
    }
}
