//! Application state management

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::info;

use crate::error::Result;
use crate::pipeline::PlacementPipeline;

use super::ServerConfig;

/// Lazily loaded, read-only handle to the fitted pipeline.
///
/// The artifact is read at most once; concurrent first callers wait on the
/// init lock and then share the same instance.
pub struct ModelHandle {
    path: PathBuf,
    cell: OnceLock<Arc<PlacementPipeline>>,
    init: Mutex<()>,
}

impl ModelHandle {
    /// Handle that will load the artifact at `path` on first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Handle around an already fitted pipeline
    pub fn preloaded(pipeline: PlacementPipeline) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::new(pipeline));
        Self {
            path: PathBuf::new(),
            cell,
            init: Mutex::new(()),
        }
    }

    /// The pipeline, loading it on the first call
    pub fn get(&self) -> Result<Arc<PlacementPipeline>> {
        if let Some(pipeline) = self.cell.get() {
            return Ok(Arc::clone(pipeline));
        }

        let _guard = self.init.lock();
        if let Some(pipeline) = self.cell.get() {
            return Ok(Arc::clone(pipeline));
        }

        let pipeline = Arc::new(PlacementPipeline::load(&self.path)?);
        info!(path = %self.path.display(), "Model artifact loaded");
        let _ = self.cell.set(Arc::clone(&pipeline));
        Ok(pipeline)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub model: ModelHandle,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let model = ModelHandle::new(config.model_path.clone());
        Self {
            config,
            model,
            started_at: chrono::Utc::now(),
        }
    }

    /// State serving an in-memory pipeline
    pub fn with_pipeline(config: ServerConfig, pipeline: PlacementPipeline) -> Self {
        Self {
            config,
            model: ModelHandle::preloaded(pipeline),
            started_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlacementError;

    #[test]
    fn test_missing_artifact_is_reported_and_not_cached() {
        let handle = ModelHandle::new("/nonexistent/placement_pipeline.bin");
        assert!(matches!(handle.get(), Err(PlacementError::IoError(_))));
        assert!(!handle.is_loaded());
    }
}
