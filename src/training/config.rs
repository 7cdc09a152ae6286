//! Training configuration

use crate::error::{PlacementError, Result};
use crate::preprocessing::PreprocessingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-class weighting of the classifier loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Weight each class by `n_samples / (n_classes * n_class_samples)`
    Balanced,
    /// Every sample weighs 1
    None,
}

/// Optimizer used to fit the logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Solver {
    /// Newton-Raphson on the penalized log-loss
    Newton,
    /// Full-batch gradient descent with a fixed step
    GradientDescent { learning_rate: f64 },
}

/// Configuration for a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Seed for the stratified shuffle
    pub random_state: u64,
    /// Inverse L2 regularization strength
    pub c: f64,
    /// Maximum solver iterations
    pub max_iter: usize,
    /// Convergence tolerance on the parameter update
    pub tol: f64,
    pub class_weight: ClassWeight,
    pub solver: Solver,
    pub preprocessing: PreprocessingConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            c: 1.0,
            max_iter: 1000,
            tol: 1e-6,
            class_weight: ClassWeight::Balanced,
            solver: Solver::Newton,
            preprocessing: PreprocessingConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; absent fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PlacementError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            PlacementError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// Reject values the trainer cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(invalid("test_size", self.test_size, "must be in (0, 1)"));
        }
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(invalid("c", self.c, "must be positive and finite"));
        }
        if self.max_iter == 0 {
            return Err(invalid("max_iter", self.max_iter, "must be at least 1"));
        }
        if !(self.tol > 0.0) {
            return Err(invalid("tol", self.tol, "must be positive"));
        }
        if let Solver::GradientDescent { learning_rate } = self.solver {
            if !(learning_rate > 0.0) {
                return Err(invalid("learning_rate", learning_rate, "must be positive"));
            }
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl ToString, reason: &str) -> PlacementError {
    PlacementError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
