//! Preprocessing configuration

use super::{HandleUnknown, ImputeStrategy, ScalerType};
use crate::schema::IMPUTED_COLUMN;
use serde::{Deserialize, Serialize};

/// Configuration for cleaning and feature transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Columns whose missing values are imputed before incomplete rows are dropped
    pub impute_columns: Vec<String>,

    /// Strategy for filling those columns
    pub impute_strategy: ImputeStrategy,

    /// Type of scaler to use for numeric features
    pub scaler_type: ScalerType,

    /// Treatment of categories unseen during fit
    pub handle_unknown: HandleUnknown,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            impute_columns: vec![IMPUTED_COLUMN.to_string()],
            impute_strategy: ImputeStrategy::Mean,
            scaler_type: ScalerType::Standard,
            handle_unknown: HandleUnknown::Ignore,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the scaler type
    pub fn with_scaler(mut self, scaler_type: ScalerType) -> Self {
        self.scaler_type = scaler_type;
        self
    }

    /// Builder method to set the impute strategy
    pub fn with_impute_strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.impute_strategy = strategy;
        self
    }

    /// Builder method to set which columns are imputed
    pub fn with_impute_columns(mut self, columns: Vec<String>) -> Self {
        self.impute_columns = columns;
        self
    }

    /// Builder method to set unknown-category handling
    pub fn with_handle_unknown(mut self, handle_unknown: HandleUnknown) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }
}
