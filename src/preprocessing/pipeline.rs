//! Column transformer: scaled numeric block followed by one-hot categorical block

use super::{
    config::PreprocessingConfig,
    encoder::OneHotEncoder,
    scaler::Scaler,
    ColumnType,
};
use crate::error::{PlacementError, Result};
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Fitted mapping from a feature frame to the classifier's input matrix.
///
/// Output layout is `[numeric columns (scaled) | categorical indicators]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    scaler: Scaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl ColumnTransformer {
    /// Create an unfitted transformer for the given categorical columns.
    /// Every other numeric column of the frame seen at fit time is scaled.
    pub fn new(config: &PreprocessingConfig, categorical_columns: &[&str]) -> Self {
        Self {
            numeric_columns: Vec::new(),
            categorical_columns: categorical_columns.iter().map(|s| s.to_string()).collect(),
            scaler: Scaler::new(config.scaler_type.clone()),
            encoder: OneHotEncoder::new(config.handle_unknown),
            is_fitted: false,
        }
    }

    /// Scale every non-categorical column, then fit scaler and encoder.
    ///
    /// A non-categorical column that is not numeric is a data error.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();

        for col in &self.categorical_columns {
            if df.column(col).is_err() {
                return Err(PlacementError::MissingColumn(col.clone()));
            }
        }

        self.numeric_columns.clear();
        for c in df.get_columns() {
            if self.categorical_columns.iter().any(|cat| cat.as_str() == c.name().as_str()) {
                continue;
            }
            if ColumnType::of(c.dtype()) != ColumnType::Numeric {
                return Err(PlacementError::DataError(format!(
                    "column '{}' is neither numeric nor categorical ({})",
                    c.name(),
                    c.dtype()
                )));
            }
            self.numeric_columns.push(c.name().to_string());
        }

        let numeric: Vec<&str> = self.numeric_columns.iter().map(String::as_str).collect();
        let categorical: Vec<&str> = self.categorical_columns.iter().map(String::as_str).collect();

        self.scaler.fit(df, &numeric)?;
        self.encoder.fit(df, &categorical)?;
        self.is_fitted = true;

        debug!(
            numeric = self.numeric_columns.len(),
            categorical = self.categorical_columns.len(),
            output_features = self.n_output_features(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fitted column transformer"
        );
        Ok(self)
    }

    /// Transform a frame into the feature matrix.
    ///
    /// Fails with a schema mismatch if any fitted column is absent; extra columns are ignored.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PlacementError::ModelNotFitted);
        }

        let missing: Vec<&str> = self
            .input_columns()
            .into_iter()
            .filter(|c| df.column(c).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(PlacementError::SchemaMismatch(format!(
                "missing column(s): {}",
                missing.join(", ")
            )));
        }

        let numeric = self.scaler.transform(df)?;
        let categorical = self.encoder.transform(df)?;
        Ok(concatenate(Axis(1), &[numeric.view(), categorical.view()])?)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Columns the transformer reads, numeric first
    pub fn input_columns(&self) -> Vec<&str> {
        self.numeric_columns
            .iter()
            .chain(self.categorical_columns.iter())
            .map(String::as_str)
            .collect()
    }

    /// Names of the output features, `num__<col>` / `cat__<col>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric_columns
            .iter()
            .map(|c| format!("num__{}", c))
            .chain(self.encoder.feature_names().into_iter().map(|c| format!("cat__{}", c)))
            .collect()
    }

    pub fn n_output_features(&self) -> usize {
        self.numeric_columns.len() + self.encoder.n_output_features()
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Fitted categories for a categorical column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.encoder.categories(column)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
