//! Training engine: raw CSV in, fitted pipeline artifact out

use super::split::{class_counts, stratified_split};
use super::TrainingConfig;
use crate::error::{PlacementError, Result};
use crate::pipeline::PlacementPipeline;
use crate::preprocessing::{map_labels, CategoryNormalizer, Imputer};
use crate::schema::{FEATURE_COLUMNS, ID_COLUMN, LABEL_COLUMN, NUMERIC_COLUMNS, SALARY_COLUMN};
use crate::utils::DataLoader;
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Outcome of one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Rows left after cleaning
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    /// Rows per label after cleaning (0 = not placed, 1 = placed)
    pub class_counts: BTreeMap<i64, usize>,
    /// Where the artifact was written, if it was
    pub output_path: Option<PathBuf>,
    pub training_time_secs: f64,
}

/// Cleaned features with their 0/1 labels
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub features: DataFrame,
    pub labels: Array1<f64>,
}

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
    normalizer: CategoryNormalizer,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            normalizer: CategoryNormalizer::placement(),
        }
    }

    /// Replace the spelling rules applied before fitting
    pub fn with_normalizer(mut self, normalizer: CategoryNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load the CSV, fit, evaluate and write the artifact
    pub fn run(
        &self,
        data_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<(PlacementPipeline, TrainingReport)> {
        let df = DataLoader::new().load_csv(data_path.as_ref())?;
        let (pipeline, mut report) = self.fit_frame(&df)?;

        pipeline.save(output_path.as_ref())?;
        report.output_path = Some(output_path.as_ref().to_path_buf());
        Ok((pipeline, report))
    }

    /// Fit and evaluate on an already loaded raw frame
    pub fn fit_frame(&self, raw: &DataFrame) -> Result<(PlacementPipeline, TrainingReport)> {
        self.config.validate()?;
        let start = Instant::now();

        let prepared = self.prepare(raw)?;
        let counts = class_counts(&prepared.labels);
        info!(rows = prepared.features.height(), classes = ?counts, "Prepared training data");

        let split = stratified_split(&prepared.labels, self.config.test_size, self.config.random_state)?;
        let (x_train, y_train) = take_rows(&prepared, &split.train_indices)?;
        let (x_test, y_test) = take_rows(&prepared, &split.test_indices)?;
        debug!(train = x_train.height(), test = x_test.height(), "Split data");

        let mut pipeline = PlacementPipeline::fit(&x_train, &y_train, &self.config)?;
        let train_accuracy = pipeline.score(&x_train, &y_train)?;
        let test_accuracy = pipeline.score(&x_test, &y_test)?;

        if let Some(meta) = pipeline.metadata_mut() {
            meta.set_metric("train_accuracy", train_accuracy);
            meta.set_metric("test_accuracy", test_accuracy);
            meta.set_metric("n_train", x_train.height() as f64);
            meta.set_metric("n_test", x_test.height() as f64);
        }

        let training_time_secs = start.elapsed().as_secs_f64();
        info!(
            train_accuracy,
            test_accuracy,
            elapsed_secs = training_time_secs,
            "Training complete"
        );

        let report = TrainingReport {
            n_rows: prepared.features.height(),
            n_train: x_train.height(),
            n_test: x_test.height(),
            train_accuracy,
            test_accuracy,
            class_counts: counts,
            output_path: None,
            training_time_secs,
        };
        Ok((pipeline, report))
    }

    /// Validate, clean and impute a raw frame, then split off the labels
    pub fn prepare(&self, raw: &DataFrame) -> Result<PreparedData> {
        for column in FEATURE_COLUMNS.iter().chain(std::iter::once(&LABEL_COLUMN)) {
            if raw.column(column).is_err() {
                return Err(PlacementError::MissingColumn(column.to_string()));
            }
        }

        let mut df = raw.clone();
        for column in [ID_COLUMN, SALARY_COLUMN] {
            if df.column(column).is_ok() {
                df = df.drop(column)?;
                debug!(column, "Dropped non-feature column");
            }
        }

        let mut keep: Vec<&str> = FEATURE_COLUMNS.to_vec();
        keep.push(LABEL_COLUMN);
        let mut df = df.select(keep)?;
        for column in NUMERIC_COLUMNS {
            let casted = df.column(column)?.strict_cast(&DataType::Float64).map_err(|_| {
                PlacementError::DataError(format!("column '{}' holds non-numeric values", column))
            })?;
            df.with_column(casted)?;
        }

        let df = self.normalizer.apply(&df)?;
        let df = map_labels(&df, LABEL_COLUMN)?;

        let impute_columns: Vec<&str> = self
            .config
            .preprocessing
            .impute_columns
            .iter()
            .map(String::as_str)
            .collect();
        let mut imputer = Imputer::new(self.config.preprocessing.impute_strategy.clone());
        let df = imputer.fit_transform(&df, &impute_columns)?;
        for column in &impute_columns {
            if let Some(fill) = imputer.fill_value(column) {
                debug!(column, fill, "Imputed missing values");
            }
        }

        let before = df.height();
        let df = df.drop_nulls::<String>(None)?;
        let dropped = before - df.height();
        if dropped > 0 {
            info!(dropped, "Dropped incomplete rows");
        }

        if df.height() == 0 {
            return Err(PlacementError::InsufficientClasses(
                "no complete rows remain after cleaning".to_string(),
            ));
        }

        let labels: Array1<f64> = df
            .column(LABEL_COLUMN)?
            .f64()?
            .into_no_null_iter()
            .collect();
        let features = df.drop(LABEL_COLUMN)?;

        Ok(PreparedData { features, labels })
    }
}

fn take_rows(data: &PreparedData, indices: &[usize]) -> Result<(DataFrame, Array1<f64>)> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    let features = data.features.take(&idx)?;
    let labels = Array1::from_iter(indices.iter().map(|&i| data.labels[i]));
    Ok((features, labels))
}
