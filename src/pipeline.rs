//! The fitted end-to-end placement pipeline: column transformer + logistic regression

use crate::error::{PlacementError, Result};
use crate::export::{self, ModelMetadata};
use crate::preprocessing::ColumnTransformer;
use crate::schema::{Placement, StudentProfile, CATEGORICAL_COLUMNS, LABEL_COLUMN};
use crate::training::{LogisticRegression, TrainingConfig};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Preprocessing and classifier treated as one callable unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementPipeline {
    transformer: ColumnTransformer,
    classifier: LogisticRegression,
    #[serde(skip)]
    metadata: Option<ModelMetadata>,
}

impl PlacementPipeline {
    /// Fit transformer and classifier on a cleaned feature frame and 0/1 labels
    pub fn fit(features: &DataFrame, labels: &Array1<f64>, config: &TrainingConfig) -> Result<Self> {
        if features.height() != labels.len() {
            return Err(PlacementError::ShapeError {
                expected: format!("{} labels", features.height()),
                actual: format!("{} labels", labels.len()),
            });
        }

        let mut transformer = ColumnTransformer::new(&config.preprocessing, &CATEGORICAL_COLUMNS);
        let x = transformer.fit_transform(features)?;

        let mut classifier = LogisticRegression::new()
            .with_c(config.c)
            .with_max_iter(config.max_iter)
            .with_tol(config.tol)
            .with_solver(config.solver.clone())
            .with_class_weight(config.class_weight);
        classifier.fit(&x, labels)?;

        info!(
            rows = x.nrows(),
            features = x.ncols(),
            iterations = classifier.n_iter,
            "Fitted placement pipeline"
        );

        let metadata = ModelMetadata::new("placement_pipeline")
            .with_model_type("logistic_regression")
            .with_input_columns(transformer.input_columns().iter().map(|s| s.to_string()).collect())
            .with_feature_names(transformer.feature_names())
            .with_target(LABEL_COLUMN)
            .add_hyperparameter("c", config.c)
            .add_hyperparameter("max_iter", config.max_iter)
            .add_hyperparameter("class_weight", format!("{:?}", config.class_weight))
            .add_hyperparameter("solver", format!("{:?}", config.solver))
            .add_hyperparameter("scaler", format!("{:?}", config.preprocessing.scaler_type))
            .stamped_now();

        Ok(Self {
            transformer,
            classifier,
            metadata: Some(metadata),
        })
    }

    /// Probability of placement for each row
    pub fn predict_proba(&self, features: &DataFrame) -> Result<Array1<f64>> {
        let x = self.transformer.transform(features)?;
        self.classifier.predict_proba(&x)
    }

    /// Predicted outcome for each row
    pub fn predict(&self, features: &DataFrame) -> Result<Vec<Placement>> {
        let x = self.transformer.transform(features)?;
        let labels = self.classifier.predict(&x)?;
        Ok(labels.iter().map(|&l| Placement::from_label(l)).collect())
    }

    /// Predicted outcome for one applicant
    pub fn predict_one(&self, profile: &StudentProfile) -> Result<Placement> {
        let (placement, _) = self.predict_one_with_proba(profile)?;
        Ok(placement)
    }

    /// Predicted outcome and placement probability for one applicant
    pub fn predict_one_with_proba(&self, profile: &StudentProfile) -> Result<(Placement, f64)> {
        let frame = profile.to_frame()?;
        let x = self.transformer.transform(&frame)?;
        let label = self.classifier.predict(&x)?;
        let proba = self.classifier.predict_proba(&x)?;

        let (label, proba) = match (label.first(), proba.first()) {
            (Some(&l), Some(&p)) => (l, p),
            _ => {
                return Err(PlacementError::InferenceError(
                    "classifier returned no prediction".to_string(),
                ))
            }
        };
        let placement = Placement::from_label(label);
        debug!(%placement, probability = proba, "Scored applicant");
        Ok((placement, proba))
    }

    /// Accuracy against 0/1 labels
    pub fn score(&self, features: &DataFrame, labels: &Array1<f64>) -> Result<f64> {
        let x = self.transformer.transform(features)?;
        self.classifier.score(&x, labels)
    }

    pub fn transformer(&self) -> &ColumnTransformer {
        &self.transformer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    /// Metadata recorded at fit time or read from the artifact
    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    pub fn metadata_mut(&mut self) -> Option<&mut ModelMetadata> {
        self.metadata.as_mut()
    }

    fn metadata_or_default(&self) -> ModelMetadata {
        self.metadata.clone().unwrap_or_else(|| {
            ModelMetadata::new("placement_pipeline")
                .with_input_columns(self.transformer.input_columns().iter().map(|s| s.to_string()).collect())
                .with_feature_names(self.transformer.feature_names())
        })
    }

    /// Encode as artifact bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        export::to_artifact_bytes(self, self.metadata_or_default())
    }

    /// Decode artifact bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (mut pipeline, metadata): (Self, ModelMetadata) = export::from_artifact_bytes(bytes)?;
        pipeline.metadata = Some(metadata);
        pipeline.check_consistency()?;
        Ok(pipeline)
    }

    /// Write the artifact file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        export::save_model(self, path.as_ref(), self.metadata_or_default())?;
        info!(path = %path.as_ref().display(), "Saved pipeline artifact");
        Ok(())
    }

    /// Read an artifact file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let (mut pipeline, metadata): (Self, ModelMetadata) = export::load_model(path.as_ref())?;
        pipeline.metadata = Some(metadata);
        pipeline.check_consistency()?;
        info!(
            path = %path.as_ref().display(),
            features = pipeline.transformer.n_output_features(),
            "Loaded pipeline artifact"
        );
        Ok(pipeline)
    }

    /// The transformer output width must match the classifier input width
    fn check_consistency(&self) -> Result<()> {
        if !self.transformer.is_fitted() || !self.classifier.is_fitted {
            return Err(PlacementError::CorruptArtifact(
                "artifact holds an unfitted pipeline".to_string(),
            ));
        }
        let expected = self.transformer.n_output_features();
        let actual = self.classifier.coefficients.as_ref().map(|c| c.len()).unwrap_or(0);
        if expected != actual {
            return Err(PlacementError::CorruptArtifact(format!(
                "transformer produces {} features but classifier expects {}",
                expected, actual
            )));
        }
        Ok(())
    }
}
