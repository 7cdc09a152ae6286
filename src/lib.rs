//! Placement Predictor - student job-placement classifier
//!
//! This crate trains a binary classifier predicting whether a student will be
//! placed from academic and background attributes, persists the fitted
//! pipeline as a single artifact, and serves predictions through a web form,
//! a JSON API and a CLI.
//!
//! # Modules
//!
//! ## Core ML Modules
//! - [`schema`] - Dataset columns, applicant profile and outcome types
//! - [`preprocessing`] - Cleaning, imputation, scaling, one-hot encoding
//! - [`training`] - Stratified split, logistic regression, training engine
//! - [`pipeline`] - The fitted preprocessing + classifier unit
//!
//! ## Services
//! - [`server`] - Web form and JSON API
//! - [`cli`] - Command-line interface
//!
//! ## Utilities
//! - [`export`] - Artifact serialization
//! - [`utils`] - CSV loading

// Core error handling
pub mod error;

// Core ML modules
pub mod schema;
pub mod preprocessing;
pub mod training;
pub mod pipeline;

// Utilities
pub mod export;
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{PlacementError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PlacementError, Result};

    // Schema
    pub use crate::schema::{Placement, StudentProfile, CATEGORICAL_COLUMNS, FEATURE_COLUMNS, NUMERIC_COLUMNS};

    // Preprocessing
    pub use crate::preprocessing::{CategoryNormalizer, ColumnTransformer, PreprocessingConfig, ScalerType};

    // Training
    pub use crate::training::{ClassWeight, Solver, TrainEngine, TrainingConfig, TrainingReport};

    // Pipeline
    pub use crate::pipeline::PlacementPipeline;

    // Export
    pub use crate::export::ModelMetadata;

    // Data loading
    pub use crate::utils::DataLoader;
}
