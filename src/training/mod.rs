//! Model training module
//!
//! Provides the training side of the placement predictor:
//! - Configuration (split, regularization, solver, preprocessing)
//! - Stratified train/test splitting
//! - Class-weighted L2 logistic regression
//! - The engine that runs the whole CSV-to-artifact flow

mod config;
mod engine;
pub mod linear_models;
pub mod split;

pub use config::{ClassWeight, Solver, TrainingConfig};
pub use engine::{PreparedData, TrainEngine, TrainingReport};
pub use linear_models::{class_sample_weights, LogisticRegression};
pub use split::{class_counts, stratified_split, TrainTestSplit};
