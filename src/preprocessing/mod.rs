//! Data preprocessing module
//!
//! Provides the cleaning and feature transformation steps of the placement pipeline:
//! - Canonicalization of categorical spellings and label mapping
//! - Missing value imputation
//! - Feature scaling (StandardScaler, MinMaxScaler)
//! - One-hot encoding with unknown-category handling
//! - A column transformer combining scaling and encoding into one feature matrix

mod cleaning;
mod config;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use cleaning::{map_labels, CategoryNormalizer};
pub use config::PreprocessingConfig;
pub use encoder::{HandleUnknown, OneHotEncoder};
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::ColumnTransformer;
pub use scaler::{Scaler, ScalerType};

use crate::error::{PlacementError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column data type for preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
    Unknown,
}

impl ColumnType {
    /// Classify a polars dtype
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => ColumnType::Numeric,
            DataType::String | DataType::Boolean => ColumnType::Categorical,
            _ => ColumnType::Unknown,
        }
    }
}

/// Look up a column, reporting absence as a schema mismatch
pub(crate) fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PlacementError::SchemaMismatch(format!("missing column '{}'", name)))
}

/// Read a column as optional floats, casting integer columns
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let casted = require_column(df, name)?.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca.into_iter().collect())
}

/// Read a column as optional strings, casting non-string columns
pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let casted = require_column(df, name)?.cast(&DataType::String)?;
    let ca = casted.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_of() {
        assert_eq!(ColumnType::of(&DataType::Float64), ColumnType::Numeric);
        assert_eq!(ColumnType::of(&DataType::Int64), ColumnType::Numeric);
        assert_eq!(ColumnType::of(&DataType::String), ColumnType::Categorical);
    }

    #[test]
    fn test_numeric_values_casts_integers() {
        let df = df!("a" => &[1i64, 2, 3]).unwrap();
        let values = numeric_values(&df, "a").unwrap();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let df = df!("a" => &[1.0]).unwrap();
        let err = string_values(&df, "gender").unwrap_err();
        assert!(matches!(err, PlacementError::SchemaMismatch(_)));
    }
}
