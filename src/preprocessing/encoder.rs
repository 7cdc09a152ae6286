//! One-hot encoding of categorical columns

use super::string_values;
use crate::error::{PlacementError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// What to do with a category not seen during fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleUnknown {
    /// Encode as all zeros
    Ignore,
    /// Fail the transform
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ColumnVocabulary {
    column: String,
    // sorted
    categories: Vec<String>,
}

/// One-hot encoder. Each fitted column expands into one indicator per category,
/// categories in sorted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
    vocabularies: Vec<ColumnVocabulary>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder
    pub fn new(handle_unknown: HandleUnknown) -> Self {
        Self {
            handle_unknown,
            vocabularies: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the category vocabulary of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.vocabularies.clear();

        for col_name in columns {
            let categories: BTreeSet<String> =
                string_values(df, col_name)?.into_iter().flatten().collect();
            debug!(column = %col_name, n_categories = categories.len(), "Fitted one-hot vocabulary");
            self.vocabularies.push(ColumnVocabulary {
                column: col_name.to_string(),
                categories: categories.into_iter().collect(),
            });
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode the fitted columns into an `(n_rows, n_output_features)` matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PlacementError::ModelNotFitted);
        }

        let mut out = Array2::zeros((df.height(), self.n_output_features()));
        let mut offset = 0;

        for vocab in &self.vocabularies {
            let values = string_values(df, &vocab.column)?;
            for (i, value) in values.iter().enumerate() {
                let position = value
                    .as_deref()
                    .and_then(|v| vocab.categories.binary_search_by(|c| c.as_str().cmp(v)).ok());
                match (position, self.handle_unknown) {
                    (Some(k), _) => out[[i, offset + k]] = 1.0,
                    (None, HandleUnknown::Ignore) => {
                        debug!(column = %vocab.column, value = ?value, "Unknown category encoded as zeros");
                    }
                    (None, HandleUnknown::Error) => {
                        return Err(PlacementError::InferenceError(format!(
                            "unknown category {:?} in column '{}'",
                            value, vocab.column
                        )));
                    }
                }
            }
            offset += vocab.categories.len();
        }

        Ok(out)
    }

    /// Total number of indicator columns produced
    pub fn n_output_features(&self) -> usize {
        self.vocabularies.iter().map(|v| v.categories.len()).sum()
    }

    /// Names of the indicator columns, `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|v| {
                v.categories
                    .iter()
                    .map(move |c| format!("{}_{}", v.column, c))
            })
            .collect()
    }

    /// Fitted categories of a column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.vocabularies
            .iter()
            .find(|v| v.column == column)
            .map(|v| v.categories.as_slice())
    }

    /// Names of the encoded source columns
    pub fn columns(&self) -> Vec<&str> {
        self.vocabularies.iter().map(|v| v.column.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onehot_encoding() {
        let df = df!("category" => &["b", "a", "c", "a", "b"]).unwrap();

        let mut encoder = OneHotEncoder::new(HandleUnknown::Ignore);
        encoder.fit(&df, &["category"]).unwrap();
        let result = encoder.transform(&df).unwrap();

        assert_eq!(result.dim(), (5, 3));
        assert_eq!(encoder.feature_names(), vec!["category_a", "category_b", "category_c"]);
        // "b" -> second indicator
        assert_eq!(result.row(0).to_vec(), vec![0.0, 1.0, 0.0]);
        for row in result.rows() {
            assert_eq!(row.sum(), 1.0);
        }
    }

    #[test]
    fn test_unknown_category_ignored() {
        let train = df!("workex" => &["Yes", "No"]).unwrap();
        let test = df!("workex" => &["Maybe"]).unwrap();

        let mut encoder = OneHotEncoder::new(HandleUnknown::Ignore);
        encoder.fit(&train, &["workex"]).unwrap();
        let result = encoder.transform(&test).unwrap();

        assert_eq!(result.dim(), (1, 2));
        assert!(result.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_unknown_category_error() {
        let train = df!("workex" => &["Yes", "No"]).unwrap();
        let test = df!("workex" => &["Maybe"]).unwrap();

        let mut encoder = OneHotEncoder::new(HandleUnknown::Error);
        encoder.fit(&train, &["workex"]).unwrap();
        assert!(matches!(encoder.transform(&test), Err(PlacementError::InferenceError(_))));
    }

    #[test]
    fn test_missing_column_at_transform() {
        let train = df!("workex" => &["Yes", "No"]).unwrap();
        let test = df!("other" => &["Yes"]).unwrap();

        let mut encoder = OneHotEncoder::new(HandleUnknown::Ignore);
        encoder.fit(&train, &["workex"]).unwrap();
        assert!(matches!(encoder.transform(&test), Err(PlacementError::SchemaMismatch(_))));
    }
}
