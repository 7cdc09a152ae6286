//! Missing value imputation strategies

use super::numeric_values;
use crate::error::{PlacementError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing numeric values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the column mean
    Mean,
    /// Replace with the column median
    Median,
    /// Replace with a constant value
    Constant(f64),
}

/// Imputer for numeric columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: BTreeMap<String, f64>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let values = numeric_values(df, col_name)
                .map_err(|_| PlacementError::MissingColumn(col_name.to_string()))?;
            let fill_value = self.compute_fill_value(&values);
            self.fill_values.insert(col_name.to_string(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data by imputing missing values
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PlacementError::ModelNotFitted);
        }

        let mut result = df.clone();

        for (col_name, fill_value) in &self.fill_values {
            if df.column(col_name).is_err() {
                continue;
            }
            let filled: Float64Chunked = numeric_values(df, col_name)?
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(*fill_value)))
                .collect();
            result.with_column(filled.with_name(col_name.as_str().into()).into_series())?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fill value learned for a column
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.fill_values.get(column).copied()
    }

    fn compute_fill_value(&self, values: &[Option<f64>]) -> f64 {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();

        match &self.strategy {
            ImputeStrategy::Mean => {
                if present.is_empty() {
                    0.0
                } else {
                    present.iter().sum::<f64>() / present.len() as f64
                }
            }
            ImputeStrategy::Median => {
                if present.is_empty() {
                    return 0.0;
                }
                present.sort_by(|a, b| a.total_cmp(b));
                let mid = present.len() / 2;
                if present.len() % 2 == 0 {
                    (present[mid - 1] + present[mid]) / 2.0
                } else {
                    present[mid]
                }
            }
            ImputeStrategy::Constant(val) => *val,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imputer_creation() {
        let imputer = Imputer::new(ImputeStrategy::Mean);
        assert!(!imputer.is_fitted);
    }

    #[test]
    fn test_mean_imputation() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), &[Some(1.0), None, Some(3.0), Some(4.0)]),
        ])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let result = imputer.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        // Mean of [1, 3, 4] = 8/3
        assert!((col.get(1).unwrap() - 2.666666666666667).abs() < 0.001);
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn test_median_imputation() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), &[Some(1.0), None, Some(3.0), Some(10.0), Some(4.0)]),
        ])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Median);
        imputer.fit(&df, &["a"]).unwrap();
        assert_eq!(imputer.fill_value("a"), Some(3.5));
    }

    #[test]
    fn test_missing_column_fails_fit() {
        let df = df!("a" => &[1.0]).unwrap();
        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        assert!(matches!(
            imputer.fit(&df, &["mba_p"]),
            Err(PlacementError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df!("a" => &[1.0]).unwrap();
        let imputer = Imputer::new(ImputeStrategy::Constant(0.0));
        assert!(matches!(imputer.transform(&df), Err(PlacementError::ModelNotFitted)));
    }
}
