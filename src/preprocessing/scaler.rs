//! Feature scaling implementations

use super::numeric_values;
use crate::error::{PlacementError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

/// Parameters for a fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    column: String,
    center: f64, // mean or min
    scale: f64,  // std or range
}

/// Feature scaler producing a dense block of scaled columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the data. Column order is kept for `transform`.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params.clear();

        for col_name in columns {
            let values = numeric_values(df, col_name)?;
            let present: Vec<f64> = values.into_iter().flatten().collect();
            if present.iter().any(|v| !v.is_finite()) {
                return Err(PlacementError::DataError(format!(
                    "column '{}' contains non-finite values",
                    col_name
                )));
            }
            if present.is_empty() {
                return Err(PlacementError::DataError(format!(
                    "column '{}' has no values to fit a scaler",
                    col_name
                )));
            }
            let (center, scale) = self.compute_params(&present);
            self.params.push(ScalerParams {
                column: col_name.to_string(),
                center,
                scale,
            });
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale the fitted columns into an `(n_rows, n_columns)` matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PlacementError::ModelNotFitted);
        }

        let mut out = Array2::zeros((df.height(), self.params.len()));

        for (j, params) in self.params.iter().enumerate() {
            let values = numeric_values(df, &params.column)?;
            for (i, value) in values.into_iter().enumerate() {
                let v = value.ok_or_else(|| {
                    PlacementError::InferenceError(format!(
                        "column '{}' has a missing or non-numeric value at row {}",
                        params.column, i
                    ))
                })?;
                if !v.is_finite() {
                    return Err(PlacementError::InferenceError(format!(
                        "column '{}' has a non-finite value at row {}",
                        params.column, i
                    )));
                }
                out[[i, j]] = (v - params.center) / params.scale;
            }
        }

        Ok(out)
    }

    /// Names of the scaled columns, in output order
    pub fn columns(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.column.as_str()).collect()
    }

    pub fn scaler_type(&self) -> &ScalerType {
        &self.scaler_type
    }

    fn compute_params(&self, values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        match self.scaler_type {
            ScalerType::Standard => {
                let mean = values.iter().sum::<f64>() / n;
                // population standard deviation
                let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
                let std = var.sqrt();
                (mean, if std == 0.0 { 1.0 } else { std })
            }
            ScalerType::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                (min, if range == 0.0 { 1.0 } else { range })
            }
            ScalerType::None => (0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler() {
        let df = df!("a" => &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let mut scaler = Scaler::new(ScalerType::Standard);
        scaler.fit(&df, &["a"]).unwrap();
        let result = scaler.transform(&df).unwrap();

        let col = result.column(0);
        let mean = col.sum() / col.len() as f64;
        let var = col.mapv(|v| v * v).sum() / col.len() as f64;
        assert!(mean.abs() < 1e-10);
        assert!((var - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let df = df!("a" => &[1.0, 2.0, 3.0]).unwrap();
        let mut scaler = Scaler::new(ScalerType::Standard);
        scaler.fit(&df, &["a"]).unwrap();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let input = df!("a" => &[2.0, bad]).unwrap();
            let err = scaler.transform(&input).unwrap_err();
            assert!(matches!(err, PlacementError::InferenceError(ref msg) if msg.contains("row 1")));
        }

        let poisoned = df!("a" => &[1.0, f64::NAN]).unwrap();
        let mut fresh = Scaler::new(ScalerType::Standard);
        assert!(matches!(fresh.fit(&poisoned, &["a"]), Err(PlacementError::DataError(_))));
    }

    #[test]
    fn test_minmax_scaler() {
        let df = df!("a" => &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let mut scaler = Scaler::new(ScalerType::MinMax);
        scaler.fit(&df, &["a"]).unwrap();
        let result = scaler.transform(&df).unwrap();

        assert!((result[[0, 0]] - 0.0).abs() < 1e-10);
        assert!((result[[4, 0]] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_is_not_divided_by_zero() {
        let df = df!("a" => &[7.0, 7.0, 7.0]).unwrap();

        let mut scaler = Scaler::new(ScalerType::Standard);
        scaler.fit(&df, &["a"]).unwrap();
        let result = scaler.transform(&df).unwrap();
        assert!(result.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_column_order_preserved() {
        let df = df!("b" => &[1.0, 2.0], "a" => &[10.0, 20.0]).unwrap();

        let mut scaler = Scaler::new(ScalerType::None);
        scaler.fit(&df, &["a", "b"]).unwrap();
        let result = scaler.transform(&df).unwrap();

        assert_eq!(scaler.columns(), vec!["a", "b"]);
        assert_eq!(result[[1, 0]], 20.0);
        assert_eq!(result[[1, 1]], 2.0);
    }

    #[test]
    fn test_null_at_transform_is_an_error() {
        let train = df!("a" => &[1.0, 2.0]).unwrap();
        let test = DataFrame::new(vec![Column::new("a".into(), &[None::<f64>])]).unwrap();

        let mut scaler = Scaler::new(ScalerType::Standard);
        scaler.fit(&train, &["a"]).unwrap();
        assert!(matches!(scaler.transform(&test), Err(PlacementError::InferenceError(_))));
    }
}
