//! Data loading utilities

use crate::error::{PlacementError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Cell values read as missing, in addition to empty cells
pub const NULL_TOKENS: [&str; 5] = ["NA", "N/A", "NaN", "null", "NULL"];

/// CSV loader for the raw placement dataset
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer column types
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(1000),
        }
    }

    /// Set the number of rows used for type inference (`None` scans the whole file)
    pub fn with_infer_schema_length(mut self, n: Option<usize>) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Load a CSV file with a header row.
    ///
    /// Empty cells and any of [`NULL_TOKENS`] become nulls.
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();

        let file = File::open(path)
            .map_err(|e| PlacementError::DataError(format!("cannot open {}: {}", path.display(), e)))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .map_parse_options(|opts| {
                opts.with_null_values(Some(NullValues::AllColumns(
                    NULL_TOKENS.iter().map(|t| (*t).into()).collect(),
                )))
            })
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PlacementError::DataError(format!("cannot parse {}: {}", path.display(), e)))?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded CSV"
        );
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_csv_with_gaps() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sl_no,gender,mba_p,status,salary").unwrap();
        writeln!(file, "1,M,58.8,Placed,270000").unwrap();
        writeln!(file, "2,F,,Not Placed,").unwrap();
        file.flush().unwrap();

        let df = DataLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(df.shape(), (2, 5));
        assert_eq!(df.column("mba_p").unwrap().null_count(), 1);
        assert_eq!(df.column("salary").unwrap().null_count(), 1);
        assert_eq!(df.column("mba_p").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_na_tokens_keep_numeric_columns_numeric() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "etest_p,mba_p,workex").unwrap();
        writeln!(file, "55,58.8,No").unwrap();
        writeln!(file, "NA,66.3,Yes").unwrap();
        writeln!(file, "75,N/A,No").unwrap();
        file.flush().unwrap();

        let df = DataLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(df.column("etest_p").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("etest_p").unwrap().null_count(), 1);
        assert_eq!(df.column("mba_p").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("mba_p").unwrap().null_count(), 1);
    }

    #[test]
    fn test_missing_file_is_data_error() {
        let err = DataLoader::new().load_csv("/nonexistent/placement.csv").unwrap_err();
        assert!(matches!(err, PlacementError::DataError(_)));
    }
}
