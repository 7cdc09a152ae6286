//! Canonicalization of raw categorical spellings and label mapping

use super::{require_column, string_values};
use crate::error::Result;
use crate::schema::{LABEL_NOT_PLACED, LABEL_PLACED};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Rewrites known spelling variants of categorical values to a canonical form.
///
/// Values without a rule pass through unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryNormalizer {
    rules: BTreeMap<String, BTreeMap<String, String>>,
}

impl CategoryNormalizer {
    /// Create a normalizer with no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the raw placement dataset
    pub fn placement() -> Self {
        Self::new()
            .with_rule("gender", "M", "Male")
            .with_rule("gender", "F", "Female")
            .with_rule("ssc_b", "Central Board", "Central")
            .with_rule("hsc_b", "Central Board", "Central")
            .with_rule("hsc_s", "Other", "Others")
    }

    /// Add a `from -> to` rewrite for one column
    pub fn with_rule(
        mut self,
        column: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.rules
            .entry(column.into())
            .or_default()
            .insert(from.into(), to.into());
        self
    }

    /// Canonical spelling of `value` in `column`
    pub fn normalize<'a>(&'a self, column: &str, value: &'a str) -> &'a str {
        self.rules
            .get(column)
            .and_then(|rules| rules.get(value))
            .map(String::as_str)
            .unwrap_or(value)
    }

    /// Apply every rule whose column is present in the frame
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for column in self.rules.keys() {
            if df.column(column).is_err() {
                continue;
            }

            let values = string_values(df, column)?;
            let mut rewritten = 0usize;
            let normalized: StringChunked = values
                .iter()
                .map(|opt| {
                    opt.as_deref().map(|v| {
                        let canonical = self.normalize(column, v);
                        if canonical != v {
                            rewritten += 1;
                        }
                        canonical.to_string()
                    })
                })
                .collect();

            debug!(column = %column, rewritten, "Normalized categorical spellings");
            result.with_column(normalized.with_name(column.as_str().into()).into_series())?;
        }

        Ok(result)
    }
}

/// Replace the raw label column with 1.0 (placed) / 0.0 (not placed).
///
/// Any other spelling becomes null so the row is dropped with the other
/// incomplete rows.
pub fn map_labels(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let name = require_column(df, column)?.name().clone();
    let values = string_values(df, column)?;

    let mut unmapped = 0usize;
    let labels: Float64Chunked = values
        .iter()
        .map(|opt| match opt.as_deref() {
            Some(LABEL_PLACED) => Some(1.0),
            Some(LABEL_NOT_PLACED) => Some(0.0),
            Some(_) => {
                unmapped += 1;
                None
            }
            None => None,
        })
        .collect();

    if unmapped > 0 {
        warn!(column = %column, unmapped, "Label values outside the known spellings were treated as missing");
    }

    let mut result = df.clone();
    result.with_column(labels.with_name(name).into_series())?;
    Ok(result)
}
