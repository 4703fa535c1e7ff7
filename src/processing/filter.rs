// Filter operations for data processing
// Author: Gabriel Demetrios Lafis

use crate::data::{DataSet, Value};
use super::{DataProcessor, ProcessingError};

/// Keep rows whose value in one column satisfies a predicate.
///
/// The column is resolved once per run; a missing column is a schema error
/// rather than an empty result.
pub struct FilterProcessor {
    name: String,
    column: String,
    predicate: Box<dyn Fn(&Value) -> bool>,
}

impl FilterProcessor {
    /// Create a new filter processor with a predicate function
    pub fn new<F>(name: &str, column: &str, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        FilterProcessor {
            name: name.to_string(),
            column: column.to_string(),
            predicate: Box::new(predicate),
        }
    }

    /// Keep rows where the column is not null
    pub fn not_null(column: &str) -> Self {
        Self::new(&format!("not_null_{}", column), column, |value| !value.is_null())
    }

    /// Keep rows where the column is numerically greater than `threshold`.
    /// Nulls and non-numeric cells are dropped.
    pub fn greater_than(column: &str, threshold: f64) -> Self {
        Self::new(&format!("greater_than_{}", column), column, move |value| {
            value.as_f64().map_or(false, |v| v > threshold)
        })
    }

    /// Keep rows where the column is numerically less than `threshold`.
    /// Nulls and non-numeric cells are dropped.
    pub fn less_than(column: &str, threshold: f64) -> Self {
        Self::new(&format!("less_than_{}", column), column, move |value| {
            value.as_f64().map_or(false, |v| v < threshold)
        })
    }

    /// Keep rows where the column holds a finite number
    pub fn finite(column: &str) -> Self {
        Self::new(&format!("finite_{}", column), column, |value| {
            value.as_f64().map_or(false, f64::is_finite)
        })
    }

    /// Rename the filter, e.g. to report it under a pipeline stage name
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

impl DataProcessor for FilterProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let idx = input.require_column(&self.column)?;
        let mut result = input.derive(input.schema.clone());

        for row in &input.data {
            if (self.predicate)(&row.values[idx]) {
                result.add_row(row.clone())?;
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
