// Summary statistics over cleaned tables
// Author: Gabriel Demetrios Lafis

use serde::Serialize;

use crate::data::{DataSet, DEED_YEAR, X, Y};
use super::ProcessingError;

/// Inclusive min/max of a numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range over the finite numeric values of a column, `None` if there are none
    pub fn of_column(dataset: &DataSet, column: &str) -> Result<Option<Self>, ProcessingError> {
        let range = dataset
            .column(column)?
            .filter_map(|value| value.as_f64())
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<ValueRange>, v| {
                Some(match acc {
                    Some(r) => ValueRange {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                    None => ValueRange { min: v, max: v },
                })
            });

        Ok(range)
    }
}

/// Initial view extents for the map: projected x/y and deed year ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayBounds {
    pub x: Option<ValueRange>,
    pub y: Option<ValueRange>,
    pub deed_year: Option<ValueRange>,
}

impl DisplayBounds {
    pub fn from_dataset(dataset: &DataSet) -> Result<Self, ProcessingError> {
        Ok(DisplayBounds {
            x: ValueRange::of_column(dataset, X)?,
            y: ValueRange::of_column(dataset, Y)?,
            deed_year: ValueRange::of_column(dataset, DEED_YEAR)?,
        })
    }
}
