// Deed date handling: placeholder detection and year extraction
// Author: Gabriel Demetrios Lafis

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::data::{AssessmentColumns, DataSet, DataType, Field, Value, DEED_DATE, DEED_YEAR};
use super::{append_columns, DataProcessor, FilterProcessor, ProcessingError};

/// Where the "no deed date" placeholder comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelSource {
    /// Use the DEED DATE of the first row of the table being filtered
    DiscoverFromFirstRow,
    /// Use this exact text
    Fixed(String),
}

impl Default for SentinelSource {
    fn default() -> Self {
        SentinelSource::DiscoverFromFirstRow
    }
}

/// The DEED DATE text of the table's first row, taken as the placeholder
/// the extract uses for "no deed date".
///
/// Returns `None` for an empty table or a null first deed date.
pub fn discover_sentinel(dataset: &DataSet) -> Result<Option<String>, ProcessingError> {
    let idx = dataset.require_column(DEED_DATE)?;

    Ok(dataset.get_row(0).and_then(|row| match &row.values[idx] {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_cell()),
    }))
}

/// Drops every row whose DEED DATE equals the placeholder
pub struct SentinelFilter {
    source: SentinelSource,
}

impl SentinelFilter {
    pub fn new(source: SentinelSource) -> Self {
        SentinelFilter { source }
    }
}

impl DataProcessor for SentinelFilter {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let sentinel = match &self.source {
            SentinelSource::DiscoverFromFirstRow => discover_sentinel(input)?,
            SentinelSource::Fixed(text) => Some(text.clone()),
        };

        let sentinel = match sentinel {
            Some(s) => s,
            None => {
                warn!("No deed date placeholder found; keeping all {} rows", input.len());
                return Ok(input.clone());
            }
        };

        info!("Treating deed date '{}' as a placeholder", sentinel);

        // Compare as text so the placeholder matches however the column was typed
        FilterProcessor::new(self.name(), DEED_DATE, move |value| match value {
            Value::Null => true,
            Value::String(s) => *s != sentinel,
            other => other.to_cell() != sentinel,
        })
        .process(input)
    }

    fn name(&self) -> &str {
        "deed_date_placeholder"
    }
}

/// Year of a deed date written `<month>/<day>/<year>`, optionally followed by
/// whitespace and a time of day.
pub fn parse_deed_year(deed_date: &str) -> Result<i64, String> {
    let date = deed_date
        .split_whitespace()
        .next()
        .ok_or_else(|| format!("empty deed date '{}'", deed_date))?;

    let parts: Vec<&str> = date.split('/').collect();
    if parts.len() != 3 {
        return Err(format!(
            "deed date '{}' is not in month/day/year form",
            deed_date
        ));
    }

    for part in &parts[..2] {
        part.parse::<u32>()
            .map_err(|_| format!("deed date '{}' has a non-numeric month or day", deed_date))?;
    }

    parts[2]
        .parse::<i64>()
        .map_err(|_| format!("deed date '{}' has a non-numeric year", deed_date))
}

/// Appends DEED YEAR parsed from DEED DATE.
///
/// Any row that cannot be parsed fails the whole stage.
pub struct DeedYearTransform;

impl DataProcessor for DeedYearTransform {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let columns = AssessmentColumns::resolve(input)?;
        let fields = vec![Field::new(DEED_YEAR.to_string(), DataType::Integer, false)];

        append_columns(input, fields, |row| {
            let year = match columns.record(row).deed_date {
                Some(text) => parse_deed_year(&text),
                None => Err("deed date is missing".to_string()),
            };

            year.map(|y| vec![Value::Integer(y)])
                .map_err(|message| ProcessingError::Parse {
                    row: row.index.clone(),
                    message,
                })
        })
    }

    fn name(&self) -> &str {
        "deed_year"
    }
}
