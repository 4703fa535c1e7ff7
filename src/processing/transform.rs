// Transform operations for data processing
// Author: Gabriel Demetrios Lafis

use crate::data::{DataError, DataSet, Field, Row, Schema, Value};
use super::{DataProcessor, ProcessingError};

/// Select specific columns from a dataset, in the given order
pub struct SelectTransform {
    columns: Vec<String>,
}

impl SelectTransform {
    /// Create a new select transform with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        SelectTransform { columns }
    }
}

impl DataProcessor for SelectTransform {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let indices = self
            .columns
            .iter()
            .map(|col| input.require_column(col))
            .collect::<Result<Vec<_>, DataError>>()?;

        let fields = indices
            .iter()
            .map(|&i| input.schema.fields[i].clone())
            .collect();

        let mut result = input.derive(Schema::new(fields));

        for row in &input.data {
            let values = indices.iter().map(|&i| row.values[i].clone()).collect();
            result.add_row(Row::new(row.index.clone(), values))?;
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "select"
    }
}

/// Copy `input` with extra columns appended, computed row by row.
///
/// `derive` returns one value per new field. The first row it rejects
/// aborts the whole copy.
pub fn append_columns<F>(
    input: &DataSet,
    new_fields: Vec<Field>,
    mut derive: F,
) -> Result<DataSet, ProcessingError>
where
    F: FnMut(&Row) -> Result<Vec<Value>, ProcessingError>,
{
    for field in &new_fields {
        if input.column_index(&field.name).is_some() {
            return Err(ProcessingError::InvalidArgument(format!(
                "Column '{}' already exists",
                field.name
            )));
        }
    }

    let mut fields = input.schema.fields.clone();
    fields.extend(new_fields);

    let mut result = input.derive(Schema::new(fields));

    for row in &input.data {
        let mut values = row.values.clone();
        values.extend(derive(row)?);
        result.add_row(Row::new(row.index.clone(), values))?;
    }

    Ok(result)
}
