// Typed view over raw assessment rows
// Author: Gabriel Demetrios Lafis

use super::{
    validate_assessment, DataError, DataSet, Row, Value, ADDRESS, DEED_DATE, LATITUDE, LOCATION,
    LONGITUDE, PROPERTY_CLASS, PROP_CLASS_DESCRIPTION, SALE_PRICE,
};

/// One property-assessment record with its required attributes typed.
///
/// Missing cells are `None`. Text attributes are rendered from whatever
/// type the loader inferred for the column.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRecord {
    pub index: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub deed_date: Option<String>,
    pub sale_price: Option<f64>,
    pub property_class: Option<i64>,
    pub prop_class_description: Option<String>,
    pub address: Option<String>,
}

/// Column positions of the assessment attributes in a validated dataset
#[derive(Debug, Clone, Copy)]
pub struct AssessmentColumns {
    location: usize,
    latitude: usize,
    longitude: usize,
    deed_date: usize,
    sale_price: usize,
    property_class: usize,
    prop_class_description: usize,
    address: usize,
}

impl AssessmentColumns {
    /// Validate the dataset against the assessment schema and locate its columns
    pub fn resolve(dataset: &DataSet) -> Result<Self, DataError> {
        validate_assessment(dataset)?;

        Ok(AssessmentColumns {
            location: dataset.require_column(LOCATION)?,
            latitude: dataset.require_column(LATITUDE)?,
            longitude: dataset.require_column(LONGITUDE)?,
            deed_date: dataset.require_column(DEED_DATE)?,
            sale_price: dataset.require_column(SALE_PRICE)?,
            property_class: dataset.require_column(PROPERTY_CLASS)?,
            prop_class_description: dataset.require_column(PROP_CLASS_DESCRIPTION)?,
            address: dataset.require_column(ADDRESS)?,
        })
    }

    /// Extract the typed record for a row of the dataset these columns came from
    pub fn record(&self, row: &Row) -> AssessmentRecord {
        AssessmentRecord {
            index: row.index.clone(),
            location: text(&row.values[self.location]),
            latitude: row.values[self.latitude].as_f64(),
            longitude: row.values[self.longitude].as_f64(),
            deed_date: text(&row.values[self.deed_date]),
            sale_price: row.values[self.sale_price].as_f64(),
            property_class: row.values[self.property_class].as_i64(),
            prop_class_description: text(&row.values[self.prop_class_description]),
            address: text(&row.values[self.address]),
        }
    }

    /// Typed records for every row, in order
    pub fn records(&self, dataset: &DataSet) -> Vec<AssessmentRecord> {
        dataset.data.iter().map(|row| self.record(row)).collect()
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_cell()),
    }
}
