// Schema inference and the assessment column contract
// Author: Gabriel Demetrios Lafis

use super::{DataError, DataSet, DataType, Field, Schema, Value};

pub const LOCATION: &str = "LOCATION";
pub const LATITUDE: &str = "LATITUDE";
pub const LONGITUDE: &str = "LONGITUDE";
pub const DEED_DATE: &str = "DEED DATE";
pub const SALE_PRICE: &str = "SALE PRICE";
pub const PROPERTY_CLASS: &str = "PROPERTY CLASS";
pub const PROP_CLASS_DESCRIPTION: &str = "PROP CLASS DESCRIPTION";
pub const ADDRESS: &str = "ADDRESS";

pub const X: &str = "x";
pub const Y: &str = "y";
pub const DEED_YEAR: &str = "DEED YEAR";

/// Cell texts read as a missing value, matched exactly (case-sensitive).
/// Same set dataframe readers treat as NA by default.
pub const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True for an empty cell or one of the `MISSING_TOKENS`
pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_TOKENS.iter().any(|token| *token == cell)
}

/// Infer a column type from its raw cells.
///
/// Missing cells are ignored. A column with no values at all is treated as
/// Float, the same way dataframe readers type an all-missing column.
pub fn infer_type<'a, I>(cells: I) -> DataType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut inferred = DataType::Integer;

    for cell in cells.into_iter().filter(|c| !is_missing(c)) {
        match inferred {
            DataType::Integer if cell.parse::<i64>().is_ok() => {}
            DataType::Integer | DataType::Float if cell.parse::<f64>().is_ok() => {
                inferred = DataType::Float;
            }
            _ => return DataType::String,
        }
    }

    inferred
}

/// Parse a raw cell according to its column's inferred type
pub fn parse_cell(cell: &str, data_type: DataType) -> Value {
    if is_missing(cell) {
        return Value::Null;
    }

    match data_type {
        DataType::Integer => cell
            .parse()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::String(cell.to_string())),
        DataType::Float => cell
            .parse()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::String(cell.to_string())),
        DataType::String => Value::String(cell.to_string()),
    }
}

/// Kind of values a required column must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// One required column of an input table
#[derive(Debug, Clone, Copy)]
pub struct ColumnRequirement {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Columns a raw assessment extract must provide.
///
/// Text columns accept any inferred type; their values are only compared
/// or carried through.
pub const ASSESSMENT_COLUMNS: [ColumnRequirement; 8] = [
    ColumnRequirement { name: LOCATION, kind: ColumnKind::Text },
    ColumnRequirement { name: LATITUDE, kind: ColumnKind::Numeric },
    ColumnRequirement { name: LONGITUDE, kind: ColumnKind::Numeric },
    ColumnRequirement { name: DEED_DATE, kind: ColumnKind::Text },
    ColumnRequirement { name: SALE_PRICE, kind: ColumnKind::Numeric },
    ColumnRequirement { name: PROPERTY_CLASS, kind: ColumnKind::Numeric },
    ColumnRequirement { name: PROP_CLASS_DESCRIPTION, kind: ColumnKind::Text },
    ColumnRequirement { name: ADDRESS, kind: ColumnKind::Text },
];

/// Columns kept when only the map-facing subset is wanted
pub const MAP_COLUMNS: [&str; 7] = [
    X,
    Y,
    DEED_YEAR,
    PROPERTY_CLASS,
    SALE_PRICE,
    PROP_CLASS_DESCRIPTION,
    ADDRESS,
];

/// Validate that a dataset carries the given columns with usable types
pub fn validate_columns(dataset: &DataSet, required: &[ColumnRequirement]) -> Result<(), DataError> {
    for requirement in required {
        let field = dataset
            .schema
            .get_field_by_name(requirement.name)
            .ok_or_else(|| {
                DataError::Schema(format!("required column '{}' is missing", requirement.name))
            })?;

        if requirement.kind == ColumnKind::Numeric && !field.data_type.is_numeric() {
            return Err(DataError::Schema(format!(
                "column '{}' has type {:?}, expected a numeric column",
                field.name, field.data_type
            )));
        }
    }

    Ok(())
}

/// Validate the raw assessment columns
pub fn validate_assessment(dataset: &DataSet) -> Result<(), DataError> {
    validate_columns(dataset, &ASSESSMENT_COLUMNS)
}

/// Schema builder for creating schemas
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Add a field to the schema
    pub fn add_field(mut self, name: &str, data_type: DataType, nullable: bool) -> Self {
        self.fields.push(Field::new(name.to_string(), data_type, nullable));
        self
    }

    pub fn add_integer(self, name: &str) -> Self {
        self.add_field(name, DataType::Integer, true)
    }

    pub fn add_float(self, name: &str) -> Self {
        self.add_field(name, DataType::Float, true)
    }

    pub fn add_string(self, name: &str) -> Self {
        self.add_field(name, DataType::String, true)
    }

    /// The raw assessment layout, in the order of the required columns
    pub fn assessment() -> Self {
        Self::new()
            .add_string(LOCATION)
            .add_float(LATITUDE)
            .add_float(LONGITUDE)
            .add_string(DEED_DATE)
            .add_float(SALE_PRICE)
            .add_integer(PROPERTY_CLASS)
            .add_string(PROP_CLASS_DESCRIPTION)
            .add_string(ADDRESS)
    }

    /// Build the schema
    pub fn build(self) -> Schema {
        Schema::new(self.fields)
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
