// CSV data source and sink implementation
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use super::{
    infer_type, parse_cell, validate_assessment, DataError, DataSet, DataSink, DataSource,
    DataType, Field, Row, Schema,
};

const FILE_SCHEME: &str = "file://";

/// Turn a path or `file://` URI into a filesystem path
pub fn resolve_uri(uri: &str) -> Result<PathBuf, DataError> {
    if let Some(path) = uri.strip_prefix(FILE_SCHEME) {
        return Ok(PathBuf::from(path));
    }

    match uri.find("://") {
        Some(_) => Err(DataError::NotFound(format!("unsupported URI scheme in '{}'", uri))),
        None => Ok(PathBuf::from(uri)),
    }
}

/// Load a comma-separated file whose first column is the row index
pub fn load(uri: &str) -> Result<DataSet, DataError> {
    let path = resolve_uri(uri)?;
    CsvSource::new(&path, b',').read()
}

/// Load a file using the column types of `schema` where it names a column.
///
/// Reloading a written table with its own schema gives back the same
/// values even for text columns whose surviving cells all look numeric
/// (`01234` stays text). Columns the schema does not name are inferred.
pub fn load_with_schema(uri: &str, schema: &Schema) -> Result<DataSet, DataError> {
    let path = resolve_uri(uri)?;
    CsvSource::new(&path, b',').with_schema(schema.clone()).read()
}

/// Load a raw assessment extract and check it carries the required columns
pub fn load_assessment(uri: &str) -> Result<DataSet, DataError> {
    let dataset = load(uri)?;
    validate_assessment(&dataset)?;
    Ok(dataset)
}

/// CSV data source.
///
/// The header row is mandatory and the first column becomes the dataset
/// index. Column types are inferred from the cell text unless a schema
/// hint names the column.
pub struct CsvSource {
    path: String,
    delimiter: u8,
    hint: Option<Schema>,
}

impl CsvSource {
    /// Create a new CSV data source
    pub fn new<P: AsRef<Path>>(path: P, delimiter: u8) -> Self {
        CsvSource {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter,
            hint: None,
        }
    }

    /// Take column types from `schema` instead of inferring them
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.hint = Some(schema);
        self
    }

    fn hinted_type(&self, name: &str) -> Option<DataType> {
        self.hint
            .as_ref()
            .and_then(|schema| schema.get_field_by_name(name))
            .map(|field| field.data_type)
    }

    fn open(&self) -> Result<File, DataError> {
        File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DataError::NotFound(self.path.clone()),
            _ => DataError::Io(e),
        })
    }
}

impl DataSource for CsvSource {
    fn read(&self) -> Result<DataSet, DataError> {
        let reader = BufReader::new(self.open()?);

        let mut csv_reader = ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| DataError::Parse(format!("{}: {}", self.path, e)))?
            .iter()
            .map(|s| s.to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(DataError::Parse(format!("{}: missing header row", self.path)));
        }

        let mut seen = HashSet::new();
        for name in &headers {
            if !seen.insert(name.as_str()) {
                return Err(DataError::Parse(format!(
                    "{}: duplicate column '{}' in header",
                    self.path, name
                )));
            }
        }

        // Collect raw cells first; types are inferred over whole columns
        let mut index = Vec::new();
        let mut cells: Vec<Vec<String>> = Vec::new();

        for result in csv_reader.records() {
            let record = result.map_err(|e| DataError::Parse(format!("{}: {}", self.path, e)))?;
            let mut fields = record.iter();

            index.push(fields.next().unwrap_or_default().to_string());
            cells.push(fields.map(|s| s.to_string()).collect());
        }

        let fields: Vec<Field> = headers[1..]
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let data_type = self.hinted_type(name).unwrap_or_else(|| {
                    infer_type(cells.iter().map(|row| row[col].as_str()))
                });
                Field::new(name.clone(), data_type, true)
            })
            .collect();

        let schema = Schema::new(fields);
        let mut dataset = DataSet::new(schema).with_index_name(&headers[0]);

        for (label, raw) in index.into_iter().zip(cells) {
            let values = raw
                .iter()
                .zip(&dataset.schema.fields)
                .map(|(cell, field)| parse_cell(cell, field.data_type))
                .collect();

            dataset.add_row(Row::new(label, values))?;
        }

        dataset.metadata.add("source".to_string(), "csv".to_string());
        dataset.metadata.add("path".to_string(), self.path.clone());

        info!(
            "Loaded {} rows x {} columns from {}",
            dataset.len(),
            dataset.schema.fields.len(),
            self.path
        );

        Ok(dataset)
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// CSV data sink.
///
/// Writes go to a temporary file next to the destination which is renamed
/// into place once complete, so a failed write never leaves a partial file.
///
/// Cells carry no type information. Plain `load` re-infers types from the
/// text; use `load_with_schema` with the written table's schema to get the
/// same column types back.
pub struct CsvSink {
    path: String,
    delimiter: u8,
}

impl CsvSink {
    /// Create a new CSV data sink
    pub fn new<P: AsRef<Path>>(path: P, delimiter: u8) -> Self {
        CsvSink {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter,
        }
    }

    fn staging_dir(&self) -> PathBuf {
        match Path::new(&self.path).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl DataSink for CsvSink {
    fn write(&self, data: &DataSet) -> Result<(), DataError> {
        let staged = NamedTempFile::new_in(self.staging_dir())?;
        debug!("Staging {} rows in {}", data.len(), staged.path().display());

        {
            let writer = BufWriter::new(staged.as_file());
            let mut csv_writer = ::csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .from_writer(writer);

            let mut headers = vec![data.index_name.as_str()];
            headers.extend(data.schema.names());

            csv_writer
                .write_record(&headers)
                .map_err(|e| DataError::Io(std::io::Error::new(ErrorKind::Other, e)))?;

            for row in &data.data {
                let mut record = Vec::with_capacity(row.values.len() + 1);
                record.push(row.index.clone());
                record.extend(row.values.iter().map(|value| value.to_cell()));

                csv_writer
                    .write_record(&record)
                    .map_err(|e| DataError::Io(std::io::Error::new(ErrorKind::Other, e)))?;
            }

            csv_writer.flush()?;
        }

        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| DataError::Io(e.error))?;

        info!("Wrote {} rows to {}", data.len(), self.path);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.path
    }
}
