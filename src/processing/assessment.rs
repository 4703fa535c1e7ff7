// The assessment cleaning pipeline
// Author: Gabriel Demetrios Lafis

use log::info;
use serde::{Deserialize, Serialize};

use crate::data::{
    load_assessment, resolve_uri, AssessmentColumns, CsvSink, DataSet, DataSink, DEED_YEAR,
    LATITUDE, LOCATION, MAP_COLUMNS, PROPERTY_CLASS, SALE_PRICE, X, Y,
};
use super::{
    is_projectable, DeedYearTransform, FilterProcessor, MercatorProjection,
    NonFinitePolicy, Pipeline, ProcessingError, SelectTransform, SentinelFilter, SentinelSource,
    StageReport,
};

/// Knobs for the cleaning pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Keep only classes below `max_property_class` and only the map columns
    pub strict_residential_classes: bool,
    /// Deed years must be strictly greater than this
    pub min_deed_year: i64,
    /// Sale prices must be strictly greater than this
    pub min_sale_price: f64,
    /// Property classes must be strictly less than this (strict mode only)
    pub max_property_class: i64,
    pub sentinel: SentinelSource,
    pub non_finite: NonFinitePolicy,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            strict_residential_classes: false,
            min_deed_year: 1990,
            min_sale_price: 10_000.0,
            max_property_class: 500,
            sentinel: SentinelSource::default(),
            non_finite: NonFinitePolicy::default(),
        }
    }
}

/// Shape of the table before and after a run, with per-stage row counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformReport {
    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,
    pub stages: Vec<StageReport>,
}

/// Turns a raw assessment extract into a map-ready table
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    options: TransformOptions,
}

impl Transformer {
    pub fn new(options: TransformOptions) -> Self {
        Transformer { options }
    }

    /// The ordered stages for the configured options
    pub fn pipeline(&self) -> Pipeline {
        let opts = &self.options;

        let mut pipeline = Pipeline::new("assessment")
            .add(FilterProcessor::not_null(LOCATION).named("location"))
            .add(MercatorProjection)
            .add(SentinelFilter::new(opts.sentinel.clone()));

        // Must follow the placeholder filter: discovery reads the first row
        // left by the location filter.
        if opts.non_finite == NonFinitePolicy::Reject {
            pipeline = pipeline
                .add(
                    FilterProcessor::new("projectable_latitude", LATITUDE, |value| {
                        value.as_f64().map_or(false, is_projectable)
                    }),
                )
                .add(FilterProcessor::finite(X))
                .add(FilterProcessor::finite(Y));
        }

        pipeline = pipeline
            .add(DeedYearTransform)
            .add(FilterProcessor::greater_than(DEED_YEAR, opts.min_deed_year as f64).named("deed_year_floor"))
            .add(FilterProcessor::greater_than(SALE_PRICE, opts.min_sale_price).named("sale_price_floor"));

        if opts.strict_residential_classes {
            pipeline = pipeline
                .add(
                    FilterProcessor::less_than(PROPERTY_CLASS, opts.max_property_class as f64)
                        .named("property_class_ceiling"),
                )
                .add(SelectTransform::new(
                    MAP_COLUMNS.iter().map(|c| c.to_string()).collect(),
                ));
        }

        pipeline
    }

    /// Clean a raw table
    pub fn transform(&self, raw: &DataSet) -> Result<DataSet, ProcessingError> {
        self.transform_with_report(raw).map(|(data, _)| data)
    }

    /// Clean a raw table and report row counts per stage
    pub fn transform_with_report(
        &self,
        raw: &DataSet,
    ) -> Result<(DataSet, TransformReport), ProcessingError> {
        AssessmentColumns::resolve(raw).map_err(|e| ProcessingError::from(e).in_stage("validate"))?;

        info!(
            "Before cleaning: {} rows, {} columns",
            raw.len(),
            raw.schema.fields.len()
        );

        let (cleaned, stages) = self.pipeline().execute_with_report(raw)?;

        info!(
            "After cleaning: {} rows, {} columns",
            cleaned.len(),
            cleaned.schema.fields.len()
        );

        let report = TransformReport {
            rows_before: raw.len(),
            columns_before: raw.schema.fields.len(),
            rows_after: cleaned.len(),
            columns_after: cleaned.schema.fields.len(),
            stages,
        };

        Ok((cleaned, report))
    }

    /// Load `source_uri`, clean it and write the result to `dest_uri`.
    ///
    /// The destination is only touched once the whole table has been
    /// cleaned, and is replaced atomically.
    pub fn transform_and_persist(
        &self,
        source_uri: &str,
        dest_uri: &str,
    ) -> Result<DataSet, ProcessingError> {
        let raw = load_assessment(source_uri)
            .map_err(|e| ProcessingError::from(e).in_stage("load"))?;

        let cleaned = self.transform(&raw)?;

        let dest = resolve_uri(dest_uri)
            .map_err(|e| ProcessingError::from(e).in_stage("persist"))?;
        CsvSink::new(&dest, b',')
            .write(&cleaned)
            .map_err(|e| ProcessingError::from(e).in_stage("persist"))?;

        Ok(cleaned)
    }
}

/// Clean a raw table with the default options
pub fn transform(raw: &DataSet) -> Result<DataSet, ProcessingError> {
    Transformer::default().transform(raw)
}

/// Load, clean with the default options and persist
pub fn transform_and_persist(source_uri: &str, dest_uri: &str) -> Result<DataSet, ProcessingError> {
    Transformer::default().transform_and_persist(source_uri, dest_uri)
}
