// Property Assessment Pipeline
// Author: Gabriel Demetrios Lafis

//! # Property Assessment Pipeline
//!
//! Cleans a municipal property-assessment extract into a table ready for
//! an interactive map.
//!
//! ## Features
//!
//! - CSV loading with an index column and per-column type inference
//! - WGS84 to Web Mercator projection of every record
//! - Detection of the extract's "no deed date" placeholder
//! - Deed year derivation and year, price and property-class filters
//! - Atomic CSV output that loads back with the same loader
//! - Display bounds for the map's initial view
//!
//! ## Example
//!
//! ```no_run
//! use property_assessment_pipeline::{
//!     data::load,
//!     processing::{DisplayBounds, TransformOptions, Transformer},
//! };
//!
//! let transformer = Transformer::new(TransformOptions {
//!     strict_residential_classes: true,
//!     ..TransformOptions::default()
//! });
//!
//! let cleaned = transformer
//!     .transform_and_persist("data/assessment.csv", "data/assessment_clean.csv")
//!     .unwrap();
//!
//! let reloaded = load("data/assessment_clean.csv").unwrap();
//! assert_eq!(cleaned.len(), reloaded.len());
//!
//! let bounds = DisplayBounds::from_dataset(&reloaded).unwrap();
//! println!("{:?}", bounds.deed_year);
//! ```

pub mod data;
pub mod processing;
pub mod utils;

// Re-export main types
pub use data::{load, load_assessment, load_with_schema, AssessmentRecord, DataSet, DataType, Field, Row, Schema, Value};
pub use processing::{transform, transform_and_persist, DisplayBounds, Pipeline, TransformOptions, Transformer};
pub use utils::Config;
