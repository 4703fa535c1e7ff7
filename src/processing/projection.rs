// WGS84 to Web Mercator projection
// Author: Gabriel Demetrios Lafis

use std::f64::consts::PI;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::data::{AssessmentColumns, DataSet, DataType, Field, Value, X, Y};
use super::{append_columns, DataProcessor, ProcessingError};

/// Equatorial radius of the spherical Mercator model, in metres
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Forward spherical Web Mercator projection of a longitude/latitude pair.
///
/// Not clamped: latitude -90 yields `y = -inf` and latitude +90 yields a
/// very large but finite `y`.
pub fn web_mercator(longitude: f64, latitude: f64) -> (f64, f64) {
    let x = longitude * (EARTH_RADIUS * PI / 180.0);
    let y = ((90.0 + latitude) * PI / 360.0).tan().ln() * EARTH_RADIUS;
    (x, y)
}

/// What to do with rows whose coordinates do not project to a usable point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Keep the row and warn
    PassThrough,
    /// Drop the row
    Reject,
}

impl Default for NonFinitePolicy {
    fn default() -> Self {
        NonFinitePolicy::PassThrough
    }
}

/// Whether a latitude lies in the open interval where Mercator is defined
pub fn is_projectable(latitude: f64) -> bool {
    latitude.abs() < 90.0
}

/// Appends `x`/`y` Web Mercator columns computed from LONGITUDE/LATITUDE.
///
/// A missing longitude or latitude gives null `x`/`y`.
pub struct MercatorProjection;

impl DataProcessor for MercatorProjection {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let columns = AssessmentColumns::resolve(input)?;
        let mut unusable = 0usize;

        let fields = vec![
            Field::new(X.to_string(), DataType::Float, true),
            Field::new(Y.to_string(), DataType::Float, true),
        ];

        let result = append_columns(input, fields, |row| {
            let record = columns.record(row);

            match (record.longitude, record.latitude) {
                (Some(lon), Some(lat)) => {
                    let (x, y) = web_mercator(lon, lat);
                    if !(x.is_finite() && y.is_finite() && is_projectable(lat)) {
                        unusable += 1;
                    }
                    Ok(vec![Value::Float(x), Value::Float(y)])
                }
                _ => {
                    unusable += 1;
                    Ok(vec![Value::Null, Value::Null])
                }
            }
        })?;

        if unusable > 0 {
            warn!("{} rows have coordinates outside the Mercator domain", unusable);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "projection"
    }
}
