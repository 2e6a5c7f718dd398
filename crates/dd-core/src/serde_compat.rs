//! JSON serde for the series snapshot wire format.
//!
//! The wire format uses camelCase field names. Values travel as f64; the
//! validity overlay and the depth cache travel as parallel arrays, the cache
//! only when it was fresh at export time. Exported depths are a report: an
//! import always reclassifies under the importing configuration.

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::depth::DepthConfig;
use crate::error::{Result, SeriesError};
use crate::values::ValueSeries;

pub const CURRENT_VERSION: &str = "1.0";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSnapshot {
    pub version: String,
    pub base: f64,
    pub step: f64,
    pub y_precision: f64,
    pub values: Vec<f64>,
    #[serde(default)]
    pub valid: Vec<bool>,
    #[serde(default)]
    pub depths: Option<Vec<i32>>,
}

impl SeriesSnapshot {
    /// Capture a series. Depths are included only if the cache is current.
    pub fn from_series<T: Float, F>(series: &ValueSeries<T, F>) -> Self {
        let inner = series.series();
        SeriesSnapshot {
            version: CURRENT_VERSION.to_string(),
            base: inner.base(),
            step: inner.step(),
            y_precision: series.y_precision().to_f64().unwrap_or(0.0),
            values: inner
                .iter()
                .map(|v| v.to_f64().unwrap_or(f64::NAN))
                .collect(),
            valid: inner.validity_flags(),
            depths: series.cached_depths().map(<[i32]>::to_vec),
        }
    }

    /// Rebuild a series under `config`. Missing validity flags read as invalid.
    /// A `depths` array is checked for length but never installed as the cache.
    pub fn into_series(self, config: &DepthConfig) -> Result<ValueSeries<f64>> {
        if !self.version.starts_with("1.") {
            return Err(SeriesError::InvalidData(format!(
                "unsupported snapshot version {:?}",
                self.version
            )));
        }
        if self.valid.len() > self.values.len() {
            return Err(SeriesError::InvalidData(format!(
                "{} validity flags for {} values",
                self.valid.len(),
                self.values.len()
            )));
        }
        let depth_count = self.depths.as_ref().map_or(self.values.len(), Vec::len);
        if depth_count != self.values.len() {
            return Err(SeriesError::InvalidData(format!(
                "{depth_count} depths for {} values",
                self.values.len()
            )));
        }

        let mut series = ValueSeries::with_config(self.base, self.step, self.y_precision, config)
            .map_err(|e| SeriesError::InvalidData(e.to_string()))?;
        for &v in &self.values {
            series.append_fast(v);
        }
        for index in 0..self.values.len() {
            if !self.valid.get(index).copied().unwrap_or(false) {
                series.set_valid(index, false)?;
            }
        }
        Ok(series)
    }
}

/// Deserialize a snapshot and rebuild the series under `config`.
pub fn import_json(json: &str, config: &DepthConfig) -> Result<ValueSeries<f64>> {
    let wire: SeriesSnapshot = serde_json::from_str(json)?;
    wire.into_series(config)
}

/// Serialize a series to the snapshot wire format.
pub fn export_json<T: Float, F>(series: &ValueSeries<T, F>) -> Result<String> {
    let wire = SeriesSnapshot::from_series(series);
    Ok(serde_json::to_string_pretty(&wire)?)
}
