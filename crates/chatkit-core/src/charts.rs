//! Structured chart payloads extracted from the answer stream.
//!
//! `chart` frames carry JSON matching [`ChartPayload`]. The payload is
//! validated before it reaches the embedding surface; a frame that fails to
//! parse or validate is dropped without aborting the stream (the drop is
//! logged at debug level for observability).

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chart styles the embedding surface knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

/// One labeled series of numeric values, aligned with the chart categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// A complete chart description. Owned by the turn it was attached to and
/// never mutated after attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub kind: ChartKind,
    pub title: String,
    pub series: Vec<ChartSeries>,
    pub categories: Vec<String>,
}

impl ChartPayload {
    /// Parses and validates a `chart` frame payload.
    ///
    /// Returns `None` for malformed data; the caller drops the frame.
    pub fn parse(payload: &str) -> Option<ChartPayload> {
        let chart: ChartPayload = match serde_json::from_str(payload) {
            Ok(chart) => chart,
            Err(err) => {
                debug!("dropping malformed chart frame: {err}");
                return None;
            }
        };
        if let Err(reason) = chart.validate() {
            debug!("dropping invalid chart frame: {reason}");
            return None;
        }
        Some(chart)
    }

    /// Structural validation beyond what deserialization enforces.
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("missing or empty title".to_string());
        }
        if self.categories.is_empty() {
            return Err("missing or empty categories".to_string());
        }
        if self.series.is_empty() {
            return Err("missing or empty series".to_string());
        }
        for (i, series) in self.series.iter().enumerate() {
            if series.label.trim().is_empty() {
                return Err(format!("series {i} is missing a label"));
            }
            if series.values.is_empty() {
                return Err(format!("series {i} has no values"));
            }
            if series.values.len() != self.categories.len() {
                return Err(format!(
                    "series {i} length mismatch: categories={}, values={}",
                    self.categories.len(),
                    series.values.len()
                ));
            }
            if series.values.iter().any(|v| !v.is_finite()) {
                return Err(format!("series {i} contains a non-finite value"));
            }
        }
        Ok(())
    }
}
