//! Public types shared by renderers and the controller.

use crate::models::Point;
use serde::Serialize;

/// Tick label style for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AxisUnits {
    /// Locale-grouped whole numbers (`30,000`).
    #[default]
    Human,
    /// SI-prefixed (`1.5M`, `20G`).
    Si,
}

impl AxisUnits {
    /// SI labels once the visible range passes `threshold`.
    pub fn for_scale(scale: f64, threshold: f64) -> Self {
        if scale > threshold {
            AxisUnits::Si
        } else {
            AxisUnits::Human
        }
    }
}

/// One named line handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub key: String,
    pub values: Vec<Point>,
    /// Fill the area under the line.
    pub area: bool,
}

/// Axis label texts used by every renderer.
pub const X_AXIS_LABEL: &str = "k-mer multiplicity";
pub const Y_AXIS_LABEL: &str = "distinct k-mers";
