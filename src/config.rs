//! Viewer tunables, loadable from a JSON file.

use crate::error::{KqrError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs for binning, scale estimation and chart output.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Rebinning above this many points needs confirmation.
    pub target_datapoints: usize,
    /// Upper end of the detail slider.
    pub max_bin_size: u32,
    /// Lowest selectable x scale, in bins.
    pub x_min_bins: u32,
    /// `y_min_scale = y_ideal_scale / y_min_divisor`.
    pub y_min_divisor: f64,
    /// Share of the volume the ideal x scale has to cover.
    pub volume_fraction: f64,
    /// Rank (by y, ascending) of the record used as the noise floor.
    pub noise_floor_rank: usize,
    /// Scales above this switch tick labels to SI prefixes.
    pub si_threshold: f64,
    pub locale: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            target_datapoints: 10_000,
            max_bin_size: 100,
            x_min_bins: 5,
            y_min_divisor: 100.0,
            volume_fraction: 0.98,
            noise_floor_rank: 10,
            si_threshold: 1_000_000.0,
            locale: "en".into(),
            width: 1000,
            height: 600,
        }
    }
}

impl ViewConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| KqrError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("kqr.json");
        std::fs::write(&p, r#"{"target_datapoints": 500, "locale": "de"}"#).unwrap();
        let cfg = ViewConfig::load(&p).unwrap();
        assert_eq!(cfg.target_datapoints, 500);
        assert_eq!(cfg.locale, "de");
        assert_eq!(cfg.max_bin_size, 100);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("kqr.json");
        std::fs::write(&p, r#"{"bins": 3}"#).unwrap();
        assert!(ViewConfig::load(&p).is_err());
    }
}
