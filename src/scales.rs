//! Default axis ranges derived from the cumulative-volume curve.

use crate::config::ViewConfig;
use crate::crossfilter::{Axis, Crossfilter, Dimension};
use crate::models::{Record, Series};
use log::debug;
use serde::Serialize;

/// Axis bounds and suggested defaults for one series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Scales {
    pub x_min_value: f64,
    pub x_min_scale: f64,
    pub x_max_scale: f64,
    pub x_ideal_scale: f64,
    pub y_min_value: f64,
    pub y_min_scale: f64,
    pub y_max_scale: f64,
    pub y_ideal_scale: f64,
}

/// Sum of `y` over `data[lo..=hi]`, read off the running volume.
///
/// `hi` is clamped to the last record.
pub fn calc_volume(data: &[Record], (lo, hi): (usize, usize)) -> f64 {
    let Some(last) = data.len().checked_sub(1) else {
        return 0.0;
    };
    let hi = hi.min(last);
    if lo > hi {
        return 0.0;
    }
    if lo == 0 {
        data[hi].volume
    } else {
        data[hi].volume - data[lo - 1].volume
    }
}

/// Round up to one significant digit: 734 -> 800, 0.0042 -> 0.005.
pub fn round_up(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return value;
    }
    let mut exp = value.log10().floor() as i32;
    // log10 can land a hair off for exact powers of ten
    if 10f64.powi(exp + 1) <= value {
        exp += 1;
    } else if 10f64.powi(exp) > value {
        exp -= 1;
    }
    let scaled = if exp >= 0 {
        value / 10f64.powi(exp)
    } else {
        value * 10f64.powi(-exp)
    };
    let at_exp = |digit: f64| {
        if exp >= 0 {
            digit * 10f64.powi(exp)
        } else {
            digit / 10f64.powi(-exp)
        }
    };
    // `scaled` may sit just above a whole digit from float error alone;
    // the nearest digit only wins if it still covers `value`.
    let nearest = at_exp(scaled.round());
    if nearest >= value {
        nearest
    } else {
        at_exp(scaled.ceil())
    }
}

/// Smallest record x that, counted from record 1, covers `fraction` of the volume.
///
/// Record 0 is left out of the total; it usually holds error k-mers.
fn ideal_x(data: &[Record], fraction: f64) -> f64 {
    let n = data.len();
    if n < 2 {
        return data.last().map(|r| r.x).unwrap_or(0.0);
    }
    let base = data[0].volume;
    let threshold = fraction * calc_volume(data, (1, n - 1));
    let k = data[1..].partition_point(|r| r.volume - base < threshold);
    data[(1 + k).min(n - 1)].x
}

/// Estimate scales for `original`, using `cf` (built over the same points) for Y extrema.
///
/// Clears both dimension filters on `cf`.
pub fn refresh_scales(
    original: &Series,
    cf: &mut Crossfilter,
    bin_size: u32,
    cfg: &ViewConfig,
) -> Scales {
    cf.dimension(Axis::X).filter_all();
    let mut by_y = cf.dimension(Axis::Y);
    by_y.filter_all();

    let y_max_scale = by_y.top(1).first().map(|p| p.y).unwrap_or(0.0);
    let y_min_value = by_y
        .bottom(cfg.noise_floor_rank)
        .last()
        .map(|p| p.y)
        .unwrap_or(0.0);
    let y_ideal_scale = round_up(y_max_scale);

    let scales = Scales {
        x_min_value: 0.0,
        x_min_scale: (bin_size as f64 * cfg.x_min_bins as f64).min(original.max_x()),
        x_max_scale: original.max_x(),
        x_ideal_scale: round_up(ideal_x(&original.data, cfg.volume_fraction)),
        y_min_value,
        y_min_scale: y_ideal_scale / cfg.y_min_divisor,
        y_max_scale,
        y_ideal_scale,
    };
    debug!("estimated scales for `{}`: {:?}", original.name(), scales);
    scales
}
