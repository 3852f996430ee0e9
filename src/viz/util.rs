//! Utility functions for visualization: colors, locale mapping, tick formatting.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

use super::text::estimate_text_width_px;
use super::types::AxisUnits;

/// Microsoft Office (2013+) chart series palette.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// Whole numbers with locale grouping; small fractions keep two decimals.
pub fn format_human(v: f64, locale: &Locale, dec_sep: char) -> String {
    if v.abs() >= 100.0 || v.fract() == 0.0 {
        return (v.round() as i64).to_formatted_string(locale);
    }
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.replace('.', &dec_sep.to_string())
}

/// SI-prefixed label with up to three significant digits: `1500000` -> `1.5M`.
pub fn format_si(v: f64) -> String {
    const PREFIXES: [(f64, &str); 5] = [
        (1e15, "P"),
        (1e12, "T"),
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
    ];
    let a = v.abs();
    let (scale, suffix) = PREFIXES
        .iter()
        .copied()
        .find(|(s, _)| a >= *s)
        .unwrap_or((1.0, ""));
    let scaled = v / scale;
    let prec = if scaled.abs() >= 100.0 {
        0
    } else if scaled.abs() >= 10.0 {
        1
    } else {
        2
    };
    let s = format!("{:.*}", prec, scaled);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    format!("{s}{suffix}")
}

/// Tick label for `v` in the given units and locale.
pub fn format_tick(v: f64, units: AxisUnits, locale_tag: &str) -> String {
    match units {
        AxisUnits::Si => format_si(v),
        AxisUnits::Human => {
            let (locale, dec_sep) = map_locale(locale_tag);
            format_human(v, locale, dec_sep)
        }
    }
}

/// Compute a tight left label area width for the Y axis (in pixels),
/// based on the formatted tick labels that will appear.
///
/// Returns a width clamped to a sensible range to avoid extremes.
pub fn compute_left_label_area_px<F>(ymin: f64, ymax: f64, ticks: usize, font_px: u32, fmt: F) -> u32
where
    F: Fn(f64) -> String,
{
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = ymin + (ymax - ymin) * t;
        max_px = max_px.max(estimate_text_width_px(&fmt(v), font_px));
    }
    // Room for tick marks and the rotated axis description.
    max_px.saturating_add(34).clamp(56, 160)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_labels_group_thousands_per_locale() {
        assert_eq!(format_tick(30_000.0, AxisUnits::Human, "en"), "30,000");
        assert_eq!(format_tick(30_000.0, AxisUnits::Human, "de"), "30.000");
        assert_eq!(format_tick(0.25, AxisUnits::Human, "de"), "0,25");
        assert_eq!(format_tick(7.0, AxisUnits::Human, "en"), "7");
    }

    #[test]
    fn si_labels_use_prefixes() {
        assert_eq!(format_si(1_500_000.0), "1.5M");
        assert_eq!(format_si(250_000.0), "250k");
        assert_eq!(format_si(12_000_000_000.0), "12G");
        assert_eq!(format_si(0.0), "0");
    }

    #[test]
    fn units_switch_above_threshold() {
        assert_eq!(AxisUnits::for_scale(1_000_000.0, 1e6), AxisUnits::Human);
        assert_eq!(AxisUnits::for_scale(1_000_001.0, 1e6), AxisUnits::Si);
    }
}
