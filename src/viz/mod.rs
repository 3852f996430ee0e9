//! Visualization: the renderer seam used by the controller, plus a plotters-backed
//! implementation that writes **SVG** or **PNG**.
//!
//! - Area line chart of the (binned) histogram
//! - Locale-aware or SI-prefixed tick labels
//! - Domains are set explicitly by the caller; points outside are clipped

pub mod text;
pub mod types;
pub mod util;

pub use types::{AxisUnits, ChartSeries, X_AXIS_LABEL, Y_AXIS_LABEL};

use anyhow::{Result, anyhow, bail};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::{AreaSeries, LineSeries};
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::{Path, PathBuf};
use std::sync::Once;

use text::truncate_to_width;
use util::{compute_left_label_area_px, format_tick, office_color};

/// Something that can draw the histogram chart.
///
/// The controller sets domains and tick formats, then hands over the filtered
/// series; `update` redraws with whatever was last rendered (e.g. after a resize).
pub trait ChartRenderer {
    fn set_domain(&mut self, x: (f64, f64), y: (f64, f64));
    fn set_tick_format(&mut self, x: AxisUnits, y: AxisUnits);
    fn render(&mut self, series: &[ChartSeries]) -> Result<()>;
    fn update(&mut self) -> Result<()>;
}

/// Everything a renderer was last told, in one place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartFrame {
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub x_units: AxisUnits,
    pub y_units: AxisUnits,
    pub series: Vec<ChartSeries>,
}

/// Keeps the latest frame in memory; used by the GUI preview and in tests.
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    pub frame: ChartFrame,
    pub renders: usize,
}

impl ChartRenderer for FrameRenderer {
    fn set_domain(&mut self, x: (f64, f64), y: (f64, f64)) {
        self.frame.x_domain = x;
        self.frame.y_domain = y;
    }

    fn set_tick_format(&mut self, x: AxisUnits, y: AxisUnits) {
        self.frame.x_units = x;
        self.frame.y_units = y;
    }

    fn render(&mut self, series: &[ChartSeries]) -> Result<()> {
        self.frame.series = series.to_vec();
        self.renders += 1;
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        self.renders += 1;
        Ok(())
    }
}

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

/// Writes the chart to a file on every render; the extension picks SVG or PNG.
///
/// A series with no points in the window still gets its axes and mesh drawn.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    out_path: PathBuf,
    width: u32,
    height: u32,
    locale: String,
    title: String,
    frame: ChartFrame,
}

impl PlottersRenderer {
    pub fn new<P: AsRef<Path>>(out_path: P, width: u32, height: u32) -> Self {
        Self {
            out_path: out_path.as_ref().to_path_buf(),
            width,
            height,
            locale: "en".into(),
            title: String::new(),
            frame: ChartFrame::default(),
        }
    }

    pub fn with_locale(mut self, tag: &str) -> Self {
        self.locale = tag.to_string();
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    fn draw(&self) -> Result<()> {
        if self.frame.series.is_empty() {
            bail!("no series to plot");
        }
        ensure_fonts_registered();
        let path_string = self.out_path.to_string_lossy().into_owned();
        let size = (self.width, self.height);

        if self.out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
            let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
            draw_chart(root, &self.frame, &self.title, &self.locale)
        } else {
            let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
            draw_chart(root, &self.frame, &self.title, &self.locale)
        }
    }
}

impl ChartRenderer for PlottersRenderer {
    fn set_domain(&mut self, x: (f64, f64), y: (f64, f64)) {
        self.frame.x_domain = x;
        self.frame.y_domain = y;
    }

    fn set_tick_format(&mut self, x: AxisUnits, y: AxisUnits) {
        self.frame.x_units = x;
        self.frame.y_units = y;
    }

    fn render(&mut self, series: &[ChartSeries]) -> Result<()> {
        self.frame.series = series.to_vec();
        self.draw()
    }

    fn update(&mut self) -> Result<()> {
        self.draw()
    }
}

/// Widen an empty or inverted range so plotters has something to map.
pub fn normalized_domain((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo { (lo, hi) } else { (lo, lo + 1.0) }
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    frame: &ChartFrame,
    title: &str,
    locale: &str,
) -> Result<()>
where
    DB: DrawingBackend,
{
    const MARGIN: u32 = 16;
    const Y_LABELS: usize = 10;

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (x0, x1) = normalized_domain(frame.x_domain);
    let (y0, y1) = normalized_domain(frame.y_domain);

    let x_label_fmt = |v: &f64| format_tick(*v, frame.x_units, locale);
    let y_label_fmt = |v: &f64| format_tick(*v, frame.y_units, locale);

    let left_label_px =
        compute_left_label_area_px(y0, y1, Y_LABELS, 12, |v| format_tick(v, frame.y_units, locale));

    let caption = {
        let t = title.trim();
        if t.is_empty() {
            frame
                .series
                .first()
                .map(|s| s.key.clone())
                .unwrap_or_else(|| "k-mer histogram".to_string())
        } else {
            t.to_string()
        }
    };
    let (root_w, _) = root.dim_in_pixel();
    let caption = truncate_to_width(&caption, 24, root_w.saturating_sub(2 * MARGIN));

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .caption(caption, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_label_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc(X_AXIS_LABEL)
        .y_desc(Y_AXIS_LABEL)
        .x_labels(12)
        .y_labels(Y_LABELS)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (idx, series) in frame.series.iter().enumerate() {
        let color = office_color(idx);
        // Clip to the domain; the area baseline sits at the bottom of the y range.
        let pts: Vec<(f64, f64)> = series
            .values
            .iter()
            .filter(|p| p.x >= x0 && p.x <= x1)
            .map(|p| (p.x, p.y.clamp(y0, y1)))
            .collect();
        if pts.is_empty() {
            continue;
        }

        if series.area {
            let fill = color.mix(0.20).filled();
            let border = color.stroke_width(2);
            chart
                .draw_series(AreaSeries::new(pts, y0, fill).border_style(border))
                .map_err(|e| anyhow!("{:?}", e))?;
        } else {
            let style = ShapeStyle {
                color,
                filled: false,
                stroke_width: 2,
            };
            chart
                .draw_series(LineSeries::new(pts, style))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
