//! The chart controller: single owner of the view state.
//!
//! All interaction (slider moves, min/max/ideal buttons, detail changes) goes
//! through a [`Controller`], which rebins, re-filters and pushes the result to
//! its [`ChartRenderer`].

use crate::binning::auto_bin_size;
use crate::config::ViewConfig;
use crate::crossfilter::{Axis, Dimension};
use crate::dataset::{Dataset, OriginalData, update_crossfilter};
use crate::models::Series;
use crate::scales::{self, Scales};
use crate::viz::{AxisUnits, ChartRenderer, ChartSeries};
use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;

/// Answer to "rebinning produces N points, go ahead?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
}

/// Asked before committing a rebin that exceeds the datapoint target.
pub trait Confirm {
    fn confirm(&mut self, points: usize, limit: usize) -> Confirmation;
}

impl<F> Confirm for F
where
    F: FnMut(usize, usize) -> Confirmation,
{
    fn confirm(&mut self, points: usize, limit: usize) -> Confirmation {
        self(points, limit)
    }
}

/// Fixed answer, for non-interactive callers.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub Confirmation);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _points: usize, _limit: usize) -> Confirmation {
        self.0
    }
}

/// What `set_bin_size` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinSizeChange {
    Unchanged,
    Applied { points: usize },
    Declined { points: usize },
}

/// A bounded slider; values are clamped into `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Slider {
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

impl Slider {
    pub fn set(&mut self, min: f64, max: f64, value: f64) {
        self.min = min;
        self.max = max.max(min);
        self.value = value.clamp(self.min, self.max);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SliderPanel {
    pub x: Slider,
    pub y: Slider,
    /// Inverted bin size: further right means finer detail.
    pub detail: Slider,
    /// Scale controls stay disabled until data has been charted.
    pub controls_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViewState {
    pub x_scale: Option<f64>,
    pub y_scale: Option<f64>,
    pub scales: Scales,
    pub bin_size: u32,
    pub x_axis_units: AxisUnits,
    pub y_axis_units: AxisUnits,
    pub datapoints_shown: usize,
    pub datapoints_available: usize,
    pub sliders: SliderPanel,
    pub status: String,
}

pub struct Controller<R: ChartRenderer> {
    config: ViewConfig,
    state: ViewState,
    original: OriginalData,
    dataset: Dataset,
    renderer: R,
    max_bin_size: u32,
    chart_created: bool,
}

impl<R: ChartRenderer> Controller<R> {
    /// Index `series` at a bin size that keeps it under the datapoint target.
    pub fn new(series: Series, config: ViewConfig, renderer: R) -> Self {
        let bin_size = auto_bin_size(series.max_x(), config.target_datapoints);
        let mut original = OriginalData::new(series);
        let mut dataset = Dataset::binned(&original.series, bin_size);
        update_crossfilter(&mut dataset, &mut original);
        info!(
            "loaded `{}`: {} records, initial bin size {} ({} points)",
            original.series.name(),
            original.series.len(),
            bin_size,
            dataset.len()
        );
        let max_bin_size = config.max_bin_size.max(bin_size);
        Self {
            config,
            state: ViewState {
                bin_size,
                ..ViewState::default()
            },
            original,
            dataset,
            renderer,
            max_bin_size,
            chart_created: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn original(&self) -> &Series {
        &self.original.series
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Largest bin size the detail slider can reach: the configured maximum,
    /// widened when the initial bin size already exceeds it.
    pub fn max_bin_size(&self) -> u32 {
        self.max_bin_size
    }

    fn x_scale(&self) -> f64 {
        self.state
            .x_scale
            .unwrap_or(self.original.series.max_x())
    }

    fn y_scale(&self) -> f64 {
        self.state.y_scale.unwrap_or(self.state.scales.y_ideal_scale)
    }

    /// Re-estimate axis bounds from the original series; unset scales take the ideal.
    pub fn refresh_scales(&mut self) {
        let scales = scales::refresh_scales(
            &self.original.series,
            &mut self.original.crossfilter,
            self.state.bin_size,
            &self.config,
        );
        self.state.scales = scales;
        if self.state.x_scale.is_none() {
            self.state.x_scale = Some(scales.x_ideal_scale);
        }
        if self.state.y_scale.is_none() {
            self.state.y_scale = Some(scales.y_ideal_scale);
        }
    }

    /// Window the displayed data to `[0, x_scale]` and wrap it as a chart series.
    pub fn filter_data(&mut self) -> Vec<ChartSeries> {
        let x_scale = self.x_scale();
        let cf = &mut self.dataset.crossfilter;
        cf.dimension(Axis::X).filter_range(0.0, x_scale + 1.0);
        cf.dimension(Axis::Y).filter_all();
        vec![ChartSeries {
            key: self.original.series.name().to_string(),
            values: cf.bottom(Axis::X, x_scale as usize),
            area: true,
        }]
    }

    /// First draw: estimate scales, jump to the ideal view and render.
    pub fn show_chart(&mut self) -> Result<()> {
        if self.chart_created {
            return self.redraw();
        }
        self.chart_created = true;
        if self.dataset.ready {
            self.refresh_scales();
            let s = self.state.scales;
            self.state.x_scale = Some(s.x_ideal_scale);
            self.state.y_scale = Some(s.y_ideal_scale);
            self.state.x_axis_units = AxisUnits::for_scale(s.x_ideal_scale, self.config.si_threshold);
            self.state.y_axis_units = AxisUnits::for_scale(s.y_ideal_scale, self.config.si_threshold);
            self.refresh_chart()?;
        }
        Ok(())
    }

    /// Re-filter and re-render with the current state. Does nothing before `show_chart`.
    pub fn refresh_chart(&mut self) -> Result<()> {
        if !self.chart_created {
            return Ok(());
        }
        let x_scale = self.x_scale();
        let y_scale = self.y_scale();

        let series = self.filter_data();
        self.state.datapoints_shown = series.iter().map(|s| s.values.len()).sum();

        let ocf = &mut self.original.crossfilter;
        ocf.dimension(Axis::X).filter_range(0.0, x_scale + 1.0);
        ocf.dimension(Axis::Y).filter_all();
        self.state.datapoints_available = ocf.bottom(Axis::X, x_scale as usize).len();

        self.renderer
            .set_tick_format(self.state.x_axis_units, self.state.y_axis_units);
        self.renderer
            .set_domain((self.state.scales.x_min_value, x_scale), (0.0, y_scale));
        self.renderer.render(&series)?;

        self.state.status = self.status_text();
        debug!("{}", self.state.status);
        self.update_sliders();
        Ok(())
    }

    /// Redraw the last rendered frame (window resize and the like).
    pub fn redraw(&mut self) -> Result<()> {
        self.renderer.update()
    }

    /// Push current values and bounds into the slider models and enable the controls.
    pub fn update_sliders(&mut self) {
        let s = self.state.scales;
        let x_scale = self.x_scale();
        let y_scale = self.y_scale();
        let max_bin = self.max_bin_size as f64;
        let sliders = &mut self.state.sliders;
        sliders.x.set(s.x_min_scale, s.x_max_scale, x_scale);
        sliders
            .y
            .set(s.y_min_scale, s.y_ideal_scale.max(s.y_max_scale), y_scale);
        sliders.detail.set(
            0.0,
            max_bin - 1.0,
            max_bin - self.state.bin_size as f64,
        );
        sliders.controls_enabled = true;
    }

    pub fn status_text(&self) -> String {
        format!(
            "Showing {} of {} datapoints (bin size {})",
            self.state.datapoints_shown, self.state.datapoints_available, self.state.bin_size
        )
    }

    pub fn set_x_scale(&mut self, value: f64) -> Result<()> {
        self.state.x_scale = Some(value);
        self.state.x_axis_units = AxisUnits::for_scale(value, self.config.si_threshold);
        self.refresh_chart()
    }

    pub fn set_y_scale(&mut self, value: f64) -> Result<()> {
        self.state.y_scale = Some(value);
        self.state.y_axis_units = AxisUnits::for_scale(value, self.config.si_threshold);
        self.refresh_chart()
    }

    /// Rebin the original series. Above the datapoint target `confirm` decides;
    /// a decline leaves data, index and bin size as they were.
    pub fn set_bin_size<C: Confirm + ?Sized>(
        &mut self,
        bin_size: u32,
        confirm: &mut C,
    ) -> Result<BinSizeChange> {
        let new_bin_size = bin_size.max(1);
        if new_bin_size == self.state.bin_size {
            return Ok(BinSizeChange::Unchanged);
        }

        let candidate = Dataset::binned(&self.original.series, new_bin_size);
        let points = candidate.len();
        let limit = self.config.target_datapoints;
        if points > limit && confirm.confirm(points, limit) == Confirmation::Declined {
            warn!(
                "bin size {} would show {} points (limit {}); keeping bin size {}",
                new_bin_size, points, limit, self.state.bin_size
            );
            return Ok(BinSizeChange::Declined { points });
        }

        self.dataset = candidate;
        update_crossfilter(&mut self.dataset, &mut self.original);
        self.state.bin_size = new_bin_size;
        info!("bin size set to {} ({} points)", new_bin_size, points);

        self.refresh_scales();
        self.refresh_chart()?;
        Ok(BinSizeChange::Applied { points })
    }

    /// Detail slider callback; the slider runs opposite to the bin size.
    pub fn set_detail<C: Confirm + ?Sized>(
        &mut self,
        slider_value: u32,
        confirm: &mut C,
    ) -> Result<BinSizeChange> {
        let bin_size = self.max_bin_size.saturating_sub(slider_value);
        self.set_bin_size(bin_size, confirm)
    }

    pub fn set_min_x(&mut self) -> Result<()> {
        self.set_x_scale(self.state.scales.x_min_scale)
    }

    pub fn set_max_x(&mut self) -> Result<()> {
        self.set_x_scale(self.state.scales.x_max_scale)
    }

    pub fn set_ideal_x(&mut self) -> Result<()> {
        self.set_x_scale(self.state.scales.x_ideal_scale)
    }

    pub fn set_min_y(&mut self) -> Result<()> {
        self.set_y_scale(self.state.scales.y_min_scale)
    }

    pub fn set_max_y(&mut self) -> Result<()> {
        self.set_y_scale(self.state.scales.y_max_scale)
    }

    pub fn set_ideal_y(&mut self) -> Result<()> {
        self.set_y_scale(self.state.scales.y_ideal_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use crate::viz::FrameRenderer;

    fn controller(n: usize) -> Controller<FrameRenderer> {
        let pts = (1..=n)
            .map(|i| Point {
                x: i as f64,
                y: (1000 / i) as f64,
            })
            .collect();
        let series = Series::from_points("k25", pts).unwrap();
        Controller::new(series, ViewConfig::default(), FrameRenderer::default())
    }

    #[test]
    fn refresh_before_show_is_a_no_op() {
        let mut c = controller(50);
        c.refresh_chart().unwrap();
        assert_eq!(c.renderer().renders, 0);
        assert!(!c.state().sliders.controls_enabled);
    }

    #[test]
    fn show_chart_jumps_to_ideal_scales() {
        let mut c = controller(500);
        c.show_chart().unwrap();
        let st = c.state();
        assert_eq!(st.x_scale, Some(st.scales.x_ideal_scale));
        assert_eq!(st.y_scale, Some(st.scales.y_ideal_scale));
        assert_eq!(c.renderer().frame.x_domain, (0.0, st.scales.x_ideal_scale));
        assert!(st.sliders.controls_enabled);
        assert!(c.renderer().frame.series[0].area);
    }

    #[test]
    fn filter_windows_x_only() {
        let mut c = controller(200);
        c.show_chart().unwrap();
        c.set_x_scale(20.0).unwrap();
        let vals = &c.renderer().frame.series[0].values;
        assert_eq!(vals.len(), 20);
        assert!(vals.iter().all(|p| p.x <= 20.0));
    }

    #[test]
    fn sliders_match_state_on_short_series() {
        let mut c = controller(3);
        c.show_chart().unwrap();
        c.set_min_x().unwrap();
        let st = c.state();
        assert_eq!(st.x_scale, Some(3.0));
        assert_eq!(st.sliders.x.value, 3.0);
    }

    #[test]
    fn detail_range_covers_large_initial_bin_size() {
        let cfg = ViewConfig {
            target_datapoints: 100,
            max_bin_size: 10,
            ..ViewConfig::default()
        };
        let pts = (1..=5000)
            .map(|i| Point {
                x: i as f64,
                y: 1.0,
            })
            .collect();
        let series = Series::from_points("wide", pts).unwrap();
        let mut c = Controller::new(series, cfg, FrameRenderer::default());
        c.show_chart().unwrap();
        assert_eq!(c.state().bin_size, 50);
        assert_eq!(c.max_bin_size(), 50);
        assert_eq!(c.state().sliders.detail.value, 0.0);
        assert_eq!(c.state().sliders.detail.max, 49.0);

        c.set_detail(40, &mut AutoConfirm(Confirmation::Accepted)).unwrap();
        assert_eq!(c.state().bin_size, 10);
        assert_eq!(c.state().sliders.detail.value, 40.0);
    }

    #[test]
    fn slider_values_are_clamped() {
        let mut s = Slider::default();
        s.set(5.0, 10.0, 50.0);
        assert_eq!(s.value, 10.0);
        s.set(5.0, 10.0, 1.0);
        assert_eq!(s.value, 5.0);
    }
}
