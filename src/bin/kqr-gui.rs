/*!
 * Desktop viewer for kqr - k-mer histogram browser
 *
 * - Open a histogram file (JSON, CSV or `jellyfish histo` output)
 * - Window the x/y axes with sliders or min/max/ideal buttons
 * - Trade detail for speed with the bin-size slider
 * - Export the current view as PNG or SVG
 */

use anyhow::Result;
use eframe::egui;
use kqr::viz::util::format_tick;
use kqr::viz::{ChartFrame, ChartRenderer, FrameRenderer, PlottersRenderer, normalized_domain};
use kqr::{AutoConfirm, BinSizeChange, Confirmation, Controller, ViewConfig, storage};
use std::path::{Path, PathBuf};

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([700.0, 450.0])
            .with_title("k-mer histogram - kqr"),
        ..Default::default()
    };

    let initial = std::env::args().nth(1).map(PathBuf::from);
    eframe::run_native(
        "kqr",
        options,
        Box::new(move |_cc| Ok(Box::new(KqrApp::new(initial)))),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlotFormat {
    Png,
    Svg,
}

/// A rebin waiting for the user to confirm.
#[derive(Debug, Clone, Copy)]
struct PendingBin {
    bin_size: u32,
    points: usize,
}

struct KqrApp {
    view: Option<Controller<FrameRenderer>>,
    input_path: String,
    output_path: String,
    plot_format: PlotFormat,

    // Slider positions mirror the controller between interactions.
    x_value: f64,
    y_value: f64,
    detail_value: u32,

    pending_bin: Option<PendingBin>,
    last_screen: Option<egui::Vec2>,
    status_message: String,
    error_message: String,
}

impl KqrApp {
    fn new(initial: Option<PathBuf>) -> Self {
        let home_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .to_string_lossy()
            .to_string();

        let mut app = Self {
            view: None,
            input_path: String::new(),
            output_path: home_dir,
            plot_format: PlotFormat::Png,
            x_value: 0.0,
            y_value: 0.0,
            detail_value: 0,
            pending_bin: None,
            last_screen: None,
            status_message: String::new(),
            error_message: String::new(),
        };
        if let Some(path) = initial {
            app.open(&path);
        }
        app
    }

    fn open(&mut self, path: &Path) {
        self.input_path = path.to_string_lossy().to_string();
        let loaded = storage::load_series(path)
            .and_then(|all| storage::select_series(all, None))
            .map_err(anyhow::Error::from)
            .and_then(|series| {
                let mut view = Controller::new(series, ViewConfig::default(), FrameRenderer::default());
                view.show_chart()?;
                Ok(view)
            });
        match loaded {
            Ok(view) => {
                self.view = Some(view);
                self.error_message.clear();
                self.sync_from_view();
            }
            Err(err) => {
                self.view = None;
                self.error_message = format!("Failed to open {}: {:#}", path.display(), err);
            }
        }
    }

    fn sync_from_view(&mut self) {
        if let Some(view) = &self.view {
            let sliders = view.state().sliders;
            self.x_value = sliders.x.value;
            self.y_value = sliders.y.value;
            self.detail_value = sliders.detail.value.max(0.0) as u32;
            self.status_message = view.state().status.clone();
        }
    }

    fn report(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.error_message.clear(),
            Err(err) => self.error_message = format!("{:#}", err),
        }
        self.sync_from_view();
    }

    fn export(&mut self) {
        let Some(view) = &self.view else {
            return;
        };
        let ext = match self.plot_format {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        };
        let path = PathBuf::from(&self.output_path).join(format!("kqr_chart.{ext}"));
        let cfg = view.config();
        let frame = &view.renderer().frame;

        let mut out = PlottersRenderer::new(&path, cfg.width, cfg.height).with_locale(&cfg.locale);
        out.set_domain(frame.x_domain, frame.y_domain);
        out.set_tick_format(frame.x_units, frame.y_units);
        match out.render(&frame.series) {
            Ok(()) => {
                self.status_message = format!("Wrote chart to {}", path.display());
                self.error_message.clear();
            }
            Err(err) => self.error_message = format!("Failed to create chart: {:#}", err),
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let Some(view) = self.view.as_mut() else {
            ui.label("Open a histogram file to begin.");
            return;
        };
        let sliders = view.state().sliders;
        let enabled = sliders.controls_enabled;
        let mut result: Option<Result<()>> = None;

        ui.group(|ui| {
            ui.label("X axis");
            let resp = ui.add_enabled(
                enabled,
                egui::Slider::new(&mut self.x_value, sliders.x.min..=sliders.x.max)
                    .logarithmic(true)
                    .text("max x"),
            );
            if resp.drag_stopped() || (resp.changed() && !resp.dragged()) {
                result = Some(view.set_x_scale(self.x_value));
            }
            ui.horizontal(|ui| {
                if ui.add_enabled(enabled, egui::Button::new("Min")).clicked() {
                    result = Some(view.set_min_x());
                }
                if ui.add_enabled(enabled, egui::Button::new("Ideal")).clicked() {
                    result = Some(view.set_ideal_x());
                }
                if ui.add_enabled(enabled, egui::Button::new("Max")).clicked() {
                    result = Some(view.set_max_x());
                }
            });
        });

        ui.add_space(8.0);
        ui.group(|ui| {
            ui.label("Y axis");
            let resp = ui.add_enabled(
                enabled,
                egui::Slider::new(&mut self.y_value, sliders.y.min..=sliders.y.max)
                    .logarithmic(true)
                    .text("max y"),
            );
            if resp.drag_stopped() || (resp.changed() && !resp.dragged()) {
                result = Some(view.set_y_scale(self.y_value));
            }
            ui.horizontal(|ui| {
                if ui.add_enabled(enabled, egui::Button::new("Min")).clicked() {
                    result = Some(view.set_min_y());
                }
                if ui.add_enabled(enabled, egui::Button::new("Ideal")).clicked() {
                    result = Some(view.set_ideal_y());
                }
                if ui.add_enabled(enabled, egui::Button::new("Max")).clicked() {
                    result = Some(view.set_max_y());
                }
            });
        });

        ui.add_space(8.0);
        ui.group(|ui| {
            ui.label("Detail");
            let max_detail = sliders.detail.max.max(0.0) as u32;
            let resp = ui.add_enabled(
                enabled && self.pending_bin.is_none(),
                egui::Slider::new(&mut self.detail_value, 0..=max_detail).text("detail"),
            );
            if resp.drag_stopped() || (resp.changed() && !resp.dragged()) {
                let mut asked: Option<usize> = None;
                let mut ask = |points: usize, _limit: usize| {
                    asked = Some(points);
                    Confirmation::Declined
                };
                match view.set_detail(self.detail_value, &mut ask) {
                    Ok(BinSizeChange::Declined { points }) if asked.is_some() => {
                        self.pending_bin = Some(PendingBin {
                            bin_size: view.max_bin_size().saturating_sub(self.detail_value),
                            points,
                        });
                    }
                    Ok(_) => result = Some(Ok(())),
                    Err(err) => result = Some(Err(err)),
                }
            }
            ui.label(format!("bin size {}", view.state().bin_size));
        });

        if let Some(r) = result {
            self.report(r);
        }
    }

    fn confirm_window(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending_bin else {
            return;
        };
        let mut decision: Option<Confirmation> = None;
        egui::Window::new("Show more datapoints?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "Bin size {} shows {} datapoints, which may make the chart slow.",
                    pending.bin_size, pending.points
                ));
                ui.horizontal(|ui| {
                    if ui.button("Continue").clicked() {
                        decision = Some(Confirmation::Accepted);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(Confirmation::Declined);
                    }
                });
            });

        match decision {
            Some(Confirmation::Accepted) => {
                self.pending_bin = None;
                if let Some(view) = self.view.as_mut() {
                    let r = view
                        .set_bin_size(pending.bin_size, &mut AutoConfirm(Confirmation::Accepted))
                        .map(|_| ());
                    self.report(r);
                }
            }
            Some(Confirmation::Declined) => {
                self.pending_bin = None;
                self.sync_from_view();
            }
            None => {}
        }
    }
}

impl eframe::App for KqrApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let screen = ctx.screen_rect().size();
        if self.last_screen != Some(screen) {
            self.last_screen = Some(screen);
            if let Some(view) = self.view.as_mut() {
                let r = view.redraw();
                self.report(r);
            }
        }

        egui::TopBottomPanel::top("file").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open…").clicked()
                    && let Some(path) = rfd::FileDialog::new()
                        .add_filter("histogram", &["json", "csv", "histo", "txt"])
                        .pick_file()
                {
                    self.open(&path);
                }
                ui.label(&self.input_path);
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Export to:");
                ui.text_edit_singleline(&mut self.output_path);
                if ui.button("Browse").clicked()
                    && let Some(path) = rfd::FileDialog::new().pick_folder()
                {
                    self.output_path = path.to_string_lossy().to_string();
                }
                ui.radio_value(&mut self.plot_format, PlotFormat::Png, "PNG");
                ui.radio_value(&mut self.plot_format, PlotFormat::Svg, "SVG");
                if ui
                    .add_enabled(self.view.is_some(), egui::Button::new("Export chart"))
                    .clicked()
                {
                    self.export();
                }
            });
            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
        });

        egui::SidePanel::left("controls")
            .default_width(260.0)
            .show(ctx, |ui| self.controls(ui));

        self.confirm_window(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match &self.view {
            Some(view) => paint_chart(ui, &view.renderer().frame, &view.config().locale),
            None => {
                ui.centered_and_justified(|ui| ui.label("No histogram loaded"));
            }
        });
    }
}

fn paint_chart(ui: &mut egui::Ui, frame: &ChartFrame, locale: &str) {
    const TICKS: usize = 5;
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
    let rect = response.rect;
    let plot = egui::Rect::from_min_max(
        rect.min + egui::vec2(72.0, 12.0),
        rect.max - egui::vec2(16.0, 36.0),
    );
    painter.rect_stroke(plot, 0.0, egui::Stroke::new(1.0, egui::Color32::GRAY));

    let (x0, x1) = normalized_domain(frame.x_domain);
    let (y0, y1) = normalized_domain(frame.y_domain);
    let to_screen = |x: f64, y: f64| {
        let tx = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0) as f32;
        let ty = ((y - y0) / (y1 - y0)).clamp(0.0, 1.0) as f32;
        egui::pos2(plot.left() + tx * plot.width(), plot.bottom() - ty * plot.height())
    };

    let font = egui::FontId::proportional(11.0);
    let ink = egui::Color32::DARK_GRAY;
    for i in 0..=TICKS {
        let t = i as f64 / TICKS as f64;
        let xv = x0 + (x1 - x0) * t;
        let yv = y0 + (y1 - y0) * t;
        painter.text(
            to_screen(xv, y0) + egui::vec2(0.0, 4.0),
            egui::Align2::CENTER_TOP,
            format_tick(xv, frame.x_units, locale),
            font.clone(),
            ink,
        );
        painter.text(
            to_screen(x0, yv) - egui::vec2(6.0, 0.0),
            egui::Align2::RIGHT_CENTER,
            format_tick(yv, frame.y_units, locale),
            font.clone(),
            ink,
        );
    }

    let blue = egui::Color32::from_rgb(68, 114, 196);
    for series in &frame.series {
        let pts: Vec<egui::Pos2> = series
            .values
            .iter()
            .filter(|p| p.x >= x0 && p.x <= x1)
            .map(|p| to_screen(p.x, p.y))
            .collect();
        if series.area {
            let fill = egui::Color32::from_rgba_unmultiplied(68, 114, 196, 50);
            let base = plot.bottom();
            for w in pts.windows(2) {
                let quad = vec![
                    w[0],
                    w[1],
                    egui::pos2(w[1].x, base),
                    egui::pos2(w[0].x, base),
                ];
                painter.add(egui::Shape::convex_polygon(quad, fill, egui::Stroke::NONE));
            }
        }
        painter.add(egui::Shape::line(pts, egui::Stroke::new(2.0, blue)));
    }
}
