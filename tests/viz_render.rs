use std::fs;
use std::path::PathBuf;
use kqr::viz::{AxisUnits, ChartRenderer, ChartSeries, PlottersRenderer};
use kqr::{AutoConfirm, BinSizeChange, Confirmation, Controller, Point, Series, ViewConfig};

fn sample_series() -> ChartSeries {
    ChartSeries {
        key: "k21".into(),
        values: (1..=40)
            .map(|i| Point {
                x: i as f64,
                y: (2_000 / i) as f64,
            })
            .collect(),
        area: true,
    }
}

fn write_and_check<F: Fn(&PathBuf)>(maker: F, name: &str) {
    let tmp = std::env::temp_dir();
    let path: PathBuf = tmp.join(format!("kqr_viz_{}", name));
    maker(&path);
    let meta = fs::metadata(&path).expect("file created");
    assert!(meta.len() > 0, "chart has content");
    fs::remove_file(&path).ok();
}

#[test]
fn svg_and_png_are_written() {
    for (name, units) in [("human.svg", AxisUnits::Human), ("si.png", AxisUnits::Si)] {
        write_and_check(
            |p| {
                let mut r = PlottersRenderer::new(p, 800, 480).with_title("Test Chart");
                r.set_domain((0.0, 40.0), (0.0, 2_000.0));
                r.set_tick_format(units, units);
                r.render(&[sample_series()]).unwrap();
            },
            name,
        );
    }
}

#[test]
fn line_series_without_area() {
    write_and_check(
        |p| {
            let mut s = sample_series();
            s.area = false;
            let mut r = PlottersRenderer::new(p, 640, 400).with_locale("de");
            r.set_domain((0.0, 20.0), (0.0, 500.0));
            r.render(&[s]).unwrap();
            r.update().unwrap();
        },
        "line.svg",
    );
}

#[test]
fn no_series_is_error() {
    let tmp = std::env::temp_dir().join("kqr_viz_none.svg");
    let mut r = PlottersRenderer::new(&tmp, 800, 480);
    assert!(r.render(&[]).is_err());
}

#[test]
fn empty_window_still_draws_axes() {
    write_and_check(
        |p| {
            let mut r = PlottersRenderer::new(p, 800, 480);
            r.set_domain((0.0, 50.0), (0.0, 1_000.0));
            let empty = ChartSeries {
                key: "none".into(),
                values: vec![],
                area: true,
            };
            r.render(&[empty]).unwrap();
        },
        "empty.svg",
    );
}

#[test]
fn bin_size_beyond_series_end_renders_empty_chart() {
    let pts = (1..=300)
        .map(|i| Point {
            x: i as f64,
            y: 5_000.0 / i as f64,
        })
        .collect();
    let series = Series::from_points("k31", pts).unwrap();
    write_and_check(
        |p| {
            let renderer = PlottersRenderer::new(p, 800, 480);
            let mut view = Controller::new(series.clone(), ViewConfig::default(), renderer);
            view.show_chart().unwrap();
            let change = view
                .set_bin_size(400, &mut AutoConfirm(Confirmation::Declined))
                .unwrap();
            assert_eq!(change, BinSizeChange::Applied { points: 0 });
            assert_eq!(view.state().datapoints_shown, 0);
            assert_eq!(view.state().bin_size, 400);
        },
        "bin_beyond_end.svg",
    );
}

#[test]
fn x_scale_below_first_bucket_renders_empty_chart() {
    let pts = (1..=300)
        .map(|i| Point {
            x: i as f64,
            y: 5_000.0 / i as f64,
        })
        .collect();
    let series = Series::from_points("k31", pts).unwrap();
    write_and_check(
        |p| {
            let renderer = PlottersRenderer::new(p, 800, 480);
            let mut view = Controller::new(series.clone(), ViewConfig::default(), renderer);
            view.show_chart().unwrap();
            view.set_bin_size(10, &mut AutoConfirm(Confirmation::Accepted))
                .unwrap();
            view.set_x_scale(5.0).unwrap();
            assert_eq!(view.state().datapoints_shown, 0);
        },
        "below_first_bucket.svg",
    );
}

#[test]
fn controller_drives_plotters_renderer() {
    let pts = (1..=500)
        .map(|i| Point {
            x: i as f64,
            y: 10_000.0 / i as f64,
        })
        .collect();
    let series = Series::from_points("k25", pts).unwrap();
    write_and_check(
        |p| {
            let renderer = PlottersRenderer::new(p, 1000, 600);
            let mut view = Controller::new(series.clone(), ViewConfig::default(), renderer);
            view.show_chart().unwrap();
            view.set_max_x().unwrap();
            assert_eq!(view.renderer().out_path(), p.as_path());
        },
        "controller.svg",
    );
}
