//! kqr
//!
//! A lightweight Rust library for binning, scaling, and charting k-mer frequency
//! histograms. Pairs with the `kqr` CLI and the `kqr-gui` viewer.
//!
//! ### Features
//! - Load histograms from `kmer_data` JSON, CSV, or `jellyfish histo` output
//! - Downsample to a bounded number of buckets for rendering
//! - Suggest axis ranges that cover ~98% of the k-mer volume
//! - Drive an interactive view (x/y windows, detail level) through one controller
//! - Render SVG/PNG area charts
//!
//! ### Example
//! ```no_run
//! use kqr::viz::PlottersRenderer;
//! use kqr::{Controller, ViewConfig, storage};
//!
//! let series = storage::select_series(storage::load_series("reads.histo")?, None)?;
//! let renderer = PlottersRenderer::new("reads.svg", 1000, 600);
//! let mut view = Controller::new(series, ViewConfig::default(), renderer);
//! view.show_chart()?;
//! println!("{}", view.status_text());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod binning;
pub mod config;
pub mod controller;
pub mod crossfilter;
pub mod dataset;
pub mod error;
pub mod models;
pub mod scales;
pub mod storage;
pub mod viz;

pub use config::ViewConfig;
pub use controller::{AutoConfirm, BinSizeChange, Confirm, Confirmation, Controller, ViewState};
pub use error::{KqrError, Result};
pub use models::{Point, Record, Series};
