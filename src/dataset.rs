use crate::binning::make_bins;
use crate::crossfilter::Crossfilter;
use crate::models::{Point, Series};

/// The series currently on screen, possibly binned.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub data: Vec<Point>,
    pub crossfilter: Crossfilter,
    pub ready: bool,
}

impl Dataset {
    /// Bin `original` at `bin_size`; the crossfilter is built by [`update_crossfilter`].
    pub fn binned(original: &Series, bin_size: u32) -> Self {
        Self {
            data: make_bins(bin_size, &original.points()),
            crossfilter: Crossfilter::default(),
            ready: false,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The unbinned series as loaded, with its own index for comparisons.
#[derive(Debug, Clone)]
pub struct OriginalData {
    pub series: Series,
    pub crossfilter: Crossfilter,
}

impl OriginalData {
    pub fn new(series: Series) -> Self {
        let crossfilter = Crossfilter::new(series.points());
        Self {
            series,
            crossfilter,
        }
    }
}

/// Rebuild the indexes over the displayed and the original data and mark the dataset ready.
pub fn update_crossfilter(dataset: &mut Dataset, original: &mut OriginalData) {
    dataset.crossfilter = Crossfilter::new(dataset.data.clone());
    original.crossfilter = Crossfilter::new(original.series.points());
    dataset.ready = true;
}
