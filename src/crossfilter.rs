//! A small crossfilter: points indexed by X and by Y with per-dimension range filters.
//!
//! Queries on any dimension only return points that pass the filters of *every*
//! dimension, including its own, so narrowing X also narrows what a Y query sees.

use crate::models::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn key(self, p: &Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

/// Range-filterable, sorted view over a set of records.
pub trait Dimension {
    type Item;

    /// Keep records whose key lies in `lo <= key < hi`.
    fn filter_range(&mut self, lo: f64, hi: f64);
    /// Remove this dimension's filter.
    fn filter_all(&mut self);
    /// Up to `n` filtered records, largest key first.
    fn top(&self, n: usize) -> Vec<Self::Item>;
    /// Up to `n` filtered records, smallest key first.
    fn bottom(&self, n: usize) -> Vec<Self::Item>;
}

#[derive(Debug, Clone, Default)]
pub struct Crossfilter {
    points: Vec<Point>,
    by_x: Vec<usize>,
    by_y: Vec<usize>,
    x_filter: Option<(f64, f64)>,
    y_filter: Option<(f64, f64)>,
}

impl Crossfilter {
    pub fn new(points: Vec<Point>) -> Self {
        let sorted_by = |axis: Axis| {
            let mut idx: Vec<usize> = (0..points.len()).collect();
            idx.sort_by(|&a, &b| axis.key(&points[a]).total_cmp(&axis.key(&points[b])));
            idx
        };
        let by_x = sorted_by(Axis::X);
        let by_y = sorted_by(Axis::Y);
        Self {
            points,
            by_x,
            by_y,
            x_filter: None,
            y_filter: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mutable handle on one dimension.
    pub fn dimension(&mut self, axis: Axis) -> FieldDimension<'_> {
        FieldDimension { cf: self, axis }
    }

    pub fn top(&self, axis: Axis, n: usize) -> Vec<Point> {
        self.index(axis)
            .iter()
            .rev()
            .map(|&i| self.points[i])
            .filter(|p| self.passes(p))
            .take(n)
            .collect()
    }

    pub fn bottom(&self, axis: Axis, n: usize) -> Vec<Point> {
        self.index(axis)
            .iter()
            .map(|&i| self.points[i])
            .filter(|p| self.passes(p))
            .take(n)
            .collect()
    }

    fn index(&self, axis: Axis) -> &[usize] {
        match axis {
            Axis::X => &self.by_x,
            Axis::Y => &self.by_y,
        }
    }

    fn filter_slot(&mut self, axis: Axis) -> &mut Option<(f64, f64)> {
        match axis {
            Axis::X => &mut self.x_filter,
            Axis::Y => &mut self.y_filter,
        }
    }

    fn passes(&self, p: &Point) -> bool {
        let within = |f: Option<(f64, f64)>, v: f64| f.is_none_or(|(lo, hi)| lo <= v && v < hi);
        within(self.x_filter, p.x) && within(self.y_filter, p.y)
    }
}

pub struct FieldDimension<'a> {
    cf: &'a mut Crossfilter,
    axis: Axis,
}

impl Dimension for FieldDimension<'_> {
    type Item = Point;

    fn filter_range(&mut self, lo: f64, hi: f64) {
        *self.cf.filter_slot(self.axis) = Some((lo, hi));
    }

    fn filter_all(&mut self) {
        *self.cf.filter_slot(self.axis) = None;
    }

    fn top(&self, n: usize) -> Vec<Point> {
        self.cf.top(self.axis, n)
    }

    fn bottom(&self, n: usize) -> Vec<Point> {
        self.cf.bottom(self.axis, n)
    }
}
