//! Histogram downsampling.

use crate::models::Point;

/// Collapse a sorted series into buckets of width `bin_size`.
///
/// Each emitted bucket sits at a multiple of `bin_size` and carries the mean
/// count (floored) of the points that fell into it. The trailing partial
/// bucket is not emitted. `bin_size < 2` returns the input unchanged.
pub fn make_bins(bin_size: u32, data: &[Point]) -> Vec<Point> {
    if bin_size < 2 {
        return data.to_vec();
    }
    let width = bin_size as f64;
    let mut out = Vec::with_capacity(data.len() / bin_size as usize + 1);
    let mut bin_total = 0.0;
    let mut target_bin = width;

    for p in data {
        if p.x > target_bin {
            out.push(Point {
                x: target_bin,
                y: (bin_total / width).floor(),
            });
            target_bin = (p.x / width).ceil() * width;
            bin_total = p.y;
        } else {
            bin_total += p.y;
        }
    }
    out
}

/// Smallest bin size that keeps a series reaching `max_x` at or under `target` buckets.
pub fn auto_bin_size(max_x: f64, target: usize) -> u32 {
    if target == 0 || !max_x.is_finite() || max_x <= target as f64 {
        return 1;
    }
    (max_x / target as f64).ceil().min(u32::MAX as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize) -> Vec<Point> {
        (1..=n)
            .map(|i| Point {
                x: i as f64,
                y: (i * 10) as f64,
            })
            .collect()
    }

    #[test]
    fn size_one_is_identity() {
        let s = series(7);
        assert_eq!(make_bins(1, &s), s);
        assert_eq!(make_bins(0, &s), s);
    }

    #[test]
    fn buckets_average_and_drop_trailing_partial() {
        // x = 1..=7, y = 10x; bins of 3: [1,2,3] -> 60/3, [4,5,6] -> 150/3, 7 dropped
        let bins = make_bins(3, &series(7));
        assert_eq!(
            bins,
            vec![Point { x: 3.0, y: 20.0 }, Point { x: 6.0, y: 50.0 }]
        );
    }

    #[test]
    fn bucket_x_values_are_multiples_and_bounded() {
        let s = series(1000);
        for size in [2u32, 7, 10, 64] {
            let bins = make_bins(size, &s);
            assert!(bins.iter().all(|p| p.x % size as f64 == 0.0));
            assert!(bins.len() <= (1000.0 / size as f64).ceil() as usize);
        }
    }

    #[test]
    fn gaps_advance_to_next_covering_multiple() {
        let s = vec![
            Point { x: 1.0, y: 4.0 },
            Point { x: 2.0, y: 4.0 },
            Point { x: 25.0, y: 8.0 },
            Point { x: 31.0, y: 1.0 },
        ];
        let bins = make_bins(10, &s);
        assert_eq!(bins[0], Point { x: 10.0, y: 0.0 });
        assert_eq!(bins[1], Point { x: 30.0, y: 0.0 });
    }

    #[test]
    fn auto_bin_size_keeps_point_count_under_target() {
        assert_eq!(auto_bin_size(500.0, 10_000), 1);
        assert_eq!(auto_bin_size(25_000.0, 10_000), 3);
        assert_eq!(auto_bin_size(10_000.0, 10_000), 1);
    }
}
