//! Reading histogram files and writing binned series.
//!
//! Input formats, picked by extension:
//! - `.json`: `[{"metadata": {"name": ...}, "data": [{"x": .., "y": ..}, ...]}, ...]`
//!   (a single bare series object is accepted too)
//! - `.csv`: header row with `x` and `y` columns
//! - anything else: two whitespace separated columns per line, as written by
//!   `jellyfish histo`; lines starting with `#` are skipped

use crate::error::{KqrError, Result};
use crate::models::{KmerData, Point, Series, numeric_field, type_cast};
use csv::WriterBuilder;
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> KqrError + '_ {
    move |source| KqrError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("histogram")
        .to_string()
}

/// Load every series in `path`.
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<Vec<Series>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let series = match ext.as_str() {
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        _ => load_histo(path)?,
    };
    info!("read {} series from {}", series.len(), path.display());
    Ok(series)
}

pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<Series>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(io_err(path))?;
    parse_json(&text)
}

/// Parse the `kmer_data` JSON shape.
pub fn parse_json(text: &str) -> Result<Vec<Series>> {
    let data: KmerData = serde_json::from_str(text)?;
    let raw = data.into_series();
    if raw.is_empty() {
        return Err(KqrError::NoSeries);
    }
    raw.into_iter().map(Series::from_raw).collect()
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Series>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();
    let mut rows: Vec<Map<String, Value>> = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        rows.push(
            headers
                .iter()
                .zip(rec.iter())
                .map(|(h, cell)| (h.trim().to_string(), Value::String(cell.to_string())))
                .collect(),
        );
    }
    // header is line 1
    let points = points_from_rows(&rows, 2)?;
    Ok(vec![Series::from_points(stem(path), points)?])
}

pub fn load_histo<P: AsRef<Path>>(path: P) -> Result<Vec<Series>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(io_err(path))?;
    Ok(vec![parse_histo(&stem(path), &text)?])
}

/// Parse `x y` per line.
pub fn parse_histo(name: &str, text: &str) -> Result<Series> {
    let mut points = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut cols = line.split_whitespace();
        let row: Map<String, Value> = ["x", "y"]
            .into_iter()
            .map(|k| {
                let cell = cols.next().unwrap_or("");
                (k.to_string(), Value::String(cell.to_string()))
            })
            .collect();
        let cast = type_cast(std::slice::from_ref(&row));
        points.push(Point {
            x: numeric_field(&cast[0], "x", i + 1)?,
            y: numeric_field(&cast[0], "y", i + 1)?,
        });
    }
    debug!("parsed {} histogram lines for `{}`", points.len(), name);
    Series::from_points(name, points)
}

fn points_from_rows(rows: &[Map<String, Value>], first_line: usize) -> Result<Vec<Point>> {
    type_cast(rows)
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            Ok(Point {
                x: numeric_field(rec, "x", first_line + i)?,
                y: numeric_field(rec, "y", first_line + i)?,
            })
        })
        .collect()
}

/// Pick a series by name, or the first one.
pub fn select_series(all: Vec<Series>, name: Option<&str>) -> Result<Series> {
    match name {
        Some(n) => all
            .into_iter()
            .find(|s| s.name() == n)
            .ok_or_else(|| KqrError::UnknownSeries(n.to_string())),
        None => all.into_iter().next().ok_or(KqrError::NoSeries),
    }
}

/// Save points as CSV with an `x,y` header.
pub fn save_csv<P: AsRef<Path>>(points: &[Point], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    for p in points {
        wtr.serialize(p)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[derive(Serialize)]
struct SeriesOut<'a> {
    metadata: NameOut<'a>,
    bin_size: u32,
    data: &'a [Point],
}

#[derive(Serialize)]
struct NameOut<'a> {
    name: &'a str,
}

/// Save points as pretty JSON in the same shape the loader reads.
pub fn save_json<P: AsRef<Path>>(name: &str, bin_size: u32, points: &[Point], path: P) -> Result<()> {
    let path = path.as_ref();
    let out = [SeriesOut {
        metadata: NameOut { name },
        bin_size,
        data: points,
    }];
    let s = serde_json::to_string_pretty(&out)?;
    let mut f = File::create(path).map_err(io_err(path))?;
    f.write_all(s.as_bytes()).map_err(io_err(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn histo_lines_skip_comments() {
        let s = parse_histo("h", "# k=21\n1 900\n2 40\n\n3 12\n").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.total_volume(), 952.0);
    }

    #[test]
    fn histo_reports_bad_line() {
        let e = parse_histo("h", "1 9\n2 lots\n").unwrap_err();
        match e {
            KqrError::InvalidField { line, field, .. } => {
                assert_eq!(line, 2);
                assert_eq!(field, "y");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let pts = vec![Point { x: 10.0, y: 3.0 }, Point { x: 20.0, y: 1.0 }];
        save_csv(&pts, &csvp).unwrap();
        save_json("k21", 10, &pts, &jsonp).unwrap();
        assert!(csvp.exists());
        let back = load_json(&jsonp).unwrap();
        assert_eq!(back[0].name(), "k21");
        assert_eq!(back[0].points(), pts);
    }
}
