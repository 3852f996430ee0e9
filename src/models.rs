use crate::error::{KqrError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One displayed (possibly binned) histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One raw histogram bucket with its running volume.
///
/// `x` is the k-mer multiplicity (rank), `y` the number of distinct k-mers
/// seen that many times, and `volume` the sum of `y` over this record and
/// every record before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub x: f64,
    pub y: f64,
    pub volume: f64,
}

impl Record {
    pub fn point(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    #[serde(default)]
    pub name: String,
}

/// A single `{x, y}` entry as it arrives from the data producer.
///
/// Producers emit the fields either as JSON numbers or as numeric strings.
/// Accept both and normalize to `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawPoint {
    #[serde(deserialize_with = "de_f64_from_string_or_number")]
    pub x: f64,
    #[serde(deserialize_with = "de_f64_from_string_or_number")]
    pub y: f64,
}

/// Serde helper: parse `f64` from either a JSON number or a string.
fn de_f64_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct F64Visitor;

    impl<'de> Visitor<'de> for F64Visitor {
        type Value = f64;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number or a string holding a finite number")
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_str<E>(self, s: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(E::custom(format!("`{s}` is not a finite number"))),
            }
        }
    }

    deserializer.deserialize_any(F64Visitor)
}

/// Raw series (`{metadata: {name}, data: [{x, y}, ...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub metadata: SeriesMetadata,
    pub data: Vec<RawPoint>,
}

/// Accept either a list of series or a single bare series object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KmerData {
    Many(Vec<RawSeries>),
    One(RawSeries),
}

impl KmerData {
    pub fn into_series(self) -> Vec<RawSeries> {
        match self {
            KmerData::Many(v) => v,
            KmerData::One(s) => vec![s],
        }
    }
}

/// A histogram series sorted by `x`, with cumulative volumes filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub metadata: SeriesMetadata,
    pub data: Vec<Record>,
}

impl Series {
    /// Sort the raw points by `x` and compute the running volume.
    pub fn from_raw(raw: RawSeries) -> Result<Self> {
        let points = raw
            .data
            .into_iter()
            .map(|p| Point { x: p.x, y: p.y })
            .collect();
        Self::from_points(raw.metadata.name, points)
    }

    pub fn from_points(name: impl Into<String>, mut points: Vec<Point>) -> Result<Self> {
        let name = name.into();
        if points.is_empty() {
            return Err(KqrError::EmptySeries(name));
        }
        points.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut volume = 0.0;
        let data = points
            .into_iter()
            .map(|p| {
                volume += p.y;
                Record {
                    x: p.x,
                    y: p.y,
                    volume,
                }
            })
            .collect();
        Ok(Self {
            metadata: SeriesMetadata { name },
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// x of the last record (the series is never empty once built).
    pub fn max_x(&self) -> f64 {
        self.data.last().map(|r| r.x).unwrap_or(0.0)
    }

    pub fn total_volume(&self) -> f64 {
        self.data.last().map(|r| r.volume).unwrap_or(0.0)
    }

    pub fn points(&self) -> Vec<Point> {
        self.data.iter().map(Record::point).collect()
    }
}

/// Cast one string cell: integer, then float, then `true`/`false`, else text.
pub fn cast_str(s: &str) -> Value {
    let t = s.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        // "1.0" and "1e3" compare equal to whole numbers
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return Value::from(f as i64);
        }
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match t {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(s.to_string()),
    }
}

/// Cast every string field of every flat record to the narrowest matching type.
///
/// Non-string values are copied through untouched; the input is not modified.
pub fn type_cast(records: &[Map<String, Value>]) -> Vec<Map<String, Value>> {
    records
        .iter()
        .map(|rec| {
            rec.iter()
                .map(|(k, v)| {
                    let cast = match v {
                        Value::String(s) => cast_str(s),
                        other => other.clone(),
                    };
                    (k.clone(), cast)
                })
                .collect()
        })
        .collect()
}

/// Pull a numeric field out of a cast record.
pub fn numeric_field(rec: &Map<String, Value>, field: &str, line: usize) -> Result<f64> {
    match rec.get(field) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| KqrError::InvalidField {
            line,
            field: field.to_string(),
            value: n.to_string(),
        }),
        other => Err(KqrError::InvalidField {
            line,
            field: field.to_string(),
            value: other.map(|v| v.to_string()).unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cast_prefers_integers_then_floats_then_bools() {
        assert_eq!(cast_str("42"), json!(42));
        assert_eq!(cast_str("4.5"), json!(4.5));
        assert_eq!(cast_str("true"), json!(true));
        assert_eq!(cast_str("false"), json!(false));
        assert_eq!(cast_str("kmer"), json!("kmer"));
        assert_eq!(cast_str("NaN"), json!("NaN"));
    }

    #[test]
    fn whole_floats_cast_to_integers() {
        assert!(cast_str("1.0").is_i64());
        assert_eq!(cast_str("1.0"), json!(1));
        assert_eq!(cast_str("1e3"), json!(1000));
        assert!(cast_str("1.5").is_f64());
    }

    #[test]
    fn series_is_sorted_and_accumulates_volume() {
        let raw: RawSeries = serde_json::from_value(json!({
            "metadata": {"name": "k21"},
            "data": [{"x": "3", "y": "5"}, {"x": 1, "y": 10}, {"x": "2", "y": 2.5}]
        }))
        .unwrap();
        let s = Series::from_raw(raw).unwrap();
        let xs: Vec<f64> = s.data.iter().map(|r| r.x).collect();
        let vols: Vec<f64> = s.data.iter().map(|r| r.volume).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(vols, vec![10.0, 12.5, 17.5]);
        assert_eq!(s.name(), "k21");
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        let r: std::result::Result<RawPoint, _> =
            serde_json::from_value(json!({"x": "one", "y": 1}));
        assert!(r.is_err());
    }

    #[test]
    fn empty_series_is_an_error() {
        let e = Series::from_points("empty", vec![]).unwrap_err();
        assert!(matches!(e, KqrError::EmptySeries(_)));
    }
}
