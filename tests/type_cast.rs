use kqr::models::type_cast;
use serde_json::{Map, Value, json};

/// `==` between a cast value and the string it came from, with numeric coercion.
fn loosely_equals(cast: &Value, original: &str) -> bool {
    match cast {
        Value::Number(n) => original.trim().parse::<f64>().ok() == n.as_f64(),
        Value::Bool(b) => original == b.to_string(),
        Value::String(s) => s == original,
        _ => false,
    }
}

fn record(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[test]
fn every_field_stays_loosely_equal() {
    let inputs = vec![
        record(&[("x", "1"), ("y", "12345"), ("name", "k21")]),
        record(&[("x", "2.5"), ("y", "-7"), ("flag", "true")]),
        record(&[("x", "1e3"), ("y", " 42"), ("flag", "false"), ("odd", "12abc")]),
    ];
    let out = type_cast(&inputs);
    assert_eq!(out.len(), inputs.len());
    for (src, cast) in inputs.iter().zip(&out) {
        for (k, v) in src {
            let original = v.as_str().unwrap();
            assert!(
                loosely_equals(&cast[k], original),
                "{k}: {:?} vs {original:?}",
                cast[k]
            );
        }
    }
}

#[test]
fn narrowest_types_are_chosen() {
    let out = type_cast(&[record(&[
        ("i", "7"),
        ("f", "7.25"),
        ("w", "7.0"),
        ("t", "true"),
        ("f2", "false"),
        ("s", "seven"),
    ])]);
    let r = &out[0];
    assert!(r["i"].is_i64());
    assert!(r["f"].is_f64());
    assert_eq!(r["w"], json!(7));
    assert_eq!(r["t"], json!(true));
    assert_eq!(r["f2"], json!(false));
    assert_eq!(r["s"], json!("seven"));
}

#[test]
fn input_is_left_untouched_and_non_strings_pass_through() {
    let mut rec = record(&[("x", "3")]);
    rec.insert("y".into(), json!(9));
    rec.insert("z".into(), Value::Null);
    let input = vec![rec];
    let snapshot = input.clone();
    let out = type_cast(&input);
    assert_eq!(input, snapshot);
    assert_eq!(out[0]["x"], json!(3));
    assert_eq!(out[0]["y"], json!(9));
    assert_eq!(out[0]["z"], Value::Null);
}
