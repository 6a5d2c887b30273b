//! Curve normalization for the control endpoints
//!
//! Expectation responses carry `curve_before` / `curve_after` in loosely typed
//! shapes. Each raw entry is classified into a [`CurveSample`] and converted
//! with a pure per-variant rule. Magnitudes that cannot be read as a finite
//! number become `0.0`.

use serde_json::Value;
use shared::{CurvePoint, SeriesPoint};

/// Keys accepted as a sample's label, in priority order
pub const LABEL_KEYS: [&str; 4] = ["beat", "name", "step", "label"];
/// Keys accepted as a sample's magnitude, in priority order
pub const MAGNITUDE_KEYS: [&str; 4] = ["value", "expectation", "score", "delta"];
/// Keys accepted as an explicit beat's label
pub const EXPLICIT_BEAT_KEYS: [&str; 3] = ["beat", "name", "label"];

/// Magnitude as found in a record
#[derive(Debug, Clone, PartialEq)]
pub enum Magnitude {
    Number(f64),
    Text(String),
    Flag(bool),
    Missing,
}

impl Magnitude {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n.as_f64().map(Magnitude::Number).unwrap_or(Magnitude::Missing),
            Some(Value::String(text)) => Magnitude::Text(text.clone()),
            Some(Value::Bool(flag)) => Magnitude::Flag(*flag),
            _ => Magnitude::Missing,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Magnitude::Number(n) => finite_or_zero(*n),
            Magnitude::Text(text) => parse_number(text),
            Magnitude::Flag(flag) => {
                if *flag {
                    1.0
                } else {
                    0.0
                }
            }
            Magnitude::Missing => 0.0,
        }
    }
}

/// One raw curve entry
#[derive(Debug, Clone, PartialEq)]
pub enum CurveSample {
    /// Plain number, labelled by position
    Number(f64),
    /// Object with optional label and magnitude aliases
    Record { label: Option<String>, magnitude: Magnitude },
    /// Bare string, parsed as a number and labelled by position
    Scalar(String),
    /// Anything else, labelled by position with magnitude zero
    Opaque,
}

impl CurveSample {
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(CurveSample::Number).unwrap_or(CurveSample::Opaque),
            Value::Object(map) => CurveSample::Record {
                label: first_present(map, &LABEL_KEYS).and_then(label_text),
                magnitude: Magnitude::from_value(first_present(map, &MAGNITUDE_KEYS)),
            },
            Value::String(text) => CurveSample::Scalar(text.clone()),
            _ => CurveSample::Opaque,
        }
    }

    /// Convert to a series point; `position` is zero-based
    pub fn to_point(&self, position: usize) -> SeriesPoint {
        let positional = (position + 1).to_string();
        match self {
            CurveSample::Number(n) => SeriesPoint { beat: positional, value: finite_or_zero(*n) },
            CurveSample::Record { label, magnitude } => SeriesPoint {
                beat: label.clone().unwrap_or(positional),
                value: magnitude.to_f64(),
            },
            CurveSample::Scalar(text) => SeriesPoint { beat: positional, value: parse_number(text) },
            CurveSample::Opaque => SeriesPoint { beat: positional, value: 0.0 },
        }
    }
}

/// Normalize a raw curve; anything but an array yields an empty series
pub fn normalize_series(raw: &Value) -> Vec<SeriesPoint> {
    match raw {
        Value::Array(entries) => entries
            .iter()
            .enumerate()
            .map(|(position, entry)| CurveSample::classify(entry).to_point(position))
            .collect(),
        _ => Vec::new(),
    }
}

/// Labels of an explicit beat list; entries without a usable label take their 1-based position
pub fn explicit_beat_labels(raw: &Value) -> Vec<String> {
    let Value::Array(entries) = raw else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| match entry {
            Value::String(label) => label.clone(),
            Value::Object(map) => first_present(map, &EXPLICIT_BEAT_KEYS)
                .and_then(label_text)
                .unwrap_or_else(|| (position + 1).to_string()),
            _ => (position + 1).to_string(),
        })
        .collect()
}

/// Align before/after curves over the union of labels
///
/// Label order is first-seen across explicit beats, then `before`, then `after`.
/// A curve lacking a label contributes `None` for it.
pub fn build_aligned_series(before: &Value, after: &Value, explicit_beats: &Value) -> Vec<CurvePoint> {
    let before = normalize_series(before);
    let after = normalize_series(after);

    let mut labels: Vec<String> = Vec::new();
    let candidates = explicit_beat_labels(explicit_beats)
        .into_iter()
        .chain(before.iter().map(|point| point.beat.clone()))
        .chain(after.iter().map(|point| point.beat.clone()));
    for label in candidates {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    labels
        .into_iter()
        .map(|beat| CurvePoint {
            before: lookup(&before, &beat),
            after: lookup(&after, &beat),
            beat,
        })
        .collect()
}

/// What a control result has to show
#[derive(Debug, Clone, PartialEq)]
pub enum CurveView {
    /// No label came back from any source
    Absent,
    Present(Vec<CurvePoint>),
}

impl CurveView {
    pub fn from_points(points: Vec<CurvePoint>) -> Self {
        if points.is_empty() {
            CurveView::Absent
        } else {
            CurveView::Present(points)
        }
    }

    /// Read `curve_before`, `curve_after` and `beats` off an expectation result
    pub fn from_result(result: &Value) -> Self {
        let field = |key: &str| result.get(key).cloned().unwrap_or(Value::Null);
        Self::from_points(build_aligned_series(
            &field("curve_before"),
            &field("curve_after"),
            &field("beats"),
        ))
    }

    pub fn points(&self) -> &[CurvePoint] {
        match self {
            CurveView::Absent => &[],
            CurveView::Present(points) => points,
        }
    }

    /// Present but every value absent
    pub fn is_all_absent(&self) -> bool {
        matches!(self, CurveView::Present(points)
            if points.iter().all(|p| p.before.is_none() && p.after.is_none()))
    }
}

fn first_present<'a>(map: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(number_label(n)),
        other => Some(other.to_string()),
    }
}

/// Integral floats print without a fraction so `2.0` and `2` label the same beat
fn number_label(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn lookup(series: &[SeriesPoint], beat: &str) -> Option<f64> {
    series.iter().find(|point| point.beat == beat).map(|point| point.value)
}
