//! Load-time cell coercion
//!
//! Cells read back from the log are text. A fixed set of field names is
//! known to carry measurements; those cells are parsed as `f64` when they
//! can be, and kept as text when they cannot. Parse failures never abort
//! recovery.

use serde_json::{Number, Value};

/// Field names whose cells are parsed as numbers on recovery
pub const NUMERIC_FIELDS: [&str; 8] = [
    "count",
    "rep_min_knee_angle",
    "knee_angle",
    "hip_angle",
    "best_depth_angle",
    "threshold_down",
    "threshold_up",
    "elapsed_seconds",
];

/// Returns whether `field` is in the numeric set
pub fn is_numeric_field(field: &str) -> bool {
    NUMERIC_FIELDS.contains(&field)
}

/// A recovered cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Convert into a JSON value.
    pub fn into_value(self) -> Value {
        match self {
            // finite is guaranteed by coerce_cell
            Cell::Number(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
            Cell::Text(s) => Value::String(s),
        }
    }
}

/// Decide the value type of a non-empty cell for `field`.
///
/// Non-finite values (`nan`, `inf`) have no JSON number form and stay text.
pub fn coerce_cell(field: &str, raw: String) -> Cell {
    if raw.is_empty() || !is_numeric_field(field) {
        return Cell::Text(raw);
    }
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(raw),
    }
}
