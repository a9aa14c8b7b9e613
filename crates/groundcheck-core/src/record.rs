use serde::Serialize;
use serde_json::Value;

use crate::source::SourceRow;

/// Domain classification of whether a business still exists at its address.
///
/// Normalized once from the raw sheet cell; anything outside the known codes
/// is kept as `Invalid` with its raw text so the failure can name it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "raw", rename_all = "snake_case")]
pub enum ExistenceCode {
    Found,
    Closed,
    Duplicate,
    Invalid(String),
}

impl ExistenceCode {
    /// Accepts numbers, numeric strings and whole floats: 1 and 2 map to
    /// `Found`, 4 to `Closed`, 9 to `Duplicate`.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(raw) = cell_text(value) else {
            return Self::Invalid("null".to_string());
        };

        match whole_number(&raw) {
            Some(1 | 2) => Self::Found,
            Some(4) => Self::Closed,
            Some(9) => Self::Duplicate,
            _ => Self::Invalid(raw),
        }
    }

    /// Human-readable domain label, or `None` for an invalid code.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Found => Some("Found"),
            Self::Closed => Some("Closed"),
            Self::Duplicate => Some("Duplicate"),
            Self::Invalid(_) => None,
        }
    }
}

impl std::fmt::Display for ExistenceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(raw) => write!(f, "{raw}"),
            other => write!(f, "{}", other.label().unwrap_or_default()),
        }
    }
}

/// Raw latitude/longitude text as it appears in the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

/// One unit of work, typed from a [`SourceRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub row: usize,
    pub id: String,
    pub name: Option<String>,
    pub existence: ExistenceCode,
    pub coordinates: Option<Coordinates>,
    pub already_checked: bool,
}

impl Record {
    #[must_use]
    pub fn from_source_row(row: &SourceRow) -> Self {
        let latitude = coordinate_text(&row.latitude);
        let longitude = coordinate_text(&row.longitude);
        let coordinates = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Self {
            row: row.row_number,
            id: cell_text(&row.idsbr).unwrap_or_default(),
            name: cell_text(&row.nama_usaha).filter(|s| !s.is_empty()),
            existence: ExistenceCode::from_value(&row.keberadaan_usaha),
            coordinates,
            already_checked: is_checked_flag(&row.cek),
        }
    }
}

/// Renders a cell as trimmed text. Whole floats print without a fraction so
/// that `12345.0` and `12345` are the same identifier.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return Some(n.to_string());
            }
            let text = n.to_string();
            Some(whole_number(&text).map_or(text, |whole| whole.to_string()))
        }
        other => Some(other.to_string()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_number(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15)
            .map(|f| f as i64)
    })
}

/// `None` for null, empty and the `-` sentinel.
fn coordinate_text(value: &Value) -> Option<String> {
    cell_text(value).filter(|s| !s.is_empty() && s != "-")
}

fn is_checked_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => whole_number(&n.to_string()) == Some(1),
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true")
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
