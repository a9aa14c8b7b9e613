//! Parsing of the Google Visualization (`gviz`) JSON response.
//!
//! The endpoint answers with a JavaScript callback,
//! `google.visualization.Query.setResponse({...});`, preceded by a comment.

use groundcheck_core::{SheetRange, SourceRow};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SheetsError;

#[derive(Debug, Deserialize)]
struct GvizResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Vec<GvizMessage>,
    table: Option<GvizTable>,
}

#[derive(Debug, Deserialize)]
struct GvizMessage {
    #[serde(default)]
    detailed_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GvizTable {
    #[serde(default)]
    rows: Vec<GvizRow>,
}

#[derive(Debug, Deserialize)]
struct GvizRow {
    c: Option<Vec<Option<GvizCell>>>,
}

#[derive(Debug, Deserialize)]
struct GvizCell {
    #[serde(default)]
    v: Value,
}

/// The JSON object inside the callback wrapper.
///
/// # Errors
///
/// Returns [`SheetsError::Malformed`] when there is no wrapper, e.g. when the
/// sheet is private and Google serves an HTML sign-in page instead.
pub fn unwrap_callback(body: &str) -> Result<&str, SheetsError> {
    let start = body.find('(');
    let end = body.rfind(')');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&body[start + 1..end]),
        _ => {
            let preview: String = body.chars().take(60).collect();
            Err(SheetsError::Malformed(format!(
                "expected a setResponse(...) callback, got: {preview}"
            )))
        }
    }
}

/// All table rows as raw cell values. `None` marks a row without cells.
///
/// # Errors
///
/// Returns [`SheetsError::Deserialize`] when the payload does not match the
/// `gviz` shape and [`SheetsError::Malformed`] when the query itself failed.
pub fn parse_rows(body: &str, context: &str) -> Result<Vec<Option<Vec<Value>>>, SheetsError> {
    let json = unwrap_callback(body)?;
    let response: GvizResponse =
        serde_json::from_str(json).map_err(|e| SheetsError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?;

    let Some(table) = response.table else {
        let reason = response
            .errors
            .into_iter()
            .find_map(|m| m.detailed_message.or(m.message))
            .unwrap_or_else(|| format!("query status {}", response.status));
        return Err(SheetsError::Malformed(reason));
    };

    Ok(table
        .rows
        .into_iter()
        .map(|row| {
            row.c.map(|cells| {
                cells
                    .into_iter()
                    .map(|cell| cell.map_or(Value::Null, |c| c.v))
                    .collect()
            })
        })
        .collect())
}

/// Applies `range` and the column mapping. Rows without cells are dropped;
/// row numbers stay those of the sheet.
#[must_use]
pub fn select_rows(rows: Vec<Option<Vec<Value>>>, range: &SheetRange) -> Vec<SourceRow> {
    let (start, end) = range.bounds(rows.len());
    rows.into_iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .filter_map(|(index, cells)| cells.map(|c| SourceRow::from_cells(index + 1, c)))
        .collect()
}
