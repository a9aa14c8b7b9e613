//! Dry look at a sheet slice: what each row would do in a real run.

use groundcheck_browser::prefilter;
use groundcheck_core::{AppConfig, Record, RecordSource, SheetRange};
use groundcheck_sheets::SheetsClient;
use serde::Serialize;

/// What a real run would do with one record before any page is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "detail", rename_all = "snake_case")]
pub(crate) enum Decision {
    Skip(String),
    Submit(&'static str),
    /// Passes the pre-filter but will fail at submission.
    InvalidCode(String),
}

#[derive(Debug, Serialize)]
pub(crate) struct PreviewRow<'a> {
    pub row: usize,
    pub record_id: &'a str,
    pub name: Option<&'a str>,
    pub decision: Decision,
}

pub(crate) fn decide(record: &Record) -> Decision {
    if let Some(outcome) = prefilter(record) {
        return Decision::Skip(outcome.detail);
    }
    match record.existence.label() {
        Some(label) => Decision::Submit(label),
        None => Decision::InvalidCode(record.existence.to_string()),
    }
}

pub(crate) fn preview_rows(records: &[Record]) -> Vec<PreviewRow<'_>> {
    records
        .iter()
        .map(|r| PreviewRow {
            row: r.row,
            record_id: &r.id,
            name: r.name.as_deref(),
            decision: decide(r),
        })
        .collect()
}

fn format_row(row: &PreviewRow<'_>) -> String {
    let decision = match &row.decision {
        Decision::Skip(reason) => format!("skip: {reason}"),
        Decision::Submit(label) => format!("submit: {label}"),
        Decision::InvalidCode(raw) => format!("fail: invalid classification code '{raw}'"),
    };
    format!(
        "{:>5}  {:<14}  {:<32}  {decision}",
        row.row,
        row.record_id,
        row.name.unwrap_or("-")
    )
}

/// Reads `range` and prints one decision per record.
///
/// # Errors
///
/// Returns an error if the sheet cannot be read.
pub(crate) async fn run_preview(
    config: &AppConfig,
    range: &SheetRange,
    json: bool,
) -> anyhow::Result<()> {
    let source = SheetsClient::from_app_config(config)?;
    let records = source.read_records(range).await?;

    if records.is_empty() {
        println!("no rows in range for sheet '{}'", range.sheet_name);
        return Ok(());
    }

    let rows = preview_rows(&records);
    if json {
        for row in &rows {
            println!("{}", serde_json::to_string(row)?);
        }
        return Ok(());
    }

    println!("{:>5}  {:<14}  {:<32}  DECISION", "ROW", "IDSBR", "NAME");
    for row in &rows {
        println!("{}", format_row(row));
    }

    let to_submit = rows
        .iter()
        .filter(|r| matches!(r.decision, Decision::Submit(_)))
        .count();
    println!();
    println!("{to_submit} of {} rows would be submitted", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use groundcheck_core::{Coordinates, ExistenceCode};

    use super::*;

    fn record(id: &str, existence: ExistenceCode, checked: bool, coords: bool) -> Record {
        Record {
            row: 7,
            id: id.to_string(),
            name: Some("Toko Sumber Rejeki".to_string()),
            existence,
            coordinates: coords.then(|| Coordinates {
                latitude: "-6.2".to_string(),
                longitude: "106.8".to_string(),
            }),
            already_checked: checked,
        }
    }

    #[test]
    fn skip_reasons_follow_the_prefilter() {
        assert_eq!(
            decide(&record("1", ExistenceCode::Found, true, true)),
            Decision::Skip("Already checked".to_string())
        );
        assert_eq!(
            decide(&record("1", ExistenceCode::Found, false, false)),
            Decision::Skip("Empty coordinates".to_string())
        );
    }

    #[test]
    fn eligible_records_show_the_option_label() {
        assert_eq!(
            decide(&record("1", ExistenceCode::Closed, false, true)),
            Decision::Submit("Closed")
        );
    }

    #[test]
    fn invalid_codes_are_flagged() {
        assert_eq!(
            decide(&record("1", ExistenceCode::Invalid("7".to_string()), false, true)),
            Decision::InvalidCode("7".to_string())
        );
    }

    #[test]
    fn json_rows_carry_tagged_decisions() {
        let records = vec![record("12345", ExistenceCode::Duplicate, false, true)];
        let rows = preview_rows(&records);
        let json = serde_json::to_value(&rows[0]).expect("serialize");

        assert_eq!(json["record_id"], "12345");
        assert_eq!(json["decision"]["action"], "submit");
        assert_eq!(json["decision"]["detail"], "Duplicate");
    }

    #[test]
    fn table_rows_use_a_dash_for_missing_names() {
        let mut r = record("12345", ExistenceCode::Found, false, true);
        r.name = None;
        let rows = preview_rows(std::slice::from_ref(&r));
        let line = format_row(&rows[0]);

        assert!(line.contains("12345"));
        assert!(line.contains("  -  "));
        assert!(line.ends_with("submit: Found"));
    }
}
