use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Record;

/// Which slice of which sheet tab a run reads. Rows are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRange {
    pub sheet_name: String,
    pub start_row: usize,
    pub max_rows: usize,
}

impl SheetRange {
    /// Zero-based index of the first row and the exclusive end index, clamped
    /// to `len` rows.
    #[must_use]
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = self.start_row.saturating_sub(1).min(len);
        let end = self
            .start_row
            .saturating_add(self.max_rows)
            .saturating_sub(1)
            .min(len);
        (start, end.max(start))
    }
}

/// One sheet row mapped positionally onto the fixed column layout.
///
/// Cells are kept as raw JSON values; [`Record::from_source_row`] does the
/// typing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub row_number: usize,
    pub idsbr: Value,
    pub nama_usaha: Value,
    pub nama_komersial_usaha: Value,
    pub cek: Value,
    pub alamat: Value,
    pub nama_sls: Value,
    pub kodepos: Value,
    pub nomor_telepon: Value,
    pub nomor_whatsapp: Value,
    pub email: Value,
    pub website: Value,
    pub latitude: Value,
    pub longitude: Value,
    pub keberadaan_usaha: Value,
}

impl SourceRow {
    /// Column headers in sheet order.
    pub const COLUMNS: [&'static str; 14] = [
        "idsbr",
        "nama_usaha",
        "nama_komersial_usaha",
        "cek",
        "alamat",
        "nama_sls",
        "kodepos",
        "nomor_telepon",
        "nomor_whatsapp",
        "email",
        "website",
        "latitude",
        "longitude",
        "keberadaan_usaha",
    ];

    /// Builds a row from positional cells. Missing trailing cells become null
    /// and extra cells are ignored.
    #[must_use]
    pub fn from_cells(row_number: usize, cells: Vec<Value>) -> Self {
        let mut cells = cells.into_iter();
        let mut next = || cells.next().unwrap_or(Value::Null);

        Self {
            row_number,
            idsbr: next(),
            nama_usaha: next(),
            nama_komersial_usaha: next(),
            cek: next(),
            alamat: next(),
            nama_sls: next(),
            kodepos: next(),
            nomor_telepon: next(),
            nomor_whatsapp: next(),
            email: next(),
            website: next(),
            latitude: next(),
            longitude: next(),
            keberadaan_usaha: next(),
        }
    }
}

/// Supplies the ordered records for a run.
#[async_trait]
pub trait RecordSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the rows selected by `range` and normalizes them, in sheet order.
    async fn read_records(&self, range: &SheetRange) -> Result<Vec<Record>, Self::Error>;
}
