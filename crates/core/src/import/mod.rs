//! Bulk contact import pipeline.
//!
//! Pure logic only: column validation ([`schema`]), tabular parsing
//! ([`parser`]), and row-to-contact mapping ([`mapper`]). Submission and
//! polling live in `contacthub-crm`.
//!
//! [`prepare_import`] chains the stages and fails closed: a file with any
//! format, schema, or row error yields no contacts at all.

pub mod mapper;
pub mod parser;
pub mod schema;

use serde::Serialize;

use crate::contact::NormalizedContact;
use crate::types::Timestamp;

use self::mapper::{map_rows, MappingOptions, RowRejection};
use self::parser::{read_all_rows, ParseError};
use self::schema::{validate_columns, CONTACT_IMPORT_SCHEMA};

// ── Constants ────────────────────────────────────────────────────────

pub const MIME_CSV: &str = "text/csv";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME types accepted for upload.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[MIME_CSV, MIME_XLS, MIME_XLSX];

/// Generic content types that defer to the file extension.
const GENERIC_MIME_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream", ""];

pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported file format. Please upload an Excel (.xlsx, .xls) or CSV file.";

// ── File format ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Excel workbook (`.xlsx` or legacy `.xls`).
    Spreadsheet,
    Csv,
}

impl FileFormat {
    /// Derive the format from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Derive the format from an exact MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence {
            MIME_CSV => Some(Self::Csv),
            MIME_XLS | MIME_XLSX => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Resolve the format of an upload.
    ///
    /// A specific content type must be one of [`ACCEPTED_MIME_TYPES`] or
    /// the upload is refused. The decoder is then chosen by extension, so a
    /// `.csv` sent as `application/vnd.ms-excel` still reads as CSV; the
    /// content type only decides when the name has no usable extension.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let from_mime = match content_type.map(str::trim) {
            Some(mime) if !GENERIC_MIME_TYPES.contains(&mime) => Some(Self::from_mime(mime)?),
            _ => None,
        };
        Self::from_file_name(file_name).or(from_mime)
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// Why a file could not be turned into a batch of contacts.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Unsupported file format. Please upload an Excel (.xlsx, .xls) or CSV file.")]
    UnsupportedFormat,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("File columns are invalid: {}", .0.join("; "))]
    Schema(Vec<String>),

    #[error("{} row(s) were rejected", .0.len())]
    Rows(Vec<RowRejection>),
}

impl ImportError {
    /// Every human-readable message carried by the error, in order.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::UnsupportedFormat | Self::Parse(_) => vec![self.to_string()],
            Self::Schema(errors) => errors.clone(),
            Self::Rows(rejections) => rejections.iter().map(ToString::to_string).collect(),
        }
    }
}

// ── Pipeline ─────────────────────────────────────────────────────────

/// Parse, validate, and map an uploaded file into contacts.
///
/// Stops at the first failing stage; row rejections are collected across
/// the whole file before failing.
pub fn prepare_import(
    bytes: &[u8],
    format: FileFormat,
    options: &MappingOptions,
    now: Timestamp,
) -> Result<Vec<NormalizedContact>, ImportError> {
    let (headers, rows) = read_all_rows(bytes, format)?;

    let columns = validate_columns(&headers, &CONTACT_IMPORT_SCHEMA);
    if !columns.is_valid {
        return Err(ImportError::Schema(columns.errors));
    }

    map_rows(&rows, options, now).map_err(ImportError::Rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    const HEADER: &str =
        "First name,Last/Organization/Group/Household name,Email Addresses\\Email address";

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::from_file_name("a.CSV"), Some(FileFormat::Csv));
        assert_eq!(
            FileFormat::from_file_name("contacts.xlsx"),
            Some(FileFormat::Spreadsheet)
        );
        assert_eq!(
            FileFormat::from_file_name("old.xls"),
            Some(FileFormat::Spreadsheet)
        );
        assert_eq!(FileFormat::from_file_name("notes.txt"), None);
        assert_eq!(FileFormat::from_file_name("csv"), None);
    }

    #[test]
    fn detect_refuses_unaccepted_mime() {
        assert_eq!(FileFormat::detect("contacts.csv", Some("image/png")), None);
        assert_eq!(FileFormat::detect("contacts.xlsx", Some("text/plain")), None);
    }

    #[test]
    fn detect_decodes_by_extension() {
        assert_eq!(
            FileFormat::detect("contacts.csv", Some(MIME_XLS)),
            Some(FileFormat::Csv)
        );
        assert_eq!(
            FileFormat::detect("contacts.xlsx", Some("text/csv")),
            Some(FileFormat::Spreadsheet)
        );
        assert_eq!(
            FileFormat::detect("contacts.xlsx", Some("application/octet-stream")),
            Some(FileFormat::Spreadsheet)
        );
        assert_eq!(
            FileFormat::detect("contacts.csv", None),
            Some(FileFormat::Csv)
        );
    }

    #[test]
    fn detect_falls_back_to_mime_without_extension() {
        assert_eq!(
            FileFormat::detect("upload.bin", Some("text/csv; charset=utf-8")),
            Some(FileFormat::Csv)
        );
        assert_eq!(FileFormat::detect("upload", Some(MIME_XLSX)), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::detect("upload", None), None);
    }

    #[test]
    fn csv_sent_as_excel_mime_imports() {
        let csv = format!("{HEADER}\nJane,Doe,jane@example.com\n");
        let format = FileFormat::detect("contacts.csv", Some(MIME_XLS)).unwrap();
        let contacts =
            prepare_import(csv.as_bytes(), format, &MappingOptions::default(), Utc::now()).unwrap();
        assert_eq!(contacts.len(), 1);
    }

    #[test]
    fn prepare_import_maps_valid_file() {
        let csv = format!("{HEADER}\nJane,Doe,jane@example.com\n");
        let contacts = prepare_import(
            csv.as_bytes(),
            FileFormat::Csv,
            &MappingOptions::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].first_name(), "Jane");
        assert_eq!(contacts[0].last_name(), "Doe");
        assert_eq!(contacts[0].email().unwrap().address, "jane@example.com");
        assert!(contacts[0].phone().is_none());
        assert!(contacts[0].address().is_none());
    }

    #[test]
    fn prepare_import_rejects_whole_batch_on_one_bad_row() {
        let csv = format!("{HEADER}\nJane,Doe,jane@example.com\n,Doe,x@example.com\n");
        let err = prepare_import(
            csv.as_bytes(),
            FileFormat::Csv,
            &MappingOptions::default(),
            Utc::now(),
        )
        .unwrap_err();

        assert_matches!(&err, ImportError::Rows(rejections) if rejections.len() == 1);
        assert_eq!(err.messages(), vec!["Row 2: Missing required name fields"]);
    }

    #[test]
    fn prepare_import_reports_schema_errors() {
        let csv = "First name,Nickname\nJane,JD\n";
        let err = prepare_import(
            csv.as_bytes(),
            FileFormat::Csv,
            &MappingOptions::default(),
            Utc::now(),
        )
        .unwrap_err();

        assert_matches!(&err, ImportError::Schema(errors) if errors.len() == 3);
    }

    #[test]
    fn unsupported_format_message() {
        assert_eq!(
            ImportError::UnsupportedFormat.messages(),
            vec![UNSUPPORTED_FORMAT_MESSAGE.to_string()]
        );
    }
}
