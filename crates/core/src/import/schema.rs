//! Header-row validation against the fixed contact import schema.

use serde::Serialize;

use super::parser::read_headers;
use super::{FileFormat, UNSUPPORTED_FORMAT_MESSAGE};

// ── Column names ─────────────────────────────────────────────────────

pub const COL_FIRST_NAME: &str = "First name";
pub const COL_LAST_NAME: &str = "Last/Organization/Group/Household name";
pub const COL_SYSTEM_RECORD_ID: &str = "System record ID";
pub const COL_DATE_CHANGED: &str = "Date changed";
pub const COL_EMAIL: &str = "Email Addresses\\Email address";
pub const COL_EMAIL_DATE_CHANGED: &str = "Email Addresses\\Date changed";
pub const COL_TODAYS_VISITORS: &str = "Todays Visitors Attribute\\Value";
pub const COL_TODAYS_VISITORS_DATE_CHANGED: &str = "Todays Visitors Attribute\\Date changed";
pub const COL_ADDRESS_LINE_1: &str = "Addresses\\Address line 1";
pub const COL_ADDRESS_LINE_2: &str = "Addresses\\Address line 2";
pub const COL_CITY: &str = "Addresses\\City";
pub const COL_ZIP: &str = "Addresses\\ZIP";
pub const COL_STATE: &str = "Addresses\\State abbreviation";
pub const COL_COUNTRY: &str = "Addresses\\Country abbreviation";
pub const COL_PHONE: &str = "Phones\\Number";
pub const COL_PHONE_DATE_CHANGED: &str = "Phones\\Date changed";

/// The three column sets a header row is checked against.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSchema {
    pub required: &'static [&'static str],
    pub at_least_one_of: &'static [&'static str],
    pub allowed: &'static [&'static str],
}

pub const CONTACT_IMPORT_SCHEMA: ColumnSchema = ColumnSchema {
    required: &[COL_FIRST_NAME, COL_LAST_NAME],
    at_least_one_of: &[COL_EMAIL, COL_PHONE],
    allowed: &[
        COL_FIRST_NAME,
        COL_LAST_NAME,
        COL_SYSTEM_RECORD_ID,
        COL_DATE_CHANGED,
        COL_EMAIL,
        COL_EMAIL_DATE_CHANGED,
        COL_TODAYS_VISITORS,
        COL_TODAYS_VISITORS_DATE_CHANGED,
        COL_ADDRESS_LINE_1,
        COL_ADDRESS_LINE_2,
        COL_CITY,
        COL_ZIP,
        COL_STATE,
        COL_COUNTRY,
        COL_PHONE,
        COL_PHONE_DATE_CHANGED,
    ],
};

pub const UNREADABLE_FILE_MESSAGE: &str =
    "Failed to validate file. Please check the file format and try again.";

/// Outcome of validating a file's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ColumnValidation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    fn failed(message: &str) -> Self {
        Self::from_errors(vec![message.to_string()])
    }
}

/// Check a header row against `schema`. All rules run; errors accumulate.
pub fn validate_columns<S: AsRef<str>>(headers: &[S], schema: &ColumnSchema) -> ColumnValidation {
    let present = |col: &str| headers.iter().any(|h| h.as_ref() == col);
    let mut errors = Vec::new();

    for col in schema.required {
        if !present(*col) {
            errors.push(format!("Required column \"{col}\" is missing."));
        }
    }

    if !schema.at_least_one_of.iter().any(|col| present(*col)) {
        errors.push(format!(
            "At least one of these columns is required: {}",
            schema.at_least_one_of.join(", ")
        ));
    }

    let disallowed: Vec<&str> = headers
        .iter()
        .map(|h| h.as_ref())
        .filter(|h| !schema.allowed.contains(h))
        .collect();
    if !disallowed.is_empty() {
        errors.push(format!(
            "The following columns are not allowed: {}",
            disallowed.join(", ")
        ));
    }

    ColumnValidation::from_errors(errors)
}

/// Validate an uploaded file by name and contents.
///
/// The format comes from the extension; anything other than `xlsx`, `xls`,
/// or `csv` fails without reading the bytes.
pub fn validate_file(file_name: &str, bytes: &[u8]) -> ColumnValidation {
    let Some(format) = FileFormat::from_file_name(file_name) else {
        return ColumnValidation::failed(UNSUPPORTED_FORMAT_MESSAGE);
    };
    validate_upload(bytes, format)
}

/// Validate the columns of an upload whose format is already known.
pub fn validate_upload(bytes: &[u8], format: FileFormat) -> ColumnValidation {
    match read_headers(bytes, format) {
        Ok(headers) => validate_columns(&headers, &CONTACT_IMPORT_SCHEMA),
        Err(_) => ColumnValidation::failed(UNREADABLE_FILE_MESSAGE),
    }
}
