//! Raw row → [`NormalizedContact`] mapping.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contact::{
    non_blank, AddressKind, ContactError, NormalizedContact, PermissionToSend, PhoneKind,
    StreetAddress,
};
use crate::types::Timestamp;

use super::parser::RawRow;
use super::schema::{
    COL_ADDRESS_LINE_1, COL_ADDRESS_LINE_2, COL_CITY, COL_COUNTRY, COL_DATE_CHANGED, COL_EMAIL,
    COL_EMAIL_DATE_CHANGED, COL_FIRST_NAME, COL_LAST_NAME, COL_PHONE, COL_PHONE_DATE_CHANGED,
    COL_STATE, COL_SYSTEM_RECORD_ID, COL_TODAYS_VISITORS, COL_TODAYS_VISITORS_DATE_CHANGED,
    COL_ZIP,
};

/// Custom field keys written by the importer.
pub const CF_SYSTEM_RECORD_ID: &str = "system_record_id";
pub const CF_TODAYS_VISITORS: &str = "todays_visitors";
pub const CF_TODAYS_VISITORS_CHANGED_AT: &str = "todays_visitors_changed_at";

/// What to do with address columns when `Address line 1` is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialAddressPolicy {
    /// Discard the whole address block.
    #[default]
    Drop,
    /// Keep whatever components are present, without a street.
    Keep,
}

impl std::str::FromStr for PartialAddressPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "keep" => Ok(Self::Keep),
            other => Err(format!("unknown partial address policy '{other}'")),
        }
    }
}

/// Fixed choices applied to every imported row.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingOptions {
    pub partial_address: PartialAddressPolicy,
    pub email_permission: PermissionToSend,
    pub phone_kind: PhoneKind,
    pub address_kind: AddressKind,
}

/// A row the mapper refused, with its 1-based data-row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub row: usize,
    pub reason: ContactError,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.reason)
    }
}

/// Map one row. Blank or unparsable dates fall back to `now`.
pub fn map_row(
    row: &RawRow,
    options: &MappingOptions,
    now: Timestamp,
) -> Result<NormalizedContact, RowRejection> {
    let reject = |reason| RowRejection {
        row: row.index(),
        reason,
    };

    let first_name = row.get(COL_FIRST_NAME);
    let last_name = row.get(COL_LAST_NAME);
    if first_name.is_empty() || last_name.is_empty() {
        return Err(reject(ContactError::MissingName));
    }

    let email = row.get(COL_EMAIL);
    let phone = row.get(COL_PHONE);
    if email.is_empty() && phone.is_empty() {
        return Err(reject(ContactError::MissingContactMethod));
    }

    let mut builder =
        NormalizedContact::builder(first_name, last_name, parse_date(row.get(COL_DATE_CHANGED), now))
            .email(
                email,
                options.email_permission,
                parse_date(row.get(COL_EMAIL_DATE_CHANGED), now),
            )
            .phone(
                phone,
                options.phone_kind,
                parse_date(row.get(COL_PHONE_DATE_CHANGED), now),
            )
            .custom_field(CF_SYSTEM_RECORD_ID, row.get(COL_SYSTEM_RECORD_ID));

    if let Some(address) = map_address(row, options) {
        builder = builder.address(address);
    }

    let visitors = row.get(COL_TODAYS_VISITORS);
    if !visitors.is_empty() {
        let changed_at = parse_date(row.get(COL_TODAYS_VISITORS_DATE_CHANGED), now);
        builder = builder
            .custom_field(CF_TODAYS_VISITORS, visitors)
            .custom_field(CF_TODAYS_VISITORS_CHANGED_AT, &changed_at.to_rfc3339());
    }

    builder.build().map_err(reject)
}

/// Map every row, failing closed: any rejection means no contacts.
pub fn map_rows(
    rows: &[RawRow],
    options: &MappingOptions,
    now: Timestamp,
) -> Result<Vec<NormalizedContact>, Vec<RowRejection>> {
    let mut contacts = Vec::with_capacity(rows.len());
    let mut rejections = Vec::new();

    for row in rows {
        match map_row(row, options, now) {
            Ok(contact) => contacts.push(contact),
            Err(rejection) => rejections.push(rejection),
        }
    }

    if rejections.is_empty() {
        Ok(contacts)
    } else {
        Err(rejections)
    }
}

fn map_address(row: &RawRow, options: &MappingOptions) -> Option<StreetAddress> {
    let street = non_blank(row.get(COL_ADDRESS_LINE_1));
    if street.is_none() && options.partial_address == PartialAddressPolicy::Drop {
        return None;
    }

    let address = StreetAddress {
        kind: options.address_kind,
        street,
        street2: non_blank(row.get(COL_ADDRESS_LINE_2)),
        city: non_blank(row.get(COL_CITY)),
        state: non_blank(row.get(COL_STATE)),
        postal_code: non_blank(row.get(COL_ZIP)),
        country: non_blank(row.get(COL_COUNTRY)),
    };
    (!address.is_empty()).then_some(address)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a date cell, returning `fallback` when blank or unrecognised.
pub fn parse_date(value: &str, fallback: Timestamp) -> Timestamp {
    let value = value.trim();
    if value.is_empty() {
        return fallback;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return dt.and_utc();
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(fallback)
}
