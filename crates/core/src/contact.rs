//! The normalized contact model.
//!
//! [`NormalizedContact`] is an immutable value: it is assembled once through
//! [`NormalizedContactBuilder`], which enforces the name and contact-method
//! invariants, and never changes afterwards. Both the spreadsheet import
//! path and the single-contact create path produce it.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::Timestamp;

// ── Sub-records ──────────────────────────────────────────────────────

/// Consent state recorded with an email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionToSend {
    #[default]
    Implicit,
    Explicit,
    PendingConfirmation,
    Unsubscribed,
}

impl PermissionToSend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Implicit => "implicit",
            Self::Explicit => "explicit",
            Self::PendingConfirmation => "pending_confirmation",
            Self::Unsubscribed => "unsubscribed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    pub address: String,
    pub permission_to_send: PermissionToSend,
    pub changed_at: Timestamp,
}

/// Category tag for a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhoneKind {
    Home,
    Work,
    #[default]
    Mobile,
    Other,
}

impl PhoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Work => "work",
            Self::Mobile => "mobile",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneNumber {
    pub number: String,
    pub kind: PhoneKind,
    pub changed_at: Timestamp,
}

/// Category tag for a postal address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    #[default]
    Home,
    Work,
    Other,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Work => "work",
            Self::Other => "other",
        }
    }
}

/// A postal address. Every component except `kind` may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct StreetAddress {
    pub kind: AddressKind,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl StreetAddress {
    /// True when no component carries a value.
    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.street2,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|part| part.is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Birthday {
    month: u8,
    day: u8,
}

impl Birthday {
    pub fn new(month: u8, day: u8) -> Result<Self, ContactError> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(ContactError::InvalidBirthday { month, day });
        }
        Ok(Self { month, day })
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("Missing required name fields")]
    MissingName,

    #[error("At least one contact method (email or phone) is required")]
    MissingContactMethod,

    #[error("Invalid birthday: month {month}, day {day}")]
    InvalidBirthday { month: u8, day: u8 },
}

impl Serialize for ContactError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── NormalizedContact ────────────────────────────────────────────────

/// A validated contact ready for submission upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedContact {
    first_name: String,
    last_name: String,
    email: Option<EmailAddress>,
    phone: Option<PhoneNumber>,
    address: Option<StreetAddress>,
    job_title: Option<String>,
    company_name: Option<String>,
    birthday: Option<Birthday>,
    custom_fields: Vec<(String, String)>,
    changed_at: Timestamp,
}

impl NormalizedContact {
    pub fn builder(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        changed_at: Timestamp,
    ) -> NormalizedContactBuilder {
        NormalizedContactBuilder {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            phone: None,
            address: None,
            job_title: None,
            company_name: None,
            birthday: None,
            custom_fields: Vec::new(),
            changed_at,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    pub fn address(&self) -> Option<&StreetAddress> {
        self.address.as_ref()
    }

    pub fn job_title(&self) -> Option<&str> {
        self.job_title.as_deref()
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub fn birthday(&self) -> Option<Birthday> {
        self.birthday
    }

    pub fn custom_fields(&self) -> &[(String, String)] {
        &self.custom_fields
    }

    pub fn changed_at(&self) -> Timestamp {
        self.changed_at
    }
}

/// Collects the optional parts of a [`NormalizedContact`].
///
/// Text values are trimmed; blank values are treated as absent.
#[derive(Debug, Clone)]
pub struct NormalizedContactBuilder {
    first_name: String,
    last_name: String,
    email: Option<EmailAddress>,
    phone: Option<PhoneNumber>,
    address: Option<StreetAddress>,
    job_title: Option<String>,
    company_name: Option<String>,
    birthday: Option<Birthday>,
    custom_fields: Vec<(String, String)>,
    changed_at: Timestamp,
}

impl NormalizedContactBuilder {
    pub fn email(
        mut self,
        address: &str,
        permission_to_send: PermissionToSend,
        changed_at: Timestamp,
    ) -> Self {
        self.email = non_blank(address).map(|address| EmailAddress {
            address,
            permission_to_send,
            changed_at,
        });
        self
    }

    pub fn phone(mut self, number: &str, kind: PhoneKind, changed_at: Timestamp) -> Self {
        self.phone = non_blank(number).map(|number| PhoneNumber {
            number,
            kind,
            changed_at,
        });
        self
    }

    /// Attach an address block. An address with no components is ignored.
    pub fn address(mut self, address: StreetAddress) -> Self {
        self.address = (!address.is_empty()).then_some(address);
        self
    }

    pub fn job_title(mut self, job_title: &str) -> Self {
        self.job_title = non_blank(job_title);
        self
    }

    pub fn company_name(mut self, company_name: &str) -> Self {
        self.company_name = non_blank(company_name);
        self
    }

    pub fn birthday(mut self, birthday: Birthday) -> Self {
        self.birthday = Some(birthday);
        self
    }

    /// Add a custom field. Later values for the same key replace earlier ones.
    pub fn custom_field(mut self, key: impl Into<String>, value: &str) -> Self {
        let key = key.into();
        if let Some(value) = non_blank(value) {
            self.custom_fields.retain(|(k, _)| *k != key);
            self.custom_fields.push((key, value));
        }
        self
    }

    pub fn build(self) -> Result<NormalizedContact, ContactError> {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(ContactError::MissingName);
        }
        if self.email.is_none() && self.phone.is_none() {
            return Err(ContactError::MissingContactMethod);
        }

        Ok(NormalizedContact {
            first_name,
            last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            job_title: self.job_title,
            company_name: self.company_name,
            birthday: self.birthday,
            custom_fields: self.custom_fields,
            changed_at: self.changed_at,
        })
    }
}

/// Trim a value, mapping blank strings to `None`.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ── Create request ───────────────────────────────────────────────────

/// Address block of a [`NewContact`] request.
#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct NewAddress {
    #[serde(default)]
    pub kind: AddressKind,
    #[validate(length(max = 255))]
    pub street: Option<String>,
    #[validate(length(max = 255))]
    pub street2: Option<String>,
    #[validate(length(max = 50))]
    pub city: Option<String>,
    #[validate(length(max = 50))]
    pub state: Option<String>,
    #[validate(length(max = 50))]
    pub postal_code: Option<String>,
    #[validate(length(max = 50))]
    pub country: Option<String>,
}

/// Body of a single-contact create request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewContact {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_permission: PermissionToSend,
    #[validate(length(min = 1, max = 25))]
    pub phone: Option<String>,
    #[serde(default)]
    pub phone_kind: PhoneKind,
    #[validate(nested)]
    pub address: Option<NewAddress>,
    #[validate(length(max = 50))]
    pub job_title: Option<String>,
    #[validate(length(max = 50))]
    pub company_name: Option<String>,
    pub birthday_month: Option<u8>,
    pub birthday_day: Option<u8>,
}

impl NewContact {
    /// Convert the request into a [`NormalizedContact`] stamped with `now`.
    ///
    /// A birthday is only attached when both month and day are given.
    pub fn into_contact(self, now: Timestamp) -> Result<NormalizedContact, ContactError> {
        let mut builder = NormalizedContact::builder(self.first_name, self.last_name, now);

        if let Some(email) = &self.email {
            builder = builder.email(email, self.email_permission, now);
        }
        if let Some(phone) = &self.phone {
            builder = builder.phone(phone, self.phone_kind, now);
        }
        if let Some(address) = self.address {
            builder = builder.address(StreetAddress {
                kind: address.kind,
                street: address.street.as_deref().and_then(non_blank),
                street2: address.street2.as_deref().and_then(non_blank),
                city: address.city.as_deref().and_then(non_blank),
                state: address.state.as_deref().and_then(non_blank),
                postal_code: address.postal_code.as_deref().and_then(non_blank),
                country: address.country.as_deref().and_then(non_blank),
            });
        }
        if let Some(job_title) = &self.job_title {
            builder = builder.job_title(job_title);
        }
        if let Some(company_name) = &self.company_name {
            builder = builder.company_name(company_name);
        }
        if let (Some(month), Some(day)) = (self.birthday_month, self.birthday_day) {
            builder = builder.birthday(Birthday::new(month, day)?);
        }

        builder.build()
    }
}
