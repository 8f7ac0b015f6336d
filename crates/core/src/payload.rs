//! Upstream request bodies built from a [`NormalizedContact`].
//!
//! Absent values are omitted from the serialized output rather than sent
//! as empty strings.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::contact::{NormalizedContact, PermissionToSend};

/// Prefix for custom field keys in a flat import record.
pub const CUSTOM_FIELD_PREFIX: &str = "cf:";

/// One flat record of a bulk JSON import.
///
/// Kind-qualified keys (`mobile_phone`, `home_city`, ...) and custom fields
/// (`cf:{key}`) are collected in `fields`, which is flattened into the
/// record when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday_month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday_day: Option<u8>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl ImportRecord {
    pub fn from_contact(contact: &NormalizedContact) -> Self {
        let mut fields = BTreeMap::new();

        if let Some(phone) = contact.phone() {
            fields.insert(format!("{}_phone", phone.kind.as_str()), phone.number.clone());
        }

        if let Some(address) = contact.address() {
            let kind = address.kind.as_str();
            let parts = [
                ("street", &address.street),
                ("street2", &address.street2),
                ("city", &address.city),
                ("state", &address.state),
                ("zip", &address.postal_code),
                ("country", &address.country),
            ];
            for (suffix, value) in parts {
                if let Some(value) = value {
                    fields.insert(format!("{kind}_{suffix}"), value.clone());
                }
            }
        }

        for (key, value) in contact.custom_fields() {
            fields.insert(format!("{CUSTOM_FIELD_PREFIX}{key}"), value.clone());
        }

        let birthday = contact.birthday();
        Self {
            first_name: contact.first_name().to_string(),
            last_name: contact.last_name().to_string(),
            email: contact.email().map(|e| e.address.clone()),
            job_title: contact.job_title().map(str::to_string),
            company_name: contact.company_name().map(str::to_string),
            birthday_month: birthday.map(|b| b.month()),
            birthday_day: birthday.map(|b| b.day()),
            fields,
        }
    }
}

// ── Single create ────────────────────────────────────────────────────

/// Tag recorded upstream for contacts created by an account user.
pub const CREATE_SOURCE_ACCOUNT: &str = "Account";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateEmail {
    pub address: String,
    pub permission_to_send: PermissionToSend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePhone {
    pub phone_number: String,
    pub kind: String,
}

/// The upstream create body has a single street field, so address line 2
/// is folded into `street`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateAddress {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Nested body for creating a single contact upstream.
///
/// Custom fields are not included: the upstream addresses them by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateContactBody {
    pub first_name: String,
    pub last_name: String,
    pub create_source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<CreateEmail>,
    pub phone_numbers: Vec<CreatePhone>,
    pub street_addresses: Vec<CreateAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday_month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday_day: Option<u8>,
}

impl CreateContactBody {
    pub fn from_contact(contact: &NormalizedContact) -> Self {
        let birthday = contact.birthday();
        Self {
            first_name: contact.first_name().to_string(),
            last_name: contact.last_name().to_string(),
            create_source: CREATE_SOURCE_ACCOUNT,
            email_address: contact.email().map(|e| CreateEmail {
                address: e.address.clone(),
                permission_to_send: e.permission_to_send,
            }),
            phone_numbers: contact
                .phone()
                .map(|p| CreatePhone {
                    phone_number: p.number.clone(),
                    kind: p.kind.as_str().to_string(),
                })
                .into_iter()
                .collect(),
            street_addresses: contact
                .address()
                .map(|a| CreateAddress {
                    kind: a.kind.as_str().to_string(),
                    street: join_street(a.street.as_deref(), a.street2.as_deref()),
                    city: a.city.clone(),
                    state: a.state.clone(),
                    postal_code: a.postal_code.clone(),
                    country: a.country.clone(),
                })
                .into_iter()
                .collect(),
            job_title: contact.job_title().map(str::to_string),
            company_name: contact.company_name().map(str::to_string),
            birthday_month: birthday.map(|b| b.month()),
            birthday_day: birthday.map(|b| b.day()),
        }
    }
}

/// Join both street lines with `", "`, keeping whichever is present.
fn join_street(line1: Option<&str>, line2: Option<&str>) -> Option<String> {
    match (line1, line2) {
        (Some(line1), Some(line2)) => Some(format!("{line1}, {line2}")),
        (line1, line2) => line1.or(line2).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{AddressKind, Birthday, PhoneKind, StreetAddress};
    use chrono::Utc;
    use serde_json::json;

    fn full_contact() -> NormalizedContact {
        let now = Utc::now();
        NormalizedContact::builder("Jane", "Doe", now)
            .email("jane@example.com", PermissionToSend::Implicit, now)
            .phone("555-0100", PhoneKind::Mobile, now)
            .address(StreetAddress {
                kind: AddressKind::Home,
                street: Some("1 Main St".into()),
                street2: Some("Apt 4".into()),
                city: Some("Austin".into()),
                state: Some("TX".into()),
                postal_code: Some("78701".into()),
                ..Default::default()
            })
            .job_title("Engineer")
            .birthday(Birthday::new(4, 9).unwrap())
            .custom_field("system_record_id", "R-17")
            .build()
            .unwrap()
    }

    #[test]
    fn import_record_uses_kind_prefixed_keys() {
        let value = serde_json::to_value(ImportRecord::from_contact(&full_contact())).unwrap();
        assert_eq!(
            value,
            json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "email": "jane@example.com",
                "job_title": "Engineer",
                "birthday_month": 4,
                "birthday_day": 9,
                "mobile_phone": "555-0100",
                "home_street": "1 Main St",
                "home_street2": "Apt 4",
                "home_city": "Austin",
                "home_state": "TX",
                "home_zip": "78701",
                "cf:system_record_id": "R-17"
            })
        );
    }

    #[test]
    fn import_record_omits_absent_fields() {
        let now = Utc::now();
        let contact = NormalizedContact::builder("Jane", "Doe", now)
            .phone("555-0100", PhoneKind::Work, now)
            .build()
            .unwrap();
        let value = serde_json::to_value(ImportRecord::from_contact(&contact)).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert_eq!(object["work_phone"], "555-0100");
        assert!(!object.contains_key("email"));
        assert!(!object.contains_key("home_street"));
    }

    #[test]
    fn create_body_nests_sub_records() {
        let value = serde_json::to_value(CreateContactBody::from_contact(&full_contact())).unwrap();

        assert_eq!(value["create_source"], "Account");
        assert_eq!(value["email_address"]["address"], "jane@example.com");
        assert_eq!(value["email_address"]["permission_to_send"], "implicit");
        assert_eq!(value["phone_numbers"][0]["kind"], "mobile");
        assert_eq!(value["street_addresses"][0]["street"], "1 Main St, Apt 4");
        assert!(value["street_addresses"][0].get("street2").is_none());
        assert_eq!(value["street_addresses"][0]["postal_code"], "78701");
        assert!(value["street_addresses"][0].get("country").is_none());
        assert!(value.get("company_name").is_none());
        assert!(value.get("cf:system_record_id").is_none());
    }

    #[test]
    fn street_lines_join_when_present() {
        assert_eq!(join_street(Some("1 Main St"), None).as_deref(), Some("1 Main St"));
        assert_eq!(join_street(None, Some("Apt 4")).as_deref(), Some("Apt 4"));
        assert_eq!(join_street(None, None), None);
    }

    #[test]
    fn create_body_without_email_sends_empty_lists() {
        let now = Utc::now();
        let contact = NormalizedContact::builder("Jane", "Doe", now)
            .phone("555-0100", PhoneKind::Home, now)
            .build()
            .unwrap();
        let value = serde_json::to_value(CreateContactBody::from_contact(&contact)).unwrap();
        assert!(value.get("email_address").is_none());
        assert_eq!(value["street_addresses"], json!([]));
    }
}
