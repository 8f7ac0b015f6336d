//! Wire types for upstream responses and requests.
//!
//! Contact and account payloads are passed back to the browser mostly as
//! received, so unknown fields are kept in `extra` maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Contacts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmEmailAddress {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_to_send: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A contact as returned by the upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<CrmEmailAddress>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<Link>,
}

/// One page of `GET /v3/contacts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactsPage {
    #[serde(default)]
    pub contacts: Vec<CrmContact>,
    #[serde(default)]
    pub contacts_count: Option<u64>,
    #[serde(default, rename = "_links")]
    pub links: Option<PageLinks>,
}

impl ContactsPage {
    /// Relative href of the next page, if any.
    pub fn next_href(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.next.as_ref())
            .map(|n| n.href.as_str())
    }
}

/// Filters for the first contacts page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactsQuery {
    /// Only contacts updated after this instant.
    pub updated_after: Option<contacthub_core::types::Timestamp>,
}

// ── Lists and activities ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ContactList {
    pub list_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactListsResponse {
    #[serde(default)]
    pub lists: Vec<ContactList>,
}

/// Body of `POST /v3/activities/contacts_json_import`.
#[derive(Debug, Clone, Serialize)]
pub struct BulkImportRequest {
    pub import_data: Vec<contacthub_core::payload::ImportRecord>,
    pub list_ids: Vec<String>,
    pub sms_permission_to_send: &'static str,
}

/// Response to an accepted bulk import.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportResponse {
    pub activity_id: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Response of `GET /v3/activities/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityStatus {
    #[serde(default)]
    pub activity_id: Option<String>,
    pub state: String,
    #[serde(default)]
    pub percent_done: Option<u32>,
    #[serde(default)]
    pub activity_errors: Vec<String>,
}

// ── Account and tokens ───────────────────────────────────────────────

/// `GET /v3/account/summary`, passed through to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// OAuth token endpoint response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contacts_page_reads_next_link() {
        let page: ContactsPage = serde_json::from_value(json!({
            "contacts": [{ "contact_id": "c1", "first_name": "Jane", "custom_fields": [] }],
            "contacts_count": 900,
            "_links": { "next": { "href": "/v3/contacts?cursor=abc" } }
        }))
        .unwrap();

        assert_eq!(page.contacts.len(), 1);
        assert_eq!(page.next_href(), Some("/v3/contacts?cursor=abc"));
        assert!(page.contacts[0].extra.contains_key("custom_fields"));
    }

    #[test]
    fn contacts_page_without_links_is_last() {
        let page: ContactsPage = serde_json::from_value(json!({ "contacts": [] })).unwrap();
        assert_eq!(page.next_href(), None);
    }

    #[test]
    fn contact_round_trips_unknown_fields() {
        let raw = json!({ "contact_id": "c1", "create_source": "Account" });
        let contact: CrmContact = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&contact).unwrap(), raw);
    }
}
