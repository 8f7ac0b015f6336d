//! In-memory [`CrmApi`] used by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use contacthub_core::payload::CreateContactBody;

use crate::api::CrmApi;
use crate::error::CrmError;
use crate::types::{
    AccountSummary, ActivityStatus, BulkImportRequest, ContactList, ContactListsResponse,
    ContactsPage, ContactsQuery, CrmContact, ImportResponse,
};

#[derive(Default)]
pub struct FakeCrm {
    pub lists: Vec<String>,
    pub pages: Mutex<VecDeque<ContactsPage>>,
    pub activity_states: Mutex<VecDeque<Result<String, u16>>>,
    pub calls: Mutex<Vec<String>>,
    pub imports: Mutex<Vec<BulkImportRequest>>,
}

impl FakeCrm {
    pub fn with_lists(lists: &[&str]) -> Self {
        Self {
            lists: lists.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl CrmApi for FakeCrm {
    async fn account_summary(&self, _token: &str) -> Result<AccountSummary, CrmError> {
        self.record("account_summary");
        Ok(serde_json::from_value(serde_json::json!({})).unwrap())
    }

    async fn contacts_page(
        &self,
        _token: &str,
        _query: ContactsQuery,
    ) -> Result<ContactsPage, CrmError> {
        self.record("contacts_page");
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn contacts_page_at(&self, _token: &str, href: &str) -> Result<ContactsPage, CrmError> {
        self.record(format!("contacts_page_at {href}"));
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn create_contact(
        &self,
        _token: &str,
        _body: &CreateContactBody,
    ) -> Result<CrmContact, CrmError> {
        self.record("create_contact");
        Ok(serde_json::from_value(serde_json::json!({ "contact_id": "c1" })).unwrap())
    }

    async fn contact_lists(&self, _token: &str) -> Result<ContactListsResponse, CrmError> {
        self.record("contact_lists");
        Ok(ContactListsResponse {
            lists: self
                .lists
                .iter()
                .map(|id| ContactList {
                    list_id: id.clone(),
                    name: None,
                })
                .collect(),
        })
    }

    async fn import_contacts(
        &self,
        _token: &str,
        request: &BulkImportRequest,
    ) -> Result<ImportResponse, CrmError> {
        self.record("import_contacts");
        self.imports.lock().unwrap().push(request.clone());
        Ok(ImportResponse {
            activity_id: "act-1".to_string(),
            state: Some("initialized".to_string()),
        })
    }

    async fn activity(&self, _token: &str, activity_id: &str) -> Result<ActivityStatus, CrmError> {
        self.record(format!("activity {activity_id}"));
        let next = self
            .activity_states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok("completed".to_string()));
        match next {
            Ok(state) => Ok(ActivityStatus {
                activity_id: Some(activity_id.to_string()),
                state,
                percent_done: None,
                activity_errors: Vec::new(),
            }),
            Err(status) => Err(CrmError::Api {
                status,
                body: "boom".to_string(),
            }),
        }
    }
}
