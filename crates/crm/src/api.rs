//! REST client for the upstream CRM v3 API.
//!
//! [`CrmApi`] is the seam the rest of the backend depends on;
//! [`ConstantContactApi`] is the [`reqwest`] implementation. Every call
//! carries the caller's access token as a Bearer credential.

use std::time::Duration;

use async_trait::async_trait;
use contacthub_core::payload::CreateContactBody;
use reqwest::Url;

use crate::error::CrmError;
use crate::types::{
    AccountSummary, ActivityStatus, BulkImportRequest, ContactListsResponse, ContactsPage,
    ContactsQuery, CrmContact, ImportResponse,
};

/// Page size requested from the contacts endpoint.
pub const CONTACTS_PAGE_LIMIT: u32 = 500;

/// Upstream CRM operations used by the backend.
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// `GET /v3/account/summary`.
    async fn account_summary(&self, token: &str) -> Result<AccountSummary, CrmError>;

    /// First page of `GET /v3/contacts`.
    async fn contacts_page(
        &self,
        token: &str,
        query: ContactsQuery,
    ) -> Result<ContactsPage, CrmError>;

    /// Follow a `_links.next.href` returned by a previous page.
    async fn contacts_page_at(&self, token: &str, href: &str) -> Result<ContactsPage, CrmError>;

    /// `POST /v3/contacts`.
    async fn create_contact(
        &self,
        token: &str,
        body: &CreateContactBody,
    ) -> Result<CrmContact, CrmError>;

    /// `GET /v3/contact_lists`.
    async fn contact_lists(&self, token: &str) -> Result<ContactListsResponse, CrmError>;

    /// `POST /v3/activities/contacts_json_import`.
    async fn import_contacts(
        &self,
        token: &str,
        request: &BulkImportRequest,
    ) -> Result<ImportResponse, CrmError>;

    /// `GET /v3/activities/{activity_id}`.
    async fn activity(&self, token: &str, activity_id: &str) -> Result<ActivityStatus, CrmError>;
}

/// HTTP client for the Constant Contact v3 API.
pub struct ConstantContactApi {
    client: reqwest::Client,
    api_url: String,
}

impl ConstantContactApi {
    /// Create a client for `api_url` (e.g. `https://api.cc.email`) with the
    /// given per-request timeout.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, CrmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// `{api_url}/v3/activities/{activity_id}` with the id escaped as one
    /// path segment.
    fn activity_url(&self, activity_id: &str) -> Result<Url, CrmError> {
        if matches!(activity_id, "" | "." | "..") {
            return Err(CrmError::InvalidActivityId(activity_id.to_string()));
        }
        let invalid = |reason: &str| CrmError::InvalidUrl {
            url: self.api_url.clone(),
            reason: reason.to_string(),
        };
        let mut url =
            Url::parse(&self.url("/v3/activities")).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base URL"))?
            .push(activity_id);
        Ok(url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, otherwise turn it
    /// into a [`CrmError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CrmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "CRM request failed");
            return Err(CrmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CrmError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CrmApi for ConstantContactApi {
    async fn account_summary(&self, token: &str) -> Result<AccountSummary, CrmError> {
        let response = self
            .client
            .get(self.url("/v3/account/summary"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn contacts_page(
        &self,
        token: &str,
        query: ContactsQuery,
    ) -> Result<ContactsPage, CrmError> {
        let mut params = vec![
            ("limit", CONTACTS_PAGE_LIMIT.to_string()),
            ("status", "all".to_string()),
            ("include_count", "true".to_string()),
        ];
        if let Some(after) = query.updated_after {
            params.push(("updated_after", after.to_rfc3339()));
        }

        let response = self
            .client
            .get(self.url("/v3/contacts"))
            .query(&params)
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn contacts_page_at(&self, token: &str, href: &str) -> Result<ContactsPage, CrmError> {
        let response = self
            .client
            .get(self.url(href))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn create_contact(
        &self,
        token: &str,
        body: &CreateContactBody,
    ) -> Result<CrmContact, CrmError> {
        let response = self
            .client
            .post(self.url("/v3/contacts"))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn contact_lists(&self, token: &str) -> Result<ContactListsResponse, CrmError> {
        let response = self
            .client
            .get(self.url("/v3/contact_lists"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn import_contacts(
        &self,
        token: &str,
        request: &BulkImportRequest,
    ) -> Result<ImportResponse, CrmError> {
        let response = self
            .client
            .post(self.url("/v3/activities/contacts_json_import"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn activity(&self, token: &str, activity_id: &str) -> Result<ActivityStatus, CrmError> {
        let response = self
            .client
            .get(self.activity_url(activity_id)?)
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn api() -> ConstantContactApi {
        ConstantContactApi::with_client(reqwest::Client::new(), "https://api.example.com/")
    }

    #[test]
    fn activity_url_escapes_the_id() {
        let url = api().activity_url("../contacts?status=all#x").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v3/activities/..%2Fcontacts%3Fstatus=all%23x"
        );
        assert_eq!(
            api().activity_url("act-42").unwrap().as_str(),
            "https://api.example.com/v3/activities/act-42"
        );
    }

    #[test]
    fn activity_url_rejects_dot_segments() {
        for id in ["", ".", ".."] {
            assert_matches!(api().activity_url(id), Err(CrmError::InvalidActivityId(_)));
        }
    }
}
