#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use contacthub_api::config::ServerConfig;
use contacthub_api::router::build_app_router;
use contacthub_api::state::AppState;
use contacthub_core::import::mapper::PartialAddressPolicy;
use contacthub_core::payload::CreateContactBody;
use contacthub_core::store::MemoryStore;
use contacthub_crm::config::{CrmConfig, OAuthConfig};
use contacthub_crm::types::{
    AccountSummary, ActivityStatus, BulkImportRequest, ContactList, ContactListsResponse,
    ContactsPage, ContactsQuery, CrmContact, ImportResponse, TokenResponse,
};
use contacthub_crm::{CrmApi, CrmError, OAuthApi};

pub const TOKEN: &str = "test-access-token";
pub const BOUNDARY: &str = "contacthub-test-boundary";

/// Header row accepted by the import schema.
pub const CSV_HEADER: &str =
    "First name,Last/Organization/Group/Household name,Email Addresses\\Email address,Phones\\Number";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        frontend_url: "http://localhost:3000".to_string(),
        frontend_dir: None,
        partial_address_policy: PartialAddressPolicy::Drop,
        crm: CrmConfig {
            api_url: "http://crm.invalid".to_string(),
            http_timeout_secs: 5,
            oauth: OAuthConfig {
                authorize_url: "https://auth.example.com/authorize".to_string(),
                token_url: "https://auth.example.com/token".to_string(),
                client_id: "client-1".to_string(),
                client_secret: "secret".to_string(),
                redirect_uri: "http://localhost:3000/api/auth/callback".to_string(),
                scopes: "account_read contact_data".to_string(),
            },
        },
    }
}

// ---------------------------------------------------------------------------
// Fake upstream CRM
// ---------------------------------------------------------------------------

/// In-memory [`CrmApi`] that records every call.
pub struct FakeCrm {
    pub lists: Vec<String>,
    /// State reported for every activity.
    pub activity_state: String,
    /// When set, every call fails with this upstream status.
    pub fail_status: Option<u16>,
    pub pages: Mutex<VecDeque<ContactsPage>>,
    pub calls: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<ContactsQuery>>,
    pub imports: Mutex<Vec<serde_json::Value>>,
    pub created: Mutex<Vec<serde_json::Value>>,
}

impl Default for FakeCrm {
    fn default() -> Self {
        Self {
            lists: vec!["list-1".to_string()],
            activity_state: "processing".to_string(),
            fail_status: None,
            pages: Mutex::default(),
            calls: Mutex::default(),
            queries: Mutex::default(),
            imports: Mutex::default(),
            created: Mutex::default(),
        }
    }
}

impl FakeCrm {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: &str, token: &str) -> Result<(), CrmError> {
        assert_eq!(token, TOKEN, "handler must forward the caller's token");
        self.calls.lock().unwrap().push(call.to_string());
        match self.fail_status {
            Some(status) => Err(CrmError::Api {
                status,
                body: "upstream failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn next_page(&self) -> ContactsPage {
        self.pages.lock().unwrap().pop_front().unwrap_or_default()
    }
}

#[async_trait]
impl CrmApi for FakeCrm {
    async fn account_summary(&self, token: &str) -> Result<AccountSummary, CrmError> {
        self.enter("account_summary", token)?;
        Ok(serde_json::from_value(serde_json::json!({
            "encoded_account_id": "acct-1",
            "organization_name": "Acme",
        }))
        .unwrap())
    }

    async fn contacts_page(
        &self,
        token: &str,
        query: ContactsQuery,
    ) -> Result<ContactsPage, CrmError> {
        self.enter("contacts_page", token)?;
        self.queries.lock().unwrap().push(query);
        Ok(self.next_page())
    }

    async fn contacts_page_at(&self, token: &str, _href: &str) -> Result<ContactsPage, CrmError> {
        self.enter("contacts_page_at", token)?;
        Ok(self.next_page())
    }

    async fn create_contact(
        &self,
        token: &str,
        body: &CreateContactBody,
    ) -> Result<CrmContact, CrmError> {
        self.enter("create_contact", token)?;
        let value = serde_json::to_value(body).unwrap();
        self.created.lock().unwrap().push(value.clone());
        let mut contact: CrmContact = serde_json::from_value(value).unwrap();
        contact.contact_id = Some("contact-1".to_string());
        Ok(contact)
    }

    async fn contact_lists(&self, token: &str) -> Result<ContactListsResponse, CrmError> {
        self.enter("contact_lists", token)?;
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
        token: &str,
        request: &BulkImportRequest,
    ) -> Result<ImportResponse, CrmError> {
        self.enter("import_contacts", token)?;
        self.imports
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        Ok(ImportResponse {
            activity_id: "activity-1".to_string(),
            state: Some("initialized".to_string()),
        })
    }

    async fn activity(&self, token: &str, activity_id: &str) -> Result<ActivityStatus, CrmError> {
        self.enter("activity", token)?;
        Ok(ActivityStatus {
            activity_id: Some(activity_id.to_string()),
            state: self.activity_state.clone(),
            percent_done: None,
            activity_errors: Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fake OAuth provider
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeOAuth {
    pub codes: Mutex<Vec<String>>,
    pub reject: bool,
}

impl FakeOAuth {
    fn tokens(&self) -> Result<TokenResponse, CrmError> {
        if self.reject {
            return Err(CrmError::Api {
                status: 400,
                body: "invalid_grant".to_string(),
            });
        }
        Ok(TokenResponse {
            access_token: "issued-access".to_string(),
            refresh_token: Some("issued-refresh".to_string()),
            expires_in: 86400,
            token_type: Some("Bearer".to_string()),
            scope: None,
        })
    }
}

#[async_trait]
impl OAuthApi for FakeOAuth {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://auth.example.com/authorize?client_id=client-1&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, CrmError> {
        self.codes.lock().unwrap().push(code.to_string());
        self.tokens()
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse, CrmError> {
        self.tokens()
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub crm: Arc<FakeCrm>,
    pub oauth: Arc<FakeOAuth>,
    pub states: Arc<MemoryStore>,
}

/// Build the full application router with all middleware layers, backed by
/// the given fakes.
pub fn build_test_app_with(crm: FakeCrm, oauth: FakeOAuth) -> TestApp {
    let config = test_config();
    let crm = Arc::new(crm);
    let oauth = Arc::new(oauth);
    let states = Arc::new(MemoryStore::new());

    let state = AppState {
        config: Arc::new(config.clone()),
        crm: crm.clone(),
        oauth: oauth.clone(),
        oauth_states: states.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        crm,
        oauth,
        states,
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(FakeCrm::default(), FakeOAuth::default())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET with the test Bearer token.
pub async fn get_auth(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a JSON body with the test Bearer token.
pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {TOKEN}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a JSON body without credentials.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Encode a single `file` field as `multipart/form-data`.
pub fn multipart_body(file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST an uploaded file with the test Bearer token.
pub async fn post_file(
    app: Router,
    uri: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Response<Body> {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {TOKEN}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(file_name, content_type, data)))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
