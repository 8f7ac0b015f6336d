/// Default upstream REST base URL.
pub const DEFAULT_API_URL: &str = "https://api.cc.email";
/// Default OAuth authorization endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str =
    "https://authz.constantcontact.com/oauth2/default/v1/authorize";
/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://authz.constantcontact.com/oauth2/default/v1/token";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/api/auth/callback";
const DEFAULT_SCOPES: &str = "account_read contact_data";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Upstream CRM connection settings.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// REST base URL, without a trailing slash.
    pub api_url: String,
    /// Timeout applied to every upstream request, in seconds.
    pub http_timeout_secs: u64,
    pub oauth: OAuthConfig,
}

/// OAuth authorization-code client settings.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub authorize_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Space-separated scopes requested at login.
    pub scopes: String,
}

impl CrmConfig {
    /// Load CRM configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default                                    |
    /// |-------------------------|----------|--------------------------------------------|
    /// | `CRM_API_URL`           | no       | `https://api.cc.email`                     |
    /// | `CRM_AUTHORIZE_URL`     | no       | Constant Contact authorize endpoint        |
    /// | `CRM_TOKEN_URL`         | no       | Constant Contact token endpoint            |
    /// | `CRM_CLIENT_ID`         | **yes**  | --                                         |
    /// | `CRM_CLIENT_SECRET`     | **yes**  | --                                         |
    /// | `CRM_REDIRECT_URI`      | no       | `http://localhost:3000/api/auth/callback`  |
    /// | `CRM_SCOPES`            | no       | `account_read contact_data`                |
    /// | `CRM_HTTP_TIMEOUT_SECS` | no       | `30`                                       |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or empty, or a number fails
    /// to parse.
    pub fn from_env() -> Self {
        let api_url = std::env::var("CRM_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let http_timeout_secs: u64 = std::env::var("CRM_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
            .parse()
            .expect("CRM_HTTP_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            http_timeout_secs,
            oauth: OAuthConfig::from_env(),
        }
    }
}

impl OAuthConfig {
    /// Load the OAuth client settings. See [`CrmConfig::from_env`].
    pub fn from_env() -> Self {
        let client_id = required("CRM_CLIENT_ID");
        let client_secret = required("CRM_CLIENT_SECRET");

        Self {
            authorize_url: std::env::var("CRM_AUTHORIZE_URL")
                .unwrap_or_else(|_| DEFAULT_AUTHORIZE_URL.into()),
            token_url: std::env::var("CRM_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.into()),
            client_id,
            client_secret,
            redirect_uri: std::env::var("CRM_REDIRECT_URI")
                .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.into()),
            scopes: std::env::var("CRM_SCOPES").unwrap_or_else(|_| DEFAULT_SCOPES.into()),
        }
    }
}

fn required(name: &str) -> String {
    let value =
        std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"));
    assert!(!value.trim().is_empty(), "{name} must not be empty");
    value
}
