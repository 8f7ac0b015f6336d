use contacthub_core::import::mapper::PartialAddressPolicy;
use contacthub_crm::config::CrmConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the CRM client credentials have defaults suitable for
/// local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body, in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
    /// Browser origin the OAuth callback redirects to.
    pub frontend_url: String,
    /// Directory of built frontend assets to serve, if any.
    pub frontend_dir: Option<String>,
    /// Handling of address columns without a street line.
    pub partial_address_policy: PartialAddressPolicy,
    /// Upstream CRM settings.
    pub crm: CrmConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `3000`                   |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                     |
    /// | `MAX_UPLOAD_BYTES`       | `10485760`               |
    /// | `FRONTEND_URL`           | `http://localhost:3000`  |
    /// | `FRONTEND_DIR`           | unset                    |
    /// | `PARTIAL_ADDRESS_POLICY` | `drop`                   |
    ///
    /// CRM variables are documented on [`CrmConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "10485760".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let frontend_dir = std::env::var("FRONTEND_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let partial_address_policy: PartialAddressPolicy = std::env::var("PARTIAL_ADDRESS_POLICY")
            .unwrap_or_else(|_| "drop".into())
            .parse()
            .unwrap_or_else(|e| panic!("PARTIAL_ADDRESS_POLICY: {e}"));

        let crm = CrmConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            frontend_url,
            frontend_dir,
            partial_address_policy,
            crm,
        }
    }
}
