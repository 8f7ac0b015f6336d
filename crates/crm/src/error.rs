/// Errors from the upstream CRM layer.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The CRM returned a non-2xx status code.
    #[error("CRM API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The account has no contact list to import into.
    #[error("No contact lists found")]
    NoContactLists,

    /// A bulk submission was attempted with zero contacts.
    #[error("No contacts to import")]
    EmptyBatch,

    #[error("Too many contacts in one import: {count} (maximum {max})")]
    BatchTooLarge { count: usize, max: usize },

    /// An activity id that cannot name a single upstream path segment.
    #[error("Invalid activity id: {0:?}")]
    InvalidActivityId(String),

    /// A configured URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl CrmError {
    /// True when the upstream rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}
