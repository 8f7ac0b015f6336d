//! Upstream CRM integration.
//!
//! Wraps the CRM's v3 REST API ([`api`]) and OAuth endpoints ([`oauth`])
//! behind traits so the HTTP layer can be exercised without a network, and
//! implements the submission ([`bulk`]) and polling ([`poller`]) halves of
//! the bulk import pipeline.

pub mod api;
pub mod bulk;
pub mod config;
pub mod contacts;
pub mod error;
pub mod oauth;
pub mod poller;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{ConstantContactApi, CrmApi};
pub use error::CrmError;
pub use oauth::{OAuthApi, OAuthClient};
