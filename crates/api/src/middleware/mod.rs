//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller's CRM access token.

pub mod auth;
