//! Domain types and pure logic for the contacthub backend.
//!
//! Nothing in this crate performs network I/O. The upstream CRM client lives
//! in `contacthub-crm`; the HTTP surface lives in `contacthub-api`.

pub mod activity;
pub mod contact;
pub mod error;
pub mod import;
pub mod payload;
pub mod store;
pub mod types;
