pub mod auth;
pub mod contacts;
pub mod user;
