pub mod auth;
pub mod contacts;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          authorization URL (public)
/// /auth/callback                       OAuth redirect target (public)
/// /auth/refresh                        refresh exchange (public)
///
/// /user/self                           upstream account summary
///
/// /contacts                            list (GET), create (POST)
/// /contacts/validate                   column check of an upload (POST)
/// /contacts/bulk                       bulk import of an upload (POST)
/// /contacts/bulk/{activity_id}         import completion (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/user", user::router())
        .nest("/contacts", contacts::router())
}
