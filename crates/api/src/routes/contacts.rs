//! Route definitions for the `/contacts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::contacts;
use crate::state::AppState;

/// Routes mounted at `/contacts`. All require a Bearer token.
///
/// ```text
/// GET  /                      -> list_contacts
/// POST /                      -> create_contact
/// POST /validate              -> validate_file
/// POST /bulk                  -> bulk_upload
/// GET  /bulk/{activity_id}    -> bulk_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route("/validate", post(contacts::validate_file))
        .route("/bulk", post(contacts::bulk_upload))
        .route("/bulk/{activity_id}", get(contacts::bulk_status))
}
