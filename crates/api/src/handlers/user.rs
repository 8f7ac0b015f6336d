//! Handlers for the `/user` resource.

use axum::extract::State;
use axum::Json;
use contacthub_crm::types::AccountSummary;
use contacthub_crm::CrmApi;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/user/self
///
/// The upstream account summary for the caller's token.
pub async fn get_self(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<AccountSummary>> {
    let summary = state.crm.account_summary(&user.access_token).await?;
    Ok(Json(summary))
}
