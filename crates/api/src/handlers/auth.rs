//! Handlers for the `/auth` resource (OAuth login, callback, refresh).

use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use contacthub_core::error::CoreError;
use contacthub_core::store::ExpiringStore;
use contacthub_crm::types::TokenResponse;
use contacthub_crm::OAuthApi;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// How long a login `state` value stays redeemable.
pub const OAUTH_STATE_TTL: Duration = Duration::from_secs(5 * 60);

/// Frontend path that receives the issued token.
const ACCESS_TOKEN_PATH: &str = "/access-token";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub url: String,
}

/// Query string of the OAuth redirect back to us.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/auth/login
///
/// Issue a fresh `state` value and return the CRM authorization URL.
pub async fn login(State(state): State<AppState>) -> Json<LoginResponse> {
    let oauth_state = Uuid::new_v4().simple().to_string();
    state
        .oauth_states
        .put(
            oauth_state.clone(),
            chrono::Utc::now().to_rfc3339(),
            OAUTH_STATE_TTL,
        )
        .await;

    Json(LoginResponse {
        url: state.oauth.authorization_url(&oauth_state),
    })
}

/// GET /api/auth/callback
///
/// Redeem the `state` value, exchange the code for tokens, and redirect the
/// browser to the frontend with the access token in the query string.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Redirect> {
    if let Some(error) = &params.error {
        tracing::warn!(error = %error, "OAuth authorization denied");
    }

    let redeemed = match params.state.as_deref() {
        Some(value) => state.oauth_states.take(value).await.is_some(),
        None => false,
    };
    if !redeemed {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid state".into(),
        )));
    }

    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".into()))?;

    let tokens = state.oauth.exchange_code(code).await?;
    tracing::info!(expires_in = tokens.expires_in, "OAuth code exchanged");

    let url = frontend_redirect(&state.config.frontend_url, &tokens)?;
    Ok(Redirect::to(url.as_str()))
}

/// POST /api/auth/refresh
///
/// Exchange a refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    if input.refresh_token.trim().is_empty() {
        return Err(AppError::BadRequest("refresh_token must not be empty".into()));
    }
    let tokens = state.oauth.refresh(&input.refresh_token).await?;
    Ok(Json(tokens))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn frontend_redirect(frontend_url: &str, tokens: &TokenResponse) -> AppResult<Url> {
    let mut url = Url::parse(&format!("{frontend_url}{ACCESS_TOKEN_PATH}"))
        .map_err(|e| AppError::InternalError(format!("Invalid FRONTEND_URL: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("token", &tokens.access_token)
            .append_pair("expires_in", &tokens.expires_in.to_string());
        if let Some(refresh_token) = &tokens.refresh_token {
            query.append_pair("refresh_token", refresh_token);
        }
    }
    Ok(url)
}
