//! OAuth authorization-code client for the upstream CRM.
//!
//! Only the exchange itself lives here. State generation and the expiring
//! state store belong to the HTTP layer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::config::OAuthConfig;
use crate::error::CrmError;
use crate::types::TokenResponse;

#[async_trait]
pub trait OAuthApi: Send + Sync {
    /// Authorization URL the browser is sent to, carrying `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, CrmError>;

    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, CrmError>;
}

#[derive(Debug)]
pub struct OAuthClient {
    client: reqwest::Client,
    authorize_url: Url,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig, timeout: Duration) -> Result<Self, CrmError> {
        let authorize_url = Url::parse(&config.authorize_url).map_err(|e| CrmError::InvalidUrl {
            url: config.authorize_url.clone(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            authorize_url,
            config,
        })
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, CrmError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "OAuth token request rejected");
            return Err(CrmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl OAuthApi for OAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes)
            .append_pair("state", state);
        url.into()
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, CrmError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.config.redirect_uri),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, CrmError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}
