use std::sync::Arc;

use contacthub_core::import::mapper::MappingOptions;
use contacthub_core::store::ExpiringStore;
use contacthub_crm::{CrmApi, OAuthApi};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upstream CRM REST client.
    pub crm: Arc<dyn CrmApi>,
    /// Upstream OAuth client.
    pub oauth: Arc<dyn OAuthApi>,
    /// Pending OAuth `state` values awaiting their callback.
    pub oauth_states: Arc<dyn ExpiringStore>,
}

impl AppState {
    /// Row mapping choices applied to every bulk import.
    pub fn mapping_options(&self) -> MappingOptions {
        MappingOptions {
            partial_address: self.config.partial_address_policy,
            ..MappingOptions::default()
        }
    }
}
