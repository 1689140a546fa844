use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::credentials::CredentialSourceConfig;

pub const DEFAULT_BASE_URL: &str = "https://prod.trackmania.core.nadeo.online";
pub const DEFAULT_AUDIENCE: &str = "NadeoServices";

pub const AUTH_BASIC_PATH: &str = "/v2/authentication/token/basic";
pub const AUTH_REFRESH_PATH: &str = "/v2/authentication/token/refresh";
pub const MAP_LOOKUP_PATH: &str = "/maps/";

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub service: ServiceEndpoints,
    #[serde(default)]
    pub credentials: Vec<CredentialSourceConfig>,
}

/// Remote service location and the audience tokens are requested for
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    pub user_agent: Option<String>,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            audience: default_audience(),
            user_agent: None,
        }
    }
}

impl ServiceEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn auth_basic_url(&self) -> String {
        self.join(AUTH_BASIC_PATH)
    }

    pub fn auth_refresh_url(&self) -> String {
        self.join(AUTH_REFRESH_PATH)
    }

    pub fn map_lookup_url(&self) -> String {
        self.join(MAP_LOOKUP_PATH)
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_owned()
}
