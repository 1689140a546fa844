//! Credential discovery.
//!
//! Credentials are resolved by walking an ordered list of sources; the first
//! source that yields a login/password pair wins. Sources that fail are logged
//! and skipped, and an empty chain is a fatal startup error.

use std::fmt;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

pub mod dedicated;
pub mod env;

use dedicated::DedicatedConfigSource;
use env::EnvSource;

pub const DEFAULT_LOGIN_VAR: &str = "NADEO_LOGIN";
pub const DEFAULT_PASSWORD_VAR: &str = "NADEO_PASSWORD";

/// Basic credentials of a dedicated server account
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

pub trait LoadCredentials {
    /// `Ok(None)` means the source has nothing to offer and the next one should be tried.
    fn try_load(&self) -> Result<Option<Credentials>>;
}

/// Credential source as declared in the service config
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSourceConfig {
    DedicatedConfig {
        path: String,
    },
    Env {
        #[serde(default = "default_login_var")]
        login_var: String,
        #[serde(default = "default_password_var")]
        password_var: String,
    },
    Literal {
        login: String,
        password: String,
    },
}

#[derive(Debug, Clone)]
pub enum CredentialSource {
    DedicatedConfig(DedicatedConfigSource),
    Env(EnvSource),
    Literal(Credentials),
}

impl CredentialSource {
    pub fn name(&self) -> &'static str {
        match self {
            CredentialSource::DedicatedConfig(_) => "dedicated_config",
            CredentialSource::Env(_) => "env",
            CredentialSource::Literal(_) => "literal",
        }
    }
}

impl LoadCredentials for CredentialSource {
    fn try_load(&self) -> Result<Option<Credentials>> {
        match self {
            CredentialSource::DedicatedConfig(s) => s.try_load(),
            CredentialSource::Env(s) => s.try_load(),
            CredentialSource::Literal(c) => {
                Ok(Some(c.clone()).filter(|c| !c.username.is_empty()))
            }
        }
    }
}

impl From<&CredentialSourceConfig> for CredentialSource {
    fn from(cfg: &CredentialSourceConfig) -> Self {
        match cfg {
            CredentialSourceConfig::DedicatedConfig { path } => {
                CredentialSource::DedicatedConfig(DedicatedConfigSource::new(path))
            }
            CredentialSourceConfig::Env { login_var, password_var } => {
                CredentialSource::Env(EnvSource::new(login_var, password_var))
            }
            CredentialSourceConfig::Literal { login, password } => {
                CredentialSource::Literal(Credentials::new(login, password))
            }
        }
    }
}

pub fn build_sources(configs: &[CredentialSourceConfig]) -> Vec<CredentialSource> {
    configs.iter().map(CredentialSource::from).collect()
}

/// Walk the chain in order and return the first credentials found.
pub fn load_credentials<S: LoadCredentials>(sources: &[S]) -> Result<Credentials> {
    for (index, source) in sources.iter().enumerate() {
        match source.try_load() {
            Ok(Some(credentials)) => {
                info!(source = index, login = %credentials.username, "credentials loaded");
                return Ok(credentials);
            }
            Ok(None) => debug!(source = index, "credential source has no credentials"),
            Err(e) => warn!(source = index, error = %e, "credential source failed, trying next"),
        }
    }
    Err(anyhow!("no credentials found in {} configured source(s)", sources.len()))
}

fn default_login_var() -> String {
    DEFAULT_LOGIN_VAR.to_owned()
}

fn default_password_var() -> String {
    DEFAULT_PASSWORD_VAR.to_owned()
}
