//! Configuration validation with aggregated errors.
//! - base URL must be an absolute http(s) URL
//! - audience must not be empty
//! - at least one credential source, each with its required fields

use reqwest::Url;
use tracing::{error, info};

use crate::config::service::{ServiceConfig, ServiceEndpoints};
use crate::config::settings::SettingsConfig;
use crate::credentials::CredentialSourceConfig;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_service(&cfg.service, &mut errors);

    if cfg.credentials.is_empty() {
        errors.push("config: 'credentials' is empty; at least one source required".to_string());
    }
    for (index, source) in cfg.credentials.iter().enumerate() {
        validate_credential_source(index, source, &mut errors);
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        let level = logging.level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(format!("settings.logging.level '{}' is not a known level", logging.level));
        }
    }
    if settings.target_dir().is_empty() {
        errors.push("settings.target_dir must not be empty".to_string());
    }
}

fn validate_service(service: &ServiceEndpoints, errors: &mut Vec<String>) {
    match Url::parse(&service.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "service.base_url '{}' must use http or https, got '{}'",
            service.base_url,
            url.scheme()
        )),
        Err(e) => errors.push(format!("service.base_url '{}' is invalid: {}", service.base_url, e)),
    }
    if service.audience.trim().is_empty() {
        errors.push("service.audience must not be empty".to_string());
    }
}

fn validate_credential_source(index: usize, source: &CredentialSourceConfig, errors: &mut Vec<String>) {
    match source {
        CredentialSourceConfig::DedicatedConfig { path } if path.trim().is_empty() => {
            errors.push(format!("credentials[{}].path must not be empty", index));
        }
        CredentialSourceConfig::Env { login_var, password_var }
            if login_var.is_empty() || password_var.is_empty() =>
        {
            errors.push(format!("credentials[{}] env variable names must not be empty", index));
        }
        _ => {}
    }
}
