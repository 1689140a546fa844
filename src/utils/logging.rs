use anyhow::Result;
use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::service::ServiceConfig;
use crate::config::settings::{LogFormat, LoggingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// CLI level wins over the configured one.
pub async fn run(service_config: &ServiceConfig, arg_log_level: Option<LogLevel>) -> Result<()> {
    let logging_config = resolve(service_config, arg_log_level);
    init_logging(&logging_config);
    Ok(())
}

fn resolve(service_config: &ServiceConfig, arg_log_level: Option<LogLevel>) -> LoggingConfig {
    let configured = service_config.settings.logging.clone().unwrap_or_default();
    LoggingConfig::new(
        arg_log_level
            .map(|level| level.as_str().to_owned())
            .unwrap_or(configured.level),
        configured.format,
    )
}

/// Initialize tracing with the desired config. A second call is a no-op.
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match cfg.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .flatten_event(true)
                .with_ansi(false);

            let _ = registry.with(layer).try_init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(true);

            let _ = registry.with(layer).try_init();
        }
    };
}
