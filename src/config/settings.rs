use serde::Deserialize;

pub const DEFAULT_MAPS_DIR: &str = "UserData/Maps";
pub const DEFAULT_TARGET_DIR: &str = "PyPlanet-NadeoServices";

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    pub logging: Option<LoggingConfig>,
    /// storage root, downloads land in `<maps_dir>/<target_dir>`
    pub maps_dir: Option<String>,
    pub target_dir: Option<String>,
    #[serde(default)]
    pub juke_after_adding: bool,
}

impl SettingsConfig {
    pub fn maps_dir(&self) -> &str {
        self.maps_dir.as_deref().unwrap_or(DEFAULT_MAPS_DIR)
    }

    pub fn target_dir(&self) -> &str {
        self.target_dir.as_deref().unwrap_or(DEFAULT_TARGET_DIR)
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}
