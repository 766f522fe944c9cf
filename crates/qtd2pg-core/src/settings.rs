//! Processing settings: table layout, identifier rules and extraction targets.
//!
//! Settings are read once from a YAML file and passed by value into the
//! extractor, the table layout and the packer. The keys of the legacy
//! `settings.json` ("Default schema", "Coordinate precision", ...) are accepted
//! as aliases, and since JSON is valid YAML that file loads unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How altitude values are stored: truncated to whole meters or rounded to
/// one decimal place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltitudeType {
    #[default]
    Integer,
    #[serde(alias = "float", alias = "numeric")]
    Decimal,
}

impl AltitudeType {
    /// SQL column type used for the `altitude` column.
    #[must_use]
    pub fn column_type(self) -> &'static str {
        match self {
            AltitudeType::Integer => "integer",
            AltitudeType::Decimal => "decimal(6,1)",
        }
    }
}

impl std::fmt::Display for AltitudeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AltitudeType::Integer => write!(f, "integer"),
            AltitudeType::Decimal => write!(f, "decimal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "Default schema")]
    pub default_schema: String,
    /// `[point table, line table]`.
    #[serde(alias = "Default table names")]
    pub default_table_names: [String; 2],
    #[serde(alias = "Default user")]
    pub default_user: Option<String>,
    /// Width of the `video varchar(N)` column.
    #[serde(alias = "Identifier field length")]
    pub identifier_length: u16,
    /// Decimal places kept for longitude/latitude columns.
    #[serde(alias = "Coordinate precision")]
    pub coordinate_precision: u8,
    #[serde(alias = "Altitude data type")]
    pub altitude_type: AltitudeType,
    #[serde(alias = "Default prefix")]
    pub default_prefix: String,
    #[serde(alias = "Default filename")]
    pub default_filename: String,
    #[serde(alias = "Default directory")]
    pub default_directory: Option<String>,
    /// Maximum number of videos accepted in one batch.
    pub input_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_schema: "public".to_string(),
            default_table_names: ["gps_points".to_string(), "gps_lines".to_string()],
            default_user: None,
            identifier_length: 50,
            coordinate_precision: 8,
            altitude_type: AltitudeType::Integer,
            default_prefix: "VID".to_string(),
            default_filename: "origin_6_lrv.mp4".to_string(),
            default_directory: None,
            input_limit: 20,
        }
    }
}

/// Load settings from `path`, falling back to [`Settings::default`] when the
/// file does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_settings(&content)
}

/// Parse and validate settings from YAML (or JSON) text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is malformed or a value is out of range.
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_yaml::from_str(content)?;
    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.default_schema.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_schema must be non-empty".to_string(),
        ));
    }

    if settings.identifier_length == 0 {
        return Err(ConfigError::Validation(
            "identifier_length must be at least 1".to_string(),
        ));
    }

    // decimal(P+4,P) must stay within Postgres' numeric limits and keep four
    // integer digits for +-180 longitudes.
    if !(1..=14).contains(&settings.coordinate_precision) {
        return Err(ConfigError::Validation(format!(
            "coordinate_precision {} must be between 1 and 14",
            settings.coordinate_precision
        )));
    }

    if settings.default_prefix.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_prefix must be non-empty".to_string(),
        ));
    }

    if settings.default_filename.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_filename must be non-empty".to_string(),
        ));
    }

    if settings.input_limit == 0 {
        return Err(ConfigError::Validation(
            "input_limit must be at least 1".to_string(),
        ));
    }

    Ok(())
}
