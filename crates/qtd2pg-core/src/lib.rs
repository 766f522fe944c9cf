pub mod app_config;
pub mod config;
pub mod geometry;
pub mod settings;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use geometry::{
    build_geometry, build_line, build_points, spheroid_length_km, GeometryError, LineRow,
    PointRow, VideoGeometry,
};
pub use settings::{load_settings, AltitudeType, Settings};
pub use types::{
    Altitude, CoordinateSample, Credentials, ExtractionResult, GeometryMode, TableKind,
    TargetTables,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read settings file {path}: {source}")]
    SettingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    SettingsFileParse(#[from] serde_yaml::Error),

    #[error("invalid settings: {0}")]
    Validation(String),
}
