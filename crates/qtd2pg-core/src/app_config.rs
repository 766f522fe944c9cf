use std::path::PathBuf;

/// Process-level configuration read from the environment.
///
/// Processing parameters (table layout, identifier prefix, target filename)
/// live in [`crate::Settings`]; this struct only carries what differs between
/// machines: where Postgres and `ExifTool` are and how to log.
#[derive(Clone)]
pub struct AppConfig {
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: Option<String>,
    pub maintenance_db: String,
    pub exiftool_path: PathBuf,
    pub settings_path: PathBuf,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field(
                "db_password",
                &self.db_password.as_ref().map(|_| "[redacted]"),
            )
            .field("maintenance_db", &self.maintenance_db)
            .field("exiftool_path", &self.exiftool_path)
            .field("settings_path", &self.settings_path)
            .field("log_level", &self.log_level)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
