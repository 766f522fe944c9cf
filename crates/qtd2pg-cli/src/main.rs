mod db;
mod pack;

use clap::{Args, Parser, Subcommand};
use qtd2pg_core::{AppConfig, Credentials, GeometryMode, Settings, TargetTables};
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;
use crate::pack::PackArgs;

#[derive(Debug, Parser)]
#[command(name = "qtd2pg")]
#[command(about = "Pack GPS tracks from video metadata into PostGIS tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract GPS tracks from videos and insert them
    Pack(PackArgs),
    /// Check that existing tables can receive point or line data
    Check {
        /// Existing database holding the tables
        #[arg(long, value_name = "NAME")]
        db: String,
        #[command(flatten)]
        tables: TableArgs,
        /// Database user (falls back to settings, then `postgres`)
        #[arg(long, env = "QTD2PG_DB_USER")]
        user: Option<String>,
    },
    /// Inspect the database server
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

/// Geometry mode and table names shared by `pack` and `check`.
#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// point, line or both
    #[arg(long, default_value = "both")]
    pub mode: GeometryMode,
    /// Point table (defaults to the first configured table name)
    #[arg(long, value_name = "TABLE")]
    pub point_table: Option<String>,
    /// Line table (defaults to the second configured table name)
    #[arg(long, value_name = "TABLE")]
    pub line_table: Option<String>,
}

impl TableArgs {
    pub(crate) fn resolve(&self, settings: &Settings) -> anyhow::Result<TargetTables> {
        let [default_point, default_line] = &settings.default_table_names;
        let point = self.point_table.as_ref().unwrap_or(default_point).clone();
        let line = self.line_table.as_ref().unwrap_or(default_line).clone();

        let names = match self.mode {
            GeometryMode::Point => vec![point],
            GeometryMode::Line => vec![line],
            GeometryMode::Both => vec![point, line],
        };
        TargetTables::from_names(self.mode, &names).map_err(|e| anyhow::anyhow!(e))
    }
}

/// Login for the target server: explicit user, then the settings file, then
/// the environment default. The password only ever comes from the environment.
pub(crate) fn credentials(
    config: &AppConfig,
    settings: &Settings,
    user: Option<String>,
) -> Credentials {
    Credentials {
        user: user
            .or_else(|| settings.default_user.clone())
            .unwrap_or_else(|| config.db_user.clone()),
        secret: config.db_password.clone(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = qtd2pg_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = qtd2pg_core::load_settings(&config.settings_path)?;
    tracing::debug!(settings_path = %config.settings_path.display(), "settings loaded");

    let cli = Cli::parse();
    match cli.command {
        Commands::Pack(args) => pack::run_pack(&config, &settings, args).await,
        Commands::Check { db, tables, user } => {
            let tables = tables.resolve(&settings)?;
            let credentials = credentials(&config, &settings, user);
            db::run_check(&config, &settings, &db, &tables, &credentials).await
        }
        Commands::Db { command } => db::run_db_command(&config, &settings, command).await,
    }
}

#[cfg(test)]
mod tests;
