use std::time::Duration;

use qtd2pg_core::{AppConfig, Credentials};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use thiserror::Error;

pub mod catalog;
pub mod ident;
pub mod insert;
pub mod provision;
pub mod schema;

pub use catalog::{list_columns, list_databases, list_tables, postgis_version};
pub use ident::{qualified, quote_ident};
pub use insert::{insert_video, InsertSummary};
pub use provision::{create_database, create_tables, enable_postgis, TableLayout};
pub use schema::{check_tables, missing_columns, required_columns, TableMismatch};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// SQLSTATE `duplicate_database`.
pub(crate) const DUPLICATE_DATABASE: &str = "42P04";
/// SQLSTATE `duplicate_table`.
pub(crate) const DUPLICATE_TABLE: &str = "42P07";
/// SQLSTATE `duplicate_object`, raised by `CREATE EXTENSION` when enabled.
pub(crate) const DUPLICATE_OBJECT: &str = "42710";
/// SQLSTATE `undefined_function`.
pub(crate) const UNDEFINED_FUNCTION: &str = "42883";

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

/// Where the Postgres server lives.
#[derive(Debug, Clone)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            host: config.db_host.clone(),
            port: config.db_port,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect to database \"{database}\": {source}")]
    Connect {
        database: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("database \"{0}\" already exists")]
    DatabaseAlreadyExists(String),
    #[error("table \"{0}\" already exists")]
    TableAlreadyExists(String),
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("{geometry} geometry cannot be written to {tables} tables")]
    TargetMismatch {
        geometry: qtd2pg_core::GeometryMode,
        tables: qtd2pg_core::GeometryMode,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Whether `err` is a Postgres error with the given SQLSTATE.
pub(crate) fn has_sqlstate(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(code),
        _ => false,
    }
}

/// Open a pool against `database` with the given login.
///
/// # Errors
///
/// Returns [`DbError::Connect`] if the connection cannot be established.
pub async fn connect(
    server: &ServerAddress,
    database: &str,
    credentials: &Credentials,
    config: PoolConfig,
) -> Result<PgPool, DbError> {
    let mut options = PgConnectOptions::new()
        .host(&server.host)
        .port(server.port)
        .username(&credentials.user)
        .database(database);
    if let Some(secret) = &credentials.secret {
        options = options.password(secret);
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await
        .map_err(|source| DbError::Connect {
            database: database.to_string(),
            source,
        })?;

    tracing::debug!(database, host = %server.host, port = server.port, "connected");
    Ok(pool)
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}
