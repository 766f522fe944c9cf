//! Read-only database commands: server inspection and the table
//! compatibility check.

use clap::Subcommand;
use qtd2pg_core::{AppConfig, Credentials, Settings, TargetTables};
use qtd2pg_db::{PoolConfig, ServerAddress};
use sqlx::PgPool;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// List databases on the server
    Databases {
        #[arg(long, env = "QTD2PG_DB_USER")]
        user: Option<String>,
    },
    /// List tables in a database
    Tables {
        #[arg(long, value_name = "NAME")]
        db: String,
        #[arg(long, env = "QTD2PG_DB_USER")]
        user: Option<String>,
    },
    /// List the columns of a table
    Columns {
        #[arg(long, value_name = "NAME")]
        db: String,
        #[arg(long, value_name = "TABLE")]
        table: String,
        #[arg(long, env = "QTD2PG_DB_USER")]
        user: Option<String>,
    },
    /// Show whether PostGIS is enabled in a database
    Postgis {
        #[arg(long, value_name = "NAME")]
        db: String,
        #[arg(long, env = "QTD2PG_DB_USER")]
        user: Option<String>,
    },
    /// Verify that a database accepts connections
    Ping {
        #[arg(long, value_name = "NAME")]
        db: Option<String>,
        #[arg(long, env = "QTD2PG_DB_USER")]
        user: Option<String>,
    },
}

async fn open(
    config: &AppConfig,
    database: &str,
    credentials: &Credentials,
) -> anyhow::Result<PgPool> {
    let pool = qtd2pg_db::connect(
        &ServerAddress::from_app_config(config),
        database,
        credentials,
        PoolConfig::from_app_config(config),
    )
    .await?;
    Ok(pool)
}

pub(crate) async fn run_db_command(
    config: &AppConfig,
    settings: &Settings,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Databases { user } => {
            let credentials = crate::credentials(config, settings, user);
            let pool = open(config, &config.maintenance_db, &credentials).await?;
            for name in qtd2pg_db::list_databases(&pool).await? {
                println!("{name}");
            }
            pool.close().await;
        }
        DbCommands::Tables { db, user } => {
            let credentials = crate::credentials(config, settings, user);
            let pool = open(config, &db, &credentials).await?;
            let tables = qtd2pg_db::list_tables(&pool).await?;
            if tables.is_empty() {
                println!("no tables in {db}");
            }
            for name in tables {
                println!("{name}");
            }
            pool.close().await;
        }
        DbCommands::Columns { db, table, user } => {
            let credentials = crate::credentials(config, settings, user);
            let pool = open(config, &db, &credentials).await?;
            let columns =
                qtd2pg_db::list_columns(&pool, &settings.default_schema, &table).await?;
            if columns.is_empty() {
                println!("table {}.{table} not found in {db}", settings.default_schema);
            }
            for name in columns {
                println!("{name}");
            }
            pool.close().await;
        }
        DbCommands::Postgis { db, user } => {
            let credentials = crate::credentials(config, settings, user);
            let pool = open(config, &db, &credentials).await?;
            match qtd2pg_db::postgis_version(&pool).await? {
                Some(version) => println!("PostGIS {version} is enabled in {db}"),
                None => println!("PostGIS is not enabled in {db}"),
            }
            pool.close().await;
        }
        DbCommands::Ping { db, user } => {
            let credentials = crate::credentials(config, settings, user);
            let database = db.unwrap_or_else(|| config.maintenance_db.clone());
            let pool = open(config, &database, &credentials).await?;
            qtd2pg_db::ping(&pool).await?;
            println!("database {database} is reachable");
            pool.close().await;
        }
    }
    Ok(())
}

/// Run the compatibility check on an existing database.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or any table lacks
/// required columns.
pub(crate) async fn run_check(
    config: &AppConfig,
    settings: &Settings,
    database: &str,
    tables: &TargetTables,
    credentials: &Credentials,
) -> anyhow::Result<()> {
    let pool = open(config, database, credentials).await?;
    let mismatches = qtd2pg_db::check_tables(&pool, &settings.default_schema, tables).await?;
    pool.close().await;

    if mismatches.is_empty() {
        for (kind, table) in tables.tables() {
            println!("{kind} table {table}: ok");
        }
        return Ok(());
    }

    for mismatch in &mismatches {
        println!("{mismatch}");
    }
    anyhow::bail!(
        "{} table(s) in {database} cannot receive {} data",
        mismatches.len(),
        tables.mode()
    )
}
