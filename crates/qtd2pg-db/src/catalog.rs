//! Catalog listings used to pick and verify target databases and tables.

use sqlx::PgPool;

use crate::{has_sqlstate, UNDEFINED_FUNCTION};

/// Names of all non-template databases.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_databases(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT datname::text FROM pg_database WHERE datistemplate = false ORDER BY datname",
    )
    .fetch_all(pool)
    .await
}

/// Names of user tables in the connected database.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_tables(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT tablename::text FROM pg_catalog.pg_tables \
         WHERE schemaname NOT IN ('pg_catalog', 'information_schema') \
         ORDER BY tablename",
    )
    .fetch_all(pool)
    .await
}

/// Column names of `schema.table`, in ordinal order. Empty when the table
/// does not exist.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_columns(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT column_name::text FROM information_schema.columns \
         WHERE table_schema = $1 AND table_name = $2 \
         ORDER BY ordinal_position",
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
}

/// The PostGIS library version, or `None` when the extension is not enabled
/// in this database.
///
/// # Errors
///
/// Returns [`sqlx::Error`] for failures other than the function being
/// undefined.
pub async fn postgis_version(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
    match sqlx::query_scalar::<_, String>("SELECT PostGIS_Lib_Version()")
        .fetch_one(pool)
        .await
    {
        Ok(version) => Ok(Some(version)),
        Err(e) if has_sqlstate(&e, UNDEFINED_FUNCTION) => Ok(None),
        Err(e) => Err(e),
    }
}
