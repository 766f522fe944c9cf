//! Database and table creation for new targets.

use qtd2pg_core::geometry::SRID;
use qtd2pg_core::{AltitudeType, Settings, TableKind, TargetTables};
use sqlx::PgPool;

use crate::ident::{qualified, quote_ident};
use crate::{has_sqlstate, DbError, DUPLICATE_DATABASE, DUPLICATE_OBJECT, DUPLICATE_TABLE};

/// Column layout parameters for the point and line tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub schema: String,
    pub identifier_length: u16,
    pub coordinate_precision: u8,
    pub altitude_type: AltitudeType,
}

impl TableLayout {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            schema: settings.default_schema.clone(),
            identifier_length: settings.identifier_length,
            coordinate_precision: settings.coordinate_precision,
            altitude_type: settings.altitude_type,
        }
    }

    /// `CREATE TABLE` statement for one table of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidIdentifier`] if the schema or table name
    /// cannot be quoted.
    pub fn create_table_sql(&self, kind: TableKind, table: &str) -> Result<String, DbError> {
        let target = qualified(&self.schema, table)?;
        let n = self.identifier_length;
        let sql = match kind {
            TableKind::Point => {
                let p = self.coordinate_precision;
                let width = u16::from(p) + 4;
                format!(
                    "CREATE TABLE {target} (\
                     id serial PRIMARY KEY, \
                     video varchar({n}), \
                     longitude decimal({width},{p}), \
                     latitude decimal({width},{p}), \
                     altitude {altitude}, \
                     geom geometry(Point, {SRID}))",
                    altitude = self.altitude_type.column_type(),
                )
            }
            TableKind::Line => format!(
                "CREATE TABLE {target} (\
                 id serial PRIMARY KEY, \
                 video varchar({n}), \
                 length decimal(8,3), \
                 geom geometry(Linestring, {SRID}))"
            ),
        };
        Ok(sql)
    }
}

/// Create a new database. Must run on a pool connected to another database
/// (usually `postgres`).
///
/// # Errors
///
/// Returns [`DbError::DatabaseAlreadyExists`] if the name is taken, or
/// [`DbError::Sqlx`] for any other failure.
pub async fn create_database(pool: &PgPool, name: &str) -> Result<(), DbError> {
    let sql = format!("CREATE DATABASE {}", quote_ident(name)?);

    // CREATE DATABASE cannot run inside a transaction block; raw_sql sends it
    // over the simple query protocol.
    match sqlx::raw_sql(&sql).execute(pool).await {
        Ok(_) => {
            tracing::info!(database = name, "database created");
            Ok(())
        }
        Err(e) if has_sqlstate(&e, DUPLICATE_DATABASE) => {
            Err(DbError::DatabaseAlreadyExists(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Enable PostGIS in the connected database.
///
/// Returns `true` if the extension was created by this call and `false` if it
/// was already enabled.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the extension cannot be created.
pub async fn enable_postgis(pool: &PgPool) -> Result<bool, DbError> {
    match sqlx::raw_sql("CREATE EXTENSION postgis").execute(pool).await {
        Ok(_) => {
            tracing::info!("PostGIS extension enabled");
            Ok(true)
        }
        Err(e) if has_sqlstate(&e, DUPLICATE_OBJECT) => {
            tracing::info!("PostGIS extension has already been enabled");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Enable PostGIS and create the target tables, point table first.
///
/// # Errors
///
/// Returns [`DbError::TableAlreadyExists`] if a table is already present, or
/// [`DbError::Sqlx`] for any other failure. Tables created before the failing
/// one are kept.
pub async fn create_tables(
    pool: &PgPool,
    layout: &TableLayout,
    tables: &TargetTables,
) -> Result<(), DbError> {
    enable_postgis(pool).await?;

    for (kind, table) in tables.tables() {
        let sql = layout.create_table_sql(kind, table)?;
        match sqlx::raw_sql(&sql).execute(pool).await {
            Ok(_) => tracing::info!(table, kind = %kind, schema = %layout.schema, "table created"),
            Err(e) if has_sqlstate(&e, DUPLICATE_TABLE) => {
                return Err(DbError::TableAlreadyExists(table.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(altitude_type: AltitudeType) -> TableLayout {
        TableLayout {
            schema: "public".to_string(),
            identifier_length: 50,
            coordinate_precision: 8,
            altitude_type,
        }
    }

    #[test]
    fn layout_follows_settings() {
        let settings = Settings::default();
        let layout = TableLayout::from_settings(&settings);
        assert_eq!(layout.schema, "public");
        assert_eq!(layout.identifier_length, settings.identifier_length);
        assert_eq!(layout.coordinate_precision, settings.coordinate_precision);
    }

    #[test]
    fn point_table_with_integer_altitude() {
        let sql = layout(AltitudeType::Integer)
            .create_table_sql(TableKind::Point, "pts")
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"public\".\"pts\" (id serial PRIMARY KEY, video varchar(50), \
             longitude decimal(12,8), latitude decimal(12,8), altitude integer, \
             geom geometry(Point, 4326))"
        );
    }

    #[test]
    fn point_table_with_decimal_altitude() {
        let sql = layout(AltitudeType::Decimal)
            .create_table_sql(TableKind::Point, "pts")
            .unwrap();
        assert!(sql.contains("altitude decimal(6,1)"), "{sql}");
    }

    #[test]
    fn point_table_precision_drives_coordinate_columns() {
        let mut l = layout(AltitudeType::Integer);
        l.coordinate_precision = 6;
        let sql = l.create_table_sql(TableKind::Point, "pts").unwrap();
        assert!(sql.contains("longitude decimal(10,6)"), "{sql}");
        assert!(sql.contains("latitude decimal(10,6)"), "{sql}");
    }

    #[test]
    fn line_table() {
        let sql = layout(AltitudeType::Integer)
            .create_table_sql(TableKind::Line, "lns")
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"public\".\"lns\" (id serial PRIMARY KEY, video varchar(50), \
             length decimal(8,3), geom geometry(Linestring, 4326))"
        );
    }

    #[test]
    fn geometry_columns_share_one_srid() {
        let l = layout(AltitudeType::Integer);
        for kind in [TableKind::Point, TableKind::Line] {
            let sql = l.create_table_sql(kind, "t").unwrap();
            assert!(sql.ends_with(&format!(", {SRID}))")), "{sql}");
        }
    }

    #[test]
    fn table_names_are_quoted() {
        let sql = layout(AltitudeType::Integer)
            .create_table_sql(TableKind::Line, "x\"; DROP")
            .unwrap();
        assert!(sql.starts_with("CREATE TABLE \"public\".\"x\"\"; DROP\" ("), "{sql}");
    }
}
