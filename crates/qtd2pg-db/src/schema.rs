//! Compatibility check for existing target tables.

use qtd2pg_core::{TableKind, TargetTables};
use sqlx::PgPool;

use crate::catalog::list_columns;

const POINT_COLUMNS: &[&str] = &["video", "longitude", "latitude", "altitude", "geom"];
const LINE_COLUMNS: &[&str] = &["id", "video", "length", "geom"];

/// An existing table that lacks columns the inserts need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMismatch {
    pub table: String,
    pub kind: TableKind,
    pub missing: Vec<String>,
}

impl std::fmt::Display for TableMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} table \"{}\" is missing columns [{}]",
            self.kind,
            self.table,
            self.missing.join(", ")
        )
    }
}

#[must_use]
pub fn required_columns(kind: TableKind) -> &'static [&'static str] {
    match kind {
        TableKind::Point => POINT_COLUMNS,
        TableKind::Line => LINE_COLUMNS,
    }
}

/// Required columns of `kind` absent from `columns`, in required order.
#[must_use]
pub fn missing_columns(kind: TableKind, columns: &[String]) -> Vec<String> {
    required_columns(kind)
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|required| (*required).to_string())
        .collect()
}

/// Check every target table, point table first. An empty result means all
/// tables are compatible.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if a column listing fails.
pub async fn check_tables(
    pool: &PgPool,
    schema: &str,
    tables: &TargetTables,
) -> Result<Vec<TableMismatch>, sqlx::Error> {
    let mut mismatches = Vec::new();

    for (kind, table) in tables.tables() {
        let columns = list_columns(pool, schema, table).await?;
        let missing = missing_columns(kind, &columns);
        if missing.is_empty() {
            tracing::debug!(table, kind = %kind, "schema matches");
        } else {
            tracing::warn!(table, kind = %kind, missing = ?missing, "schema does not match");
            mismatches.push(TableMismatch {
                table: table.to_string(),
                kind,
                missing,
            });
        }
    }

    Ok(mismatches)
}
