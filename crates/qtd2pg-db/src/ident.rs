//! SQL identifier quoting.
//!
//! Database, schema and table names come from the user and cannot be bound as
//! parameters, so they are always emitted as quoted identifiers.

use crate::DbError;

/// Postgres truncates identifiers beyond this many bytes.
const MAX_IDENTIFIER_BYTES: usize = 63;

/// Quote `name` as a Postgres identifier, doubling embedded quotes.
///
/// # Errors
///
/// Returns [`DbError::InvalidIdentifier`] for empty names, names containing
/// NUL, or names longer than 63 bytes.
pub fn quote_ident(name: &str) -> Result<String, DbError> {
    if name.is_empty() || name.contains('\0') || name.len() > MAX_IDENTIFIER_BYTES {
        return Err(DbError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// `"schema"."table"`.
///
/// # Errors
///
/// Returns [`DbError::InvalidIdentifier`] if either part is invalid.
pub fn qualified(schema: &str, table: &str) -> Result<String, DbError> {
    Ok(format!("{}.{}", quote_ident(schema)?, quote_ident(table)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_names() {
        assert_eq!(quote_ident("gps_points").unwrap(), "\"gps_points\"");
    }

    #[test]
    fn doubles_embedded_quotes() {
        assert_eq!(
            quote_ident("a\"; DROP TABLE x; --").unwrap(),
            "\"a\"\"; DROP TABLE x; --\""
        );
    }

    #[test]
    fn keeps_case() {
        assert_eq!(quote_ident("Drone Points").unwrap(), "\"Drone Points\"");
    }

    #[test]
    fn rejects_empty_and_nul() {
        assert!(matches!(quote_ident(""), Err(DbError::InvalidIdentifier(_))));
        assert!(matches!(quote_ident("a\0b"), Err(DbError::InvalidIdentifier(_))));
    }

    #[test]
    fn rejects_overlong_names() {
        assert!(quote_ident(&"x".repeat(63)).is_ok());
        assert!(quote_ident(&"x".repeat(64)).is_err());
    }

    #[test]
    fn qualified_joins_schema_and_table() {
        assert_eq!(qualified("public", "pts").unwrap(), "\"public\".\"pts\"");
    }
}
