use qtd2pg_core::GeometryError;
use qtd2pg_db::{DbError, TableMismatch};
use qtd2pg_exif::ExtractError;
use thiserror::Error;

/// Everything that can stop a video or a batch.
///
/// Variants carry rendered messages rather than source errors so outcomes can
/// be cloned, compared and printed after the batch finishes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to run {program}: {reason}")]
    ToolInvocationFailure { program: String, reason: String },

    #[error("malformed GPS sample on line {line_number} (\"{line}\"): {reason}")]
    MalformedSample {
        line_number: usize,
        line: String,
        reason: String,
    },

    #[error("video has no {0} metadata")]
    MissingMetadata(String),

    #[error("a line needs at least 2 samples, found {found}")]
    InsufficientSamples { found: usize },

    #[error("failed to connect to database \"{database}\": {reason}")]
    ConnectFailure { database: String, reason: String },

    #[error("database \"{0}\" already exists")]
    DatabaseAlreadyExists(String),

    #[error("table \"{0}\" already exists")]
    TableAlreadyExists(String),

    #[error("schema mismatch: {}", describe_mismatches(.0))]
    SchemaMismatch(Vec<TableMismatch>),

    #[error("insert failed: {0}")]
    InsertFailure(String),

    #[error("provisioning failed: {0}")]
    Provisioning(String),
}

fn describe_mismatches(mismatches: &[TableMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PackError {
    /// Map a failed insert. Connection loss stays distinguishable from a
    /// rejected statement.
    #[must_use]
    pub fn insert(err: DbError) -> Self {
        match err {
            DbError::Connect { database, source } => PackError::ConnectFailure {
                database,
                reason: source.to_string(),
            },
            other => PackError::InsertFailure(other.to_string()),
        }
    }
}

impl From<ExtractError> for PackError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::InvalidInput { .. } => PackError::InvalidInput(err.to_string()),
            ExtractError::ToolInvocation { program, source } => PackError::ToolInvocationFailure {
                program,
                reason: source.to_string(),
            },
            ExtractError::NonUtf8Output { program } => PackError::ToolInvocationFailure {
                program,
                reason: "output is not valid UTF-8".to_string(),
            },
            ExtractError::MalformedSample {
                line_number,
                line,
                source,
            } => PackError::MalformedSample {
                line_number,
                line,
                reason: source.to_string(),
            },
            ExtractError::MissingMetadata(what) => PackError::MissingMetadata(what.to_string()),
        }
    }
}

impl From<GeometryError> for PackError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InsufficientSamples { found } => {
                PackError::InsufficientSamples { found }
            }
        }
    }
}

/// Provisioning and schema-check failures.
impl From<DbError> for PackError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Connect { database, source } => PackError::ConnectFailure {
                database,
                reason: source.to_string(),
            },
            DbError::DatabaseAlreadyExists(name) => PackError::DatabaseAlreadyExists(name),
            DbError::TableAlreadyExists(name) => PackError::TableAlreadyExists(name),
            other => PackError::Provisioning(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use qtd2pg_core::TableKind;
    use qtd2pg_exif::SampleError;

    use super::*;

    #[test]
    fn malformed_sample_keeps_line_context() {
        let err = PackError::from(ExtractError::MalformedSample {
            line_number: 4,
            line: "garbage".to_string(),
            source: SampleError::FieldCount(1),
        });
        assert_eq!(
            err.to_string(),
            "malformed GPS sample on line 4 (\"garbage\"): expected 3 comma-separated fields, found 1"
        );
    }

    #[test]
    fn missing_tool_is_invocation_failure() {
        let err = PackError::from(ExtractError::ToolInvocation {
            program: "exiftool".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        });
        assert!(matches!(err, PackError::ToolInvocationFailure { ref program, .. } if program == "exiftool"));
    }

    #[test]
    fn short_track_is_insufficient_samples() {
        let err = PackError::from(GeometryError::InsufficientSamples { found: 1 });
        assert_eq!(err, PackError::InsufficientSamples { found: 1 });
    }

    #[test]
    fn db_conflicts_keep_their_kind() {
        assert_eq!(
            PackError::from(DbError::DatabaseAlreadyExists("geo_db".to_string())),
            PackError::DatabaseAlreadyExists("geo_db".to_string())
        );
        assert_eq!(
            PackError::from(DbError::TableAlreadyExists("pts".to_string())),
            PackError::TableAlreadyExists("pts".to_string())
        );
        assert!(matches!(
            PackError::from(DbError::InvalidIdentifier(String::new())),
            PackError::Provisioning(_)
        ));
    }

    #[test]
    fn insert_errors_become_insert_failure() {
        let err = PackError::insert(DbError::Sqlx(sqlx::Error::RowNotFound));
        assert!(matches!(err, PackError::InsertFailure(_)));
    }

    #[test]
    fn schema_mismatch_lists_every_table() {
        let err = PackError::SchemaMismatch(vec![
            TableMismatch {
                table: "pts".to_string(),
                kind: TableKind::Point,
                missing: vec!["geom".to_string()],
            },
            TableMismatch {
                table: "lns".to_string(),
                kind: TableKind::Line,
                missing: vec!["id".to_string(), "length".to_string()],
            },
        ]);
        assert_eq!(
            err.to_string(),
            "schema mismatch: point table \"pts\" is missing columns [geom]; \
             line table \"lns\" is missing columns [id, length]"
        );
    }
}
