use std::path::{Path, PathBuf};

use qtd2pg_core::{Credentials, TargetTables};

use crate::error::PackError;

/// Whether the batch creates its database or writes to an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    New(String),
    Existing(String),
}

impl DatabaseTarget {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            DatabaseTarget::New(name) | DatabaseTarget::Existing(name) => name,
        }
    }
}

/// One folder to pack, with an optional identifier override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInput {
    pub folder: PathBuf,
    pub alias: Option<String>,
}

impl VideoInput {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            alias: None,
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct PackRequest {
    pub target: DatabaseTarget,
    pub credentials: Credentials,
    pub tables: TargetTables,
    pub videos: Vec<VideoInput>,
}

/// Result of one video, or of a batch that stopped before any video ran.
#[derive(Debug, Clone, PartialEq)]
pub enum PackOutcome {
    Inserted {
        folder: PathBuf,
        identifier: String,
        messages: Vec<String>,
    },
    Failed {
        folder: PathBuf,
        messages: Vec<String>,
        error: PackError,
    },
    /// The batch stopped before any video ran. `messages` reports what
    /// provisioning already did, such as creating the database.
    Aborted {
        messages: Vec<String>,
        error: PackError,
    },
}

impl PackOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, PackOutcome::Inserted { .. })
    }

    #[must_use]
    pub fn folder(&self) -> Option<&Path> {
        match self {
            PackOutcome::Inserted { folder, .. } | PackOutcome::Failed { folder, .. } => {
                Some(folder)
            }
            PackOutcome::Aborted { .. } => None,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        match self {
            PackOutcome::Inserted { messages, .. }
            | PackOutcome::Failed { messages, .. }
            | PackOutcome::Aborted { messages, .. } => messages,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&PackError> {
        match self {
            PackOutcome::Inserted { .. } => None,
            PackOutcome::Failed { error, .. } | PackOutcome::Aborted { error, .. } => Some(error),
        }
    }
}
