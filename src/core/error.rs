//! Error types for the knowledge base core
//!
//! Engine operations return these typed failures; the CLI and MCP layers
//! decide how to surface them. All failures are deterministic for a given
//! input and are reported, never retried.

use thiserror::Error;

use super::types::DocType;

/// Core error kinds
#[derive(Debug, Error)]
pub enum Error {
    /// Project id or name did not resolve
    #[error("project \"{0}\" not found")]
    ProjectNotFound(String),

    /// No document slot for (project, doc type)
    #[error("document slot \"{doc_type}\" not found for project {project_id}")]
    DocumentNotFound {
        project_id: ulid::Ulid,
        doc_type: DocType,
    },

    /// Duplicate project name
    #[error("project \"{0}\" already exists")]
    AlreadyExists(String),

    /// Value outside the closed doc type set
    #[error("invalid doc type: {0}")]
    InvalidDocType(String),

    /// Value outside the closed edge type set
    #[error("invalid edge type: {0}")]
    InvalidEdgeType(String),

    /// Uniqueness or foreign-key failure surfaced from SQLite
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Any other database failure
    #[error("database error: {0}")]
    Db(rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem mirror failure
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::Constraint(
                    msg.clone()
                        .unwrap_or_else(|| "constraint violation".to_string()),
                )
            }
            _ => Error::Db(err),
        }
    }
}

impl Error {
    /// Whether this error means "the referenced thing does not exist"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ProjectNotFound(_) | Error::DocumentNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
