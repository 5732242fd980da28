use std::path::PathBuf;
use thiserror::Error;

use crate::data::user::db::DirectoryError;
use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Cors(#[from] rocket_cors::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: &'static str, msg: impl ToString) -> FieldError {
        FieldError {
            field,
            msg: msg.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Duplicate membership, assignment or certificate.
    Duplicate,
    /// Entity is in the wrong lifecycle state for the mutation.
    State,
    /// Update carries the stored values unchanged.
    NoChanges,
    /// Status toggle to the status already held.
    Unchanged,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid request: {0:?}")]
    Invalid(Vec<FieldError>),
    #[error("Permission Denied")]
    Denied,
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict { kind: ConflictKind, message: String },
    #[error("{public}")]
    Infrastructure {
        public: &'static str,
        #[source]
        source: InfrastructureError,
    },
}

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl WorkflowError {
    pub fn invalid(field: &'static str, msg: impl ToString) -> WorkflowError {
        WorkflowError::Invalid(vec![FieldError::new(field, msg)])
    }

    pub fn not_found(msg: impl ToString) -> WorkflowError {
        WorkflowError::NotFound(msg.to_string())
    }

    pub fn duplicate(msg: impl ToString) -> WorkflowError {
        WorkflowError::Conflict {
            kind: ConflictKind::Duplicate,
            message: msg.to_string(),
        }
    }

    pub fn state(msg: impl ToString) -> WorkflowError {
        WorkflowError::Conflict {
            kind: ConflictKind::State,
            message: msg.to_string(),
        }
    }

    pub fn no_changes() -> WorkflowError {
        WorkflowError::Conflict {
            kind: ConflictKind::NoChanges,
            message: "No changes!".to_string(),
        }
    }

    pub fn unchanged(msg: impl ToString) -> WorkflowError {
        WorkflowError::Conflict {
            kind: ConflictKind::Unchanged,
            message: msg.to_string(),
        }
    }

    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            WorkflowError::Conflict { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Ledger failures never leak backend text; the raw error stays in `source`.
impl From<LedgerError> for WorkflowError {
    fn from(e: LedgerError) -> Self {
        if !matches!(e, LedgerError::Query { .. }) {
            tracing::error!("ledger failure: {}", e);
        }
        match e {
            LedgerError::Query { .. } => {
                tracing::warn!("ledger query failed: {}", e);
                WorkflowError::NotFound("Query chaincode has failed".to_string())
            }
            LedgerError::Connect { .. } => WorkflowError::Infrastructure {
                public: "Failed connect to blockchain",
                source: e.into(),
            },
            LedgerError::Invoke { .. } => WorkflowError::Infrastructure {
                public: "Can not invoke chaincode",
                source: e.into(),
            },
            LedgerError::Decode { .. } => WorkflowError::Infrastructure {
                public: "Unexpected response from chaincode",
                source: e.into(),
            },
        }
    }
}

impl From<DirectoryError> for WorkflowError {
    fn from(e: DirectoryError) -> Self {
        tracing::error!("identity directory failure: {}", e);
        WorkflowError::Infrastructure {
            public: "Internal Server Error",
            source: e.into(),
        }
    }
}
