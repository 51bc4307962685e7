use std::fmt;

use thiserror::Error;

/// The remote call a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    List,
    Create,
    Update,
    Delete,
}

impl RemoteOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteOperation::List => "list",
            RemoteOperation::Create => "create",
            RemoteOperation::Update => "update",
            RemoteOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum FailureCause {
    /// Connection problems and non-2xx statuses.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
}

/// Any failed call against the expense store, tagged with the operation.
#[derive(Debug, Error)]
#[error("{operation} request failed: {cause}")]
pub struct RemoteCallFailure {
    pub operation: RemoteOperation,
    #[source]
    pub cause: FailureCause,
}

impl RemoteCallFailure {
    pub fn new(operation: RemoteOperation, cause: impl Into<FailureCause>) -> Self {
        Self {
            operation,
            cause: cause.into(),
        }
    }

    pub fn rejected(operation: RemoteOperation, message: impl Into<String>) -> Self {
        Self::new(operation, FailureCause::Rejected(message.into()))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self.cause, FailureCause::Decode(_))
    }

    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match &self.cause {
            FailureCause::Transport(err) => err.status(),
            _ => None,
        }
    }
}
