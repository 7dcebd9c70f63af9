use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Why a submission was refused before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    Empty,
    /// A statement did not start with an allowed keyword.
    DisallowedStatement { allowed: Vec<String> },
    /// A denylist rule matched somewhere in the submission.
    DeniedPattern { rule: String, category: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => write!(f, "query cannot be empty"),
            Rejection::DisallowedStatement { allowed } => {
                write!(f, "only {} statements are allowed", allowed.join("/"))
            }
            Rejection::DeniedPattern { rule, category } => write!(
                f,
                "query contains potentially dangerous operations ({}: {})",
                category, rule
            ),
        }
    }
}

impl std::error::Error for Rejection {}

/// Why `Grader::grade` produced no verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeError {
    /// The submission failed validation.
    Rejected(Rejection),
    /// The challenge itself breaks an invariant (e.g. a zero row cap).
    InvalidChallenge(ConfigError),
}

impl fmt::Display for GradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeError::Rejected(r) => write!(f, "submission rejected: {}", r),
            GradeError::InvalidChallenge(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GradeError {}

impl From<Rejection> for GradeError {
    fn from(r: Rejection) -> Self {
        GradeError::Rejected(r)
    }
}

impl From<ConfigError> for GradeError {
    fn from(e: ConfigError) -> Self {
        GradeError::InvalidChallenge(e)
    }
}

/// Failure of a single sandboxed execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionFailure {
    /// Schema or data text failed to apply. Points at the fixture, not the submission.
    Fixture(String),
    /// The engine refused or aborted the submitted query.
    Query(String),
    RowLimitExceeded { limit: usize },
    Internal(String),
}

impl ExecutionFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionFailure::Fixture(_) => ErrorKind::Fixture,
            ExecutionFailure::Query(_) => ErrorKind::Query,
            ExecutionFailure::RowLimitExceeded { .. } => ErrorKind::RowLimit,
            ExecutionFailure::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// User-safe classification of a failed case. Engine text stays in the
/// case diagnostic; only this label reaches feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Fixture,
    Query,
    RowLimit,
    Internal,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Fixture => "fixture setup failed",
            ErrorKind::Query => "query execution failed",
            ErrorKind::RowLimit => "row limit exceeded",
            ErrorKind::Internal => "internal error",
        }
    }
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionFailure::Fixture(msg) => write!(f, "fixture error: {}", msg),
            ExecutionFailure::Query(msg) => write!(f, "SQL error: {}", msg),
            ExecutionFailure::RowLimitExceeded { limit } => {
                write!(f, "query returned more than {} rows (row limit exceeded)", limit)
            }
            ExecutionFailure::Internal(msg) => write!(f, "unexpected error: {}", msg),
        }
    }
}

impl std::error::Error for ExecutionFailure {}
