use thiserror::Error;

/// Main error type for kgexplain
#[derive(Error, Debug)]
pub enum KgError {
    /// Score store errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A triple row missing one of head, relation or tail
    #[error("Malformed triple at line {line}: {reason}")]
    MalformedTriple { line: usize, reason: String },

    /// Entity, item or user token absent from an index
    #[error("Lookup miss: {0}")]
    LookupMiss(String),

    /// User unresolvable in the scoring model
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using KgError
pub type Result<T> = std::result::Result<T, KgError>;
