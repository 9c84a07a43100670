use thiserror::Error;

/// Main error type for Lexrel
#[derive(Error, Debug)]
pub enum LexrelError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (lexicon file, definition payloads) errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Relation type outside the five known kinds
    #[error("Unknown relation type: {0}")]
    UnknownRelationType(String),

    /// A batch write failed and was rolled back
    #[error("Store failure: {0}")]
    StoreFailure(String),

    /// Lexical oracle could not be loaded or queried
    #[error("Lexical oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Word not found for the requesting user
    #[error("Word not found: {0}")]
    WordNotFound(i64),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generation job failure that is not a store error
    #[error("Generation error: {0}")]
    Generation(String),
}

/// Convenient Result type using LexrelError
pub type Result<T> = std::result::Result<T, LexrelError>;
