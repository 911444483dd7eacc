use thiserror::Error;

/// Main error type for Gamelore
#[derive(Error, Debug)]
pub enum GameloreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller passed an invalid argument (e.g. chunk overlap >= size)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Document store backend lost or refused the connection during a write
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Embedding backend errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// One external source's fetch failed. Non-fatal: the aggregator
    /// swallows this per source and records a partial-result flag.
    /// The field holds the source's identity string, e.g. "reddit".
    #[error("Source fetch failed for {identity}: {reason}")]
    SourceFetch { identity: String, reason: String },

    /// Every queried path came back empty. A legitimate outcome, surfaced
    /// explicitly rather than as an ambiguous empty success.
    #[error("No results: {0}")]
    NoResults(String),
}

/// Convenient Result type using GameloreError
pub type Result<T> = std::result::Result<T, GameloreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GameloreError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_error_from_rusqlite() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let err: GameloreError = rusqlite_err.into();
        assert!(matches!(err, GameloreError::Database(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GameloreError = io_err.into();
        assert!(matches!(err, GameloreError::Io(_)));
    }

    #[test]
    fn test_source_fetch_names_the_source() {
        let err = GameloreError::SourceFetch {
            identity: "reddit".to_string(),
            reason: "HTTP 503".to_string(),
        };
        assert!(err.to_string().contains("reddit"));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_errors_are_std_errors() {
        // Every variant must box into a trait object for anyhow callers
        let err: Box<dyn std::error::Error> = Box::new(GameloreError::SourceFetch {
            identity: "steamspy".to_string(),
            reason: "timeout".to_string(),
        });
        assert!(err.to_string().contains("steamspy"));
    }
}
