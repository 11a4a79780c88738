use thiserror::Error;

/// Reasons the remote word source could not supply text.
///
/// None of these reach the user: the provider logs them and substitutes
/// the fallback word list.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("word request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("word service answered with status {0}")]
    Status(u16),

    #[error("malformed word payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("word payload contained no words")]
    Empty,
}

/// Failures of the durable best-score store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("best score database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("best score directory error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
