use thiserror::Error;

/// Hard failure while fetching or structurally parsing a feed payload.
///
/// Individual field values that fail to parse never surface here; they
/// degrade to defaults inside the sub-parsers (see `normalize`).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to download feed payload: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read local payload {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid source URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed XML payload: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported payload: {0}")]
    Payload(String),
}

/// I/O failure from one of the persistence stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database failure: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Any hard error that aborts a capture run. Propagated unhandled to the
/// caller; the checkpoint is left untouched so the next invocation re-fetches
/// the same window.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
