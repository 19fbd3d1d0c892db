use rusqlite::Connection;
use std::path::Path;

use crate::error::StoreError;

pub mod checkpoint;
pub mod tenders;

pub use checkpoint::CheckpointStore;
pub use tenders::RawTenderStore;

/// Open a connection to the capture database, creating the parent directory
/// on first use. Both stores open their own connection to the same file;
/// their writes are intentionally not atomic with respect to each other.
pub(crate) fn open_connection(database_path: &str) -> Result<Connection, StoreError> {
    if let Some(parent) = Path::new(database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    Ok(Connection::open(database_path)?)
}
