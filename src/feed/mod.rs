use chrono::{DateTime, Utc};

use crate::error::FetchError;
use crate::models::TenderRecord;

pub mod atom;
pub mod client;
pub mod json;

pub use client::PlacspClient;

/// Common trait for tender feed clients.
///
/// `since` is the lower bound of the fetch window; `None` means a full fetch
/// with no lower bound (first-ever run).
#[async_trait::async_trait]
pub trait TenderFeed {
    async fn fetch_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TenderRecord>, FetchError>;
}
