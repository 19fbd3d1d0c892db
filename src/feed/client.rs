use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::feed::{atom, json, TenderFeed};
use crate::models::{Config, TenderRecord};

/// Feed client for PLACSP tender announcements.
///
/// Fetches an Atom or JSON payload from an HTTP(S) URL, or from a `file://`
/// reference for fixtures and offline runs, and routes it to the matching
/// sub-parser based on the first non-whitespace character.
pub struct PlacspClient {
    client: Client,
    source_url: String,
    source_name: String,
}

impl PlacspClient {
    /// Create a new feed client from the run configuration.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("tender-capture/1.0")
            .build()?;

        Ok(Self {
            client,
            source_url: config.source_url.clone(),
            source_name: config.source_name.clone(),
        })
    }

    /// Download the raw payload as text, replacing invalid UTF-8 sequences.
    ///
    /// For HTTP(S) sources the window lower bound is appended as a `from`
    /// query parameter; `file://` sources are read as-is.
    async fn download_payload(&self, since: Option<DateTime<Utc>>) -> Result<String, FetchError> {
        if let Some(path) = self.source_url.strip_prefix("file://") {
            let bytes = std::fs::read(path).map_err(|source| FetchError::File {
                path: path.to_string(),
                source,
            })?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        let mut url = Url::parse(&self.source_url)?;
        if let Some(since) = since {
            url.query_pairs_mut().append_pair("from", &since.to_rfc3339());
        }

        debug!("Downloading feed payload from {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        debug!("Feed payload received: {} bytes", bytes.len());
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait::async_trait]
impl TenderFeed for PlacspClient {
    async fn fetch_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TenderRecord>, FetchError> {
        let payload = self.download_payload(since).await?;

        let trimmed = payload.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            json::parse_payload(&payload, &self.source_name)
        } else {
            atom::parse_payload(&payload, &self.source_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(source_url: String) -> Config {
        Config {
            database_path: "unused.db".to_string(),
            source_url,
            source_name: "placsp".to_string(),
            timeout_seconds: 5,
            overlap_minutes: 0,
        }
    }

    #[tokio::test]
    async fn test_sniffs_json_payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, r#"[{"external_id": "exp-1", "title": "T"}]"#).unwrap();

        let client = PlacspClient::new(&test_config(format!("file://{}", path.display()))).unwrap();
        let records = client.fetch_since(None).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].external_id, "exp-1");
        assert_eq!(records[0].source, "placsp");
    }

    #[tokio::test]
    async fn test_sniffs_atom_payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(
            &path,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>exp-atom-1</id>
    <title>Contrato</title>
    <updated>2026-01-10T09:00:00Z</updated>
  </entry>
</feed>"#,
        )
        .unwrap();

        let client = PlacspClient::new(&test_config(format!("file://{}", path.display()))).unwrap();
        let records = client.fetch_since(None).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].external_id, "exp-atom-1");
    }

    #[tokio::test]
    async fn test_missing_local_file_is_fetch_error() {
        let client =
            PlacspClient::new(&test_config("file:///no/such/payload.json".to_string())).unwrap();
        let err = client.fetch_since(None).await.unwrap_err();

        assert!(matches!(err, FetchError::File { .. }));
    }
}
