use chrono::{DateTime, Utc};

/// Checkpoint key under which capture progress is tracked.
pub const CAPTURE_CHECKPOINT_KEY: &str = "capture.last_successful_run_at";

/// One tender announcement as captured from the upstream feed.
///
/// Every field has a defined fallback applied at the parsing boundary, so
/// downstream code never sees a "maybe present" value beyond the explicit
/// `Option` fields.
#[derive(Debug, Clone)]
pub struct TenderRecord {
    /// Source-assigned identifier, non-empty after fallback resolution.
    pub external_id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    /// Always timezone-qualified; defaults to ingestion time when the source
    /// omits it or the source value is unparseable.
    pub published_at: DateTime<Utc>,
    pub deadline_at: Option<DateTime<Utc>>,
    pub buyer_name: String,
    pub region: String,
    pub cpv: String,
    pub budget_amount: Option<f64>,
    /// Tag identifying which feed configuration produced the record. Together
    /// with `external_id` this forms the deduplication key.
    pub source: String,
}

/// Named progress marker persisted between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub key: String,
    /// Timestamp of the last successful run.
    pub value: DateTime<Utc>,
    /// When this row was last written, distinct from `value`.
    pub updated_at: DateTime<Utc>,
}

/// Summary of one orchestrator run.
#[derive(Debug, Clone)]
pub struct CaptureRunResult {
    pub fetched: usize,
    pub inserted: usize,
    pub previous_checkpoint: Option<DateTime<Utc>>,
    pub new_checkpoint: DateTime<Utc>,
    pub effective_since: Option<DateTime<Utc>>,
}

pub const DEFAULT_SOURCE_URL: &str =
    "https://contrataciondelestado.es/sindicacion/sindicacion_643/licitacionesPerfilesContratanteCompleto.xml";

/// Configuration for a capture run.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub source_url: String,
    pub source_name: String,
    pub timeout_seconds: u64,
    pub overlap_minutes: i64,
}

impl Config {
    /// Resolve configuration from optional CLI values, falling back to
    /// environment variables and then to built-in defaults.
    pub fn resolve(
        database_path: Option<String>,
        source_url: Option<String>,
        source_name: Option<String>,
        timeout_seconds: Option<u64>,
        overlap_minutes: Option<i64>,
    ) -> Self {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Config {
            database_path: database_path
                .or_else(|| std::env::var("CAPTURE_DATABASE_PATH").ok())
                .unwrap_or_else(|| "data/tenders.db".to_string()),
            source_url: source_url
                .or_else(|| std::env::var("CAPTURE_SOURCE_URL").ok())
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            source_name: source_name
                .or_else(|| std::env::var("CAPTURE_SOURCE_NAME").ok())
                .unwrap_or_else(|| "placsp".to_string()),
            timeout_seconds: timeout_seconds
                .or_else(|| {
                    std::env::var("CAPTURE_TIMEOUT_SECONDS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                })
                .unwrap_or(30),
            overlap_minutes: overlap_minutes
                .or_else(|| {
                    std::env::var("CAPTURE_OVERLAP_MINUTES")
                        .ok()
                        .and_then(|v| v.parse().ok())
                })
                .unwrap_or(120),
        }
    }
}
