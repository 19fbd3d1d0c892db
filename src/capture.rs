use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::error::CaptureError;
use crate::feed::TenderFeed;
use crate::models::{CaptureRunResult, CAPTURE_CHECKPOINT_KEY};
use crate::store::{CheckpointStore, RawTenderStore};

/// Orchestrates one incremental capture run: read the checkpoint, compute
/// the fetch window, pull the feed, persist records, advance the checkpoint.
pub struct CaptureService<F: TenderFeed> {
    feed: F,
    tenders: RawTenderStore,
    checkpoints: CheckpointStore,
    overlap_minutes: i64,
}

impl<F: TenderFeed> CaptureService<F> {
    pub fn new(
        feed: F,
        tenders: RawTenderStore,
        checkpoints: CheckpointStore,
        overlap_minutes: i64,
    ) -> Self {
        Self {
            feed,
            tenders,
            checkpoints,
            overlap_minutes,
        }
    }

    /// Run one capture pass.
    ///
    /// On any fetch or store failure the checkpoint is left untouched, so the
    /// next invocation re-fetches the same window; record-level dedup makes
    /// that repeat safe. There is no retry inside this method.
    ///
    /// Precondition: single-writer execution. Two concurrent runs against the
    /// same checkpoint key would read the same window and race the checkpoint
    /// write; the caller (an external scheduler or lock) must prevent that.
    pub async fn run(&self) -> Result<CaptureRunResult, CaptureError> {
        let previous = self
            .checkpoints
            .get(CAPTURE_CHECKPOINT_KEY)?
            .map(|checkpoint| checkpoint.value);
        let effective_since = self.effective_since(previous);

        info!(
            last_run_at = ?previous,
            effective_since = ?effective_since,
            overlap_minutes = self.overlap_minutes,
            "Starting capture"
        );

        let tenders = self.feed.fetch_since(effective_since).await?;
        let captured_at = Utc::now();
        let inserted = self.tenders.upsert_many(&tenders, captured_at)?;

        // Advance to the later of capture time and the newest publish time
        // seen, in case the wall clock runs behind the source.
        let max_published = tenders.iter().map(|t| t.published_at).max();
        let new_checkpoint = max_published.map_or(captured_at, |m| m.max(captured_at));
        self.checkpoints.set(CAPTURE_CHECKPOINT_KEY, new_checkpoint)?;

        info!(
            fetched = tenders.len(),
            inserted,
            new_checkpoint = %new_checkpoint,
            "Capture finished"
        );

        Ok(CaptureRunResult {
            fetched: tenders.len(),
            inserted,
            previous_checkpoint: previous,
            new_checkpoint,
            effective_since,
        })
    }

    /// Lower bound of the fetch window: the previous checkpoint minus the
    /// overlap, which tolerates upstream indexing lag and clock skew. A
    /// non-positive configured overlap reduces to the checkpoint unchanged;
    /// no previous checkpoint means a full fetch.
    fn effective_since(&self, previous: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        previous.map(|p| p - Duration::minutes(self.overlap_minutes.max(0)))
    }
}
