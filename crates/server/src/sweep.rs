//! Sweep of assets pending deletion.
//!
//! Each run scans every pending row, deletes its object from storage and
//! tombstones the row. Rows are independent: a failure leaves that row
//! pending for the next run and the sweep moves on. A key that is already
//! gone counts as deleted, so overlapping or repeated runs converge.

use crate::metrics;
use folio_core::Clock;
use folio_metadata::models::AssetRow;
use folio_metadata::{MetadataResult, MetadataStore};
use folio_storage::{ObjectStore, PublicBaseUrl, StorageError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    /// Pending rows read at the start of the run.
    pub scanned: u64,
    /// Rows tombstoned by this run.
    pub tombstoned: u64,
    /// Rows whose URL is not under the public base.
    pub unresolvable: u64,
    /// Rows left pending after a storage or metadata error.
    pub failed: u64,
}

enum RowOutcome {
    Tombstoned,
    /// A concurrent run tombstoned the row first.
    AlreadyTombstoned,
    Unresolvable,
    Failed,
}

/// Deletes pending assets from storage and tombstones their rows.
#[derive(Clone)]
pub struct Sweeper {
    metadata: Arc<dyn MetadataStore>,
    storage: Arc<dyn ObjectStore>,
    public_base: PublicBaseUrl,
    clock: Arc<dyn Clock>,
}

impl Sweeper {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        storage: Arc<dyn ObjectStore>,
        public_base: PublicBaseUrl,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            metadata,
            storage,
            public_base,
            clock,
        }
    }

    /// Run one pass over every pending asset.
    ///
    /// Only the initial scan can fail the run; per-row errors are counted
    /// in `SweepStats::failed`.
    pub async fn run(&self) -> MetadataResult<SweepStats> {
        let started = Instant::now();
        metrics::SWEEP_RUNS.inc();

        let pending = self.metadata.get_pending_assets().await?;
        let mut stats = SweepStats {
            scanned: pending.len() as u64,
            ..SweepStats::default()
        };

        for asset in &pending {
            match self.sweep_one(asset).await {
                RowOutcome::Tombstoned => stats.tombstoned += 1,
                RowOutcome::AlreadyTombstoned => {}
                RowOutcome::Unresolvable => stats.unresolvable += 1,
                RowOutcome::Failed => stats.failed += 1,
            }
        }

        metrics::SWEEP_TOMBSTONED.inc_by(stats.tombstoned);
        metrics::SWEEP_UNRESOLVABLE.inc_by(stats.unresolvable);
        metrics::SWEEP_DURATION.observe(started.elapsed().as_secs_f64());
        tracing::info!(
            scanned = stats.scanned,
            tombstoned = stats.tombstoned,
            unresolvable = stats.unresolvable,
            failed = stats.failed,
            "sweep finished"
        );

        Ok(stats)
    }

    async fn sweep_one(&self, asset: &AssetRow) -> RowOutcome {
        let Some(key) = self.public_base.object_key(&asset.url) else {
            tracing::warn!(
                asset_id = %asset.asset_id,
                url = %asset.url,
                public_base = %self.public_base.as_str(),
                "pending asset URL is not under the public base, skipping"
            );
            return RowOutcome::Unresolvable;
        };

        match self.storage.delete(&key).await {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                tracing::debug!(asset_id = %asset.asset_id, key = %key, "object already gone");
            }
            Err(e) => {
                metrics::SWEEP_FAILURES.with_label_values(&["storage"]).inc();
                tracing::warn!(
                    asset_id = %asset.asset_id,
                    key = %key,
                    error = %e,
                    "failed to delete object, leaving asset pending"
                );
                return RowOutcome::Failed;
            }
        }

        match self
            .metadata
            .mark_asset_tombstoned(asset.asset_id, self.clock.now())
            .await
        {
            Ok(true) => {
                tracing::debug!(asset_id = %asset.asset_id, key = %key, "asset tombstoned");
                RowOutcome::Tombstoned
            }
            Ok(false) => RowOutcome::AlreadyTombstoned,
            Err(e) => {
                // The object is gone; the next run finds NotFound and retries the write.
                metrics::SWEEP_FAILURES.with_label_values(&["metadata"]).inc();
                tracing::warn!(
                    asset_id = %asset.asset_id,
                    error = %e,
                    "failed to tombstone asset after deleting its object"
                );
                RowOutcome::Failed
            }
        }
    }
}
