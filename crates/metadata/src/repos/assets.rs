//! Asset reference repository.

use crate::error::MetadataResult;
use crate::models::AssetRow;
use async_trait::async_trait;
use folio_core::AssetScope;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for asset rows.
#[async_trait]
pub trait AssetRepo: Send + Sync {
    /// Get an asset by ID.
    async fn get_asset(&self, asset_id: Uuid) -> MetadataResult<Option<AssetRow>>;

    /// List every row in a scope, tombstoned ones included, oldest first.
    async fn list_assets(&self, scope: AssetScope) -> MetadataResult<Vec<AssetRow>>;

    /// All rows awaiting physical deletion (pending_delete and not tombstoned).
    async fn get_pending_assets(&self) -> MetadataResult<Vec<AssetRow>>;

    /// Tombstone a pending asset.
    ///
    /// Guarded on the row still being pending and not tombstoned; returns
    /// false when the guard matched nothing (another sweep got there first).
    async fn mark_asset_tombstoned(
        &self,
        asset_id: Uuid,
        tombstoned_at: OffsetDateTime,
    ) -> MetadataResult<bool>;
}
