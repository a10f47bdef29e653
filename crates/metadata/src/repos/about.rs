//! About page repository.

use crate::error::MetadataResult;
use crate::models::AboutRow;
use async_trait::async_trait;
use folio_core::AssetPlan;
use time::OffsetDateTime;

/// Repository for the about page singleton.
#[async_trait]
pub trait AboutRepo: Send + Sync {
    /// Get the about page, if it has ever been written.
    async fn get_about(&self) -> MetadataResult<Option<AboutRow>>;

    /// Write the about page, creating it on first use.
    ///
    /// Asset references are diffed against the stored body in the same
    /// transaction, in the global scope with kind `about`.
    async fn upsert_about(
        &self,
        body: &str,
        now: OffsetDateTime,
    ) -> MetadataResult<(AboutRow, AssetPlan)>;
}
