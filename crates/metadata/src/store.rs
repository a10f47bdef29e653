//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{AboutRepo, AssetRepo, PostRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: PostRepo + AboutRepo + AssetRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) a SQLite database and apply the schema.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        // One connection: SQLite serializes writers anyway, and this keeps
        // read-then-write transactions from hitting "database is locked".
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use folio_core::{AssetPlan, AssetScope, AssetStatus, lifecycle};
    use sqlx::SqliteConnection;
    use time::OffsetDateTime;
    use uuid::Uuid;

    /// Retire then register the plan's assets on an open transaction.
    async fn apply_asset_plan(
        conn: &mut SqliteConnection,
        scope: AssetScope,
        plan: &AssetPlan,
        now: OffsetDateTime,
    ) -> MetadataResult<()> {
        for asset in &plan.retire {
            let query = match scope {
                AssetScope::Post(post_id) => sqlx::query(
                    "UPDATE assets SET status = ?, updated_at = ? \
                     WHERE owner_post_id = ? AND kind = ? AND url = ? \
                     AND status = ? AND is_tombstoned = 0",
                )
                .bind(AssetStatus::PendingDelete.as_str())
                .bind(now)
                .bind(post_id),
                AssetScope::Global => sqlx::query(
                    "UPDATE assets SET status = ?, updated_at = ? \
                     WHERE owner_post_id IS NULL AND kind = ? AND url = ? \
                     AND status = ? AND is_tombstoned = 0",
                )
                .bind(AssetStatus::PendingDelete.as_str())
                .bind(now),
            };
            query
                .bind(asset.kind.as_str())
                .bind(&asset.url)
                .bind(AssetStatus::Active.as_str())
                .execute(&mut *conn)
                .await?;
        }

        for asset in &plan.register {
            // A live row for the same ref is reactivated if it was pending deletion.
            sqlx::query(
                r#"
                INSERT INTO assets (
                    asset_id, url, owner_post_id, kind, status,
                    is_tombstoned, tombstoned_at, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, 0, NULL, ?, ?)
                ON CONFLICT (
                    COALESCE(owner_post_id, X'00000000000000000000000000000000'), kind, url
                ) WHERE is_tombstoned = 0
                DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at
                WHERE assets.status = ?
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&asset.url)
            .bind(scope.post_id())
            .bind(asset.kind.as_str())
            .bind(AssetStatus::Active.as_str())
            .bind(now)
            .bind(now)
            .bind(AssetStatus::PendingDelete.as_str())
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    #[async_trait]
    impl PostRepo for SqliteStore {
        async fn create_post(&self, post: &PostRow) -> MetadataResult<AssetPlan> {
            let plan = lifecycle::plan_create(&post.body, post.cover_url.as_deref());

            let mut tx = self.pool.begin().await?;

            sqlx::query(
                r#"
                INSERT INTO posts (
                    post_id, title, slug, category_id, body, cover_url,
                    is_published, is_deleted, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(post.post_id)
            .bind(&post.title)
            .bind(&post.slug)
            .bind(post.category_id)
            .bind(&post.body)
            .bind(&post.cover_url)
            .bind(post.is_published)
            .bind(post.is_deleted)
            .bind(post.created_at)
            .bind(post.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                MetadataError::on_unique_violation(e, || format!("slug '{}'", post.slug))
            })?;

            apply_asset_plan(&mut tx, AssetScope::Post(post.post_id), &plan, post.created_at)
                .await?;

            tx.commit().await?;
            Ok(plan)
        }

        async fn get_post(&self, post_id: Uuid) -> MetadataResult<Option<PostRow>> {
            let row = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE post_id = ?")
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn update_post(
            &self,
            post_id: Uuid,
            update: &PostUpdate,
            now: OffsetDateTime,
        ) -> MetadataResult<(PostRow, AssetPlan)> {
            let mut tx = self.pool.begin().await?;

            let previous = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE post_id = ?")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?
                .filter(|post| !post.is_deleted)
                .ok_or_else(|| MetadataError::NotFound(format!("post {post_id}")))?;

            let plan = lifecycle::plan_update(
                &previous.body,
                previous.cover_url.as_deref(),
                &update.body,
                update.cover_url.as_deref(),
            );

            sqlx::query(
                r#"
                UPDATE posts SET
                    title = ?, slug = ?, category_id = ?, body = ?, cover_url = ?,
                    is_published = ?, updated_at = ?
                WHERE post_id = ?
                "#,
            )
            .bind(&update.title)
            .bind(&update.slug)
            .bind(update.category_id)
            .bind(&update.body)
            .bind(&update.cover_url)
            .bind(update.is_published)
            .bind(now)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                MetadataError::on_unique_violation(e, || format!("slug '{}'", update.slug))
            })?;

            apply_asset_plan(&mut tx, AssetScope::Post(post_id), &plan, now).await?;

            tx.commit().await?;

            let post = PostRow {
                post_id,
                title: update.title.clone(),
                slug: update.slug.clone(),
                category_id: update.category_id,
                body: update.body.clone(),
                cover_url: update.cover_url.clone(),
                is_published: update.is_published,
                is_deleted: false,
                created_at: previous.created_at,
                updated_at: now,
            };
            Ok((post, plan))
        }

        async fn soft_delete_post(
            &self,
            post_id: Uuid,
            now: OffsetDateTime,
        ) -> MetadataResult<u64> {
            let mut tx = self.pool.begin().await?;

            let deleted: Option<bool> =
                sqlx::query_scalar("SELECT is_deleted FROM posts WHERE post_id = ?")
                    .bind(post_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if deleted != Some(false) {
                return Err(MetadataError::NotFound(format!("post {post_id}")));
            }

            let retired = sqlx::query(
                "UPDATE assets SET status = ?, updated_at = ? \
                 WHERE owner_post_id = ? AND is_tombstoned = 0",
            )
            .bind(AssetStatus::PendingDelete.as_str())
            .bind(now)
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            sqlx::query("UPDATE posts SET is_deleted = 1, updated_at = ? WHERE post_id = ?")
                .bind(now)
                .bind(post_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(retired)
        }
    }

    #[async_trait]
    impl AboutRepo for SqliteStore {
        async fn get_about(&self) -> MetadataResult<Option<AboutRow>> {
            let row = sqlx::query_as::<_, AboutRow>("SELECT * FROM about_page WHERE about_id = ?")
                .bind(ABOUT_PAGE_ID)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn upsert_about(
            &self,
            body: &str,
            now: OffsetDateTime,
        ) -> MetadataResult<(AboutRow, AssetPlan)> {
            let mut tx = self.pool.begin().await?;

            let previous: Option<String> =
                sqlx::query_scalar("SELECT body FROM about_page WHERE about_id = ?")
                    .bind(ABOUT_PAGE_ID)
                    .fetch_optional(&mut *tx)
                    .await?;

            let plan = lifecycle::plan_about(previous.as_deref(), body);

            if previous.is_some() {
                sqlx::query("UPDATE about_page SET body = ?, updated_at = ? WHERE about_id = ?")
                    .bind(body)
                    .bind(now)
                    .bind(ABOUT_PAGE_ID)
                    .execute(&mut *tx)
                    .await?;
            } else {
                sqlx::query("INSERT INTO about_page (about_id, body, updated_at) VALUES (?, ?, ?)")
                    .bind(ABOUT_PAGE_ID)
                    .bind(body)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
            }

            apply_asset_plan(&mut tx, AssetScope::Global, &plan, now).await?;

            tx.commit().await?;

            let row = AboutRow {
                about_id: ABOUT_PAGE_ID,
                body: body.to_string(),
                updated_at: now,
            };
            Ok((row, plan))
        }
    }

    #[async_trait]
    impl AssetRepo for SqliteStore {
        async fn get_asset(&self, asset_id: Uuid) -> MetadataResult<Option<AssetRow>> {
            let row = sqlx::query_as::<_, AssetRow>("SELECT * FROM assets WHERE asset_id = ?")
                .bind(asset_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_assets(&self, scope: AssetScope) -> MetadataResult<Vec<AssetRow>> {
            let rows = match scope {
                AssetScope::Post(post_id) => {
                    sqlx::query_as::<_, AssetRow>(
                        "SELECT * FROM assets WHERE owner_post_id = ? ORDER BY created_at, kind, url",
                    )
                    .bind(post_id)
                    .fetch_all(&self.pool)
                    .await?
                }
                AssetScope::Global => {
                    sqlx::query_as::<_, AssetRow>(
                        "SELECT * FROM assets WHERE owner_post_id IS NULL ORDER BY created_at, kind, url",
                    )
                    .fetch_all(&self.pool)
                    .await?
                }
            };
            Ok(rows)
        }

        async fn get_pending_assets(&self) -> MetadataResult<Vec<AssetRow>> {
            let rows = sqlx::query_as::<_, AssetRow>(
                "SELECT * FROM assets WHERE status = ? AND is_tombstoned = 0 ORDER BY updated_at, asset_id",
            )
            .bind(AssetStatus::PendingDelete.as_str())
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn mark_asset_tombstoned(
            &self,
            asset_id: Uuid,
            tombstoned_at: OffsetDateTime,
        ) -> MetadataResult<bool> {
            let result = sqlx::query(
                "UPDATE assets SET is_tombstoned = 1, tombstoned_at = ?, updated_at = ? \
                 WHERE asset_id = ? AND status = ? AND is_tombstoned = 0",
            )
            .bind(tombstoned_at)
            .bind(tombstoned_at)
            .bind(asset_id)
            .bind(AssetStatus::PendingDelete.as_str())
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() == 1)
        }
    }
}

/// SQLite schema.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    post_id BLOB PRIMARY KEY,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    category_id INTEGER,
    body TEXT NOT NULL,
    cover_url TEXT,
    is_published INTEGER NOT NULL DEFAULT 0,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_posts_category ON posts(category_id);

CREATE TABLE IF NOT EXISTS assets (
    asset_id BLOB PRIMARY KEY,
    url TEXT NOT NULL,
    owner_post_id BLOB REFERENCES posts(post_id),
    kind TEXT NOT NULL CHECK (kind IN ('inline', 'cover', 'about')),
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'pending_delete')),
    is_tombstoned INTEGER NOT NULL DEFAULT 0,
    tombstoned_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (is_tombstoned = 0 OR status = 'pending_delete')
);
-- At most one live row per (owner, kind, url); tombstoned rows are history.
CREATE UNIQUE INDEX IF NOT EXISTS idx_assets_live_ref ON assets(
    COALESCE(owner_post_id, X'00000000000000000000000000000000'), kind, url
) WHERE is_tombstoned = 0;
CREATE INDEX IF NOT EXISTS idx_assets_owner ON assets(owner_post_id);
CREATE INDEX IF NOT EXISTS idx_assets_pending ON assets(status) WHERE is_tombstoned = 0;

CREATE TABLE IF NOT EXISTS about_page (
    about_id INTEGER PRIMARY KEY CHECK (about_id = 1),
    body TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
