//! PostgreSQL-based metadata store implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::*;
use crate::repos::{AboutRepo, AssetRepo, PostRepo};
use crate::store::MetadataStore;
use async_trait::async_trait;
use folio_core::{AssetPlan, AssetScope, AssetStatus, lifecycle};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgConnection, Pool, Postgres};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection URL.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    async fn connect(
        mut opts: PgConnectOptions,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{}ms", timeout_ms))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // Prepared statements hold one command each.
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

async fn apply_asset_plan(
    conn: &mut PgConnection,
    scope: AssetScope,
    plan: &AssetPlan,
    now: OffsetDateTime,
) -> MetadataResult<()> {
    for asset in &plan.retire {
        match scope {
            AssetScope::Post(post_id) => {
                sqlx::query(
                    "UPDATE assets SET status = $1, updated_at = $2 \
                     WHERE owner_post_id = $3 AND kind = $4 AND url = $5 \
                     AND status = $6 AND NOT is_tombstoned",
                )
                .bind(AssetStatus::PendingDelete.as_str())
                .bind(now)
                .bind(post_id)
                .bind(asset.kind.as_str())
                .bind(&asset.url)
                .bind(AssetStatus::Active.as_str())
                .execute(&mut *conn)
                .await?;
            }
            AssetScope::Global => {
                sqlx::query(
                    "UPDATE assets SET status = $1, updated_at = $2 \
                     WHERE owner_post_id IS NULL AND kind = $3 AND url = $4 \
                     AND status = $5 AND NOT is_tombstoned",
                )
                .bind(AssetStatus::PendingDelete.as_str())
                .bind(now)
                .bind(asset.kind.as_str())
                .bind(&asset.url)
                .bind(AssetStatus::Active.as_str())
                .execute(&mut *conn)
                .await?;
            }
        }
    }

    for asset in &plan.register {
        sqlx::query(
            r#"
            INSERT INTO assets (
                asset_id, url, owner_post_id, kind, status,
                is_tombstoned, tombstoned_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, FALSE, NULL, $6, $6)
            ON CONFLICT (
                (COALESCE(owner_post_id, '00000000-0000-0000-0000-000000000000'::uuid)), kind, url
            ) WHERE NOT is_tombstoned
            DO UPDATE SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at
            WHERE assets.status = $7
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&asset.url)
        .bind(scope.post_id())
        .bind(asset.kind.as_str())
        .bind(AssetStatus::Active.as_str())
        .bind(now)
        .bind(AssetStatus::PendingDelete.as_str())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl PostRepo for PostgresStore {
    async fn create_post(&self, post: &PostRow) -> MetadataResult<AssetPlan> {
        let plan = lifecycle::plan_create(&post.body, post.cover_url.as_deref());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO posts (
                post_id, title, slug, category_id, body, cover_url,
                is_published, is_deleted, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
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
        .map_err(|e| MetadataError::on_unique_violation(e, || format!("slug '{}'", post.slug)))?;

        apply_asset_plan(&mut tx, AssetScope::Post(post.post_id), &plan, post.created_at).await?;

        tx.commit().await?;
        Ok(plan)
    }

    async fn get_post(&self, post_id: Uuid) -> MetadataResult<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE post_id = $1")
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

        // Row lock serializes concurrent edits of the same post, so each
        // diff starts from the body the previous writer committed.
        let previous =
            sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE post_id = $1 FOR UPDATE")
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
                title = $1, slug = $2, category_id = $3, body = $4, cover_url = $5,
                is_published = $6, updated_at = $7
            WHERE post_id = $8
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
        .map_err(|e| MetadataError::on_unique_violation(e, || format!("slug '{}'", update.slug)))?;

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

    async fn soft_delete_post(&self, post_id: Uuid, now: OffsetDateTime) -> MetadataResult<u64> {
        let mut tx = self.pool.begin().await?;

        let deleted: Option<bool> =
            sqlx::query_scalar("SELECT is_deleted FROM posts WHERE post_id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if deleted != Some(false) {
            return Err(MetadataError::NotFound(format!("post {post_id}")));
        }

        let retired = sqlx::query(
            "UPDATE assets SET status = $1, updated_at = $2 \
             WHERE owner_post_id = $3 AND NOT is_tombstoned",
        )
        .bind(AssetStatus::PendingDelete.as_str())
        .bind(now)
        .bind(post_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("UPDATE posts SET is_deleted = TRUE, updated_at = $1 WHERE post_id = $2")
            .bind(now)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(retired)
    }
}

#[async_trait]
impl AboutRepo for PostgresStore {
    async fn get_about(&self) -> MetadataResult<Option<AboutRow>> {
        let row = sqlx::query_as::<_, AboutRow>("SELECT * FROM about_page WHERE about_id = $1")
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
            sqlx::query_scalar("SELECT body FROM about_page WHERE about_id = $1 FOR UPDATE")
                .bind(ABOUT_PAGE_ID)
                .fetch_optional(&mut *tx)
                .await?;

        let plan = lifecycle::plan_about(previous.as_deref(), body);

        // Upsert handles two first-ever writers racing past the empty SELECT.
        sqlx::query(
            r#"
            INSERT INTO about_page (about_id, body, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (about_id) DO UPDATE
            SET body = EXCLUDED.body, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(ABOUT_PAGE_ID)
        .bind(body)
        .bind(now)
        .execute(&mut *tx)
        .await?;

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
impl AssetRepo for PostgresStore {
    async fn get_asset(&self, asset_id: Uuid) -> MetadataResult<Option<AssetRow>> {
        let row = sqlx::query_as::<_, AssetRow>("SELECT * FROM assets WHERE asset_id = $1")
            .bind(asset_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_assets(&self, scope: AssetScope) -> MetadataResult<Vec<AssetRow>> {
        let rows = match scope {
            AssetScope::Post(post_id) => {
                sqlx::query_as::<_, AssetRow>(
                    "SELECT * FROM assets WHERE owner_post_id = $1 ORDER BY created_at, kind, url",
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
            "SELECT * FROM assets WHERE status = $1 AND NOT is_tombstoned ORDER BY updated_at, asset_id",
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
            "UPDATE assets SET is_tombstoned = TRUE, tombstoned_at = $1, updated_at = $1 \
             WHERE asset_id = $2 AND status = $3 AND NOT is_tombstoned",
        )
        .bind(tombstoned_at)
        .bind(asset_id)
        .bind(AssetStatus::PendingDelete.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_skip_comment_only_chunks() {
        let statements = postgres_schema_statements(
            "-- header\nCREATE TABLE a (x INT);\n-- trailing comment\n;\nCREATE INDEX b ON a(x);",
        );
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CREATE TABLE a"));
        assert!(statements[1].starts_with("CREATE INDEX b"));
    }

    #[test]
    fn test_embedded_schema_creates_all_tables() {
        let statements = postgres_schema_statements(POSTGRES_SCHEMA);
        for table in ["posts", "assets", "about_page"] {
            assert!(
                statements
                    .iter()
                    .any(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS {table}"))),
                "missing table {table}"
            );
        }
    }
}
