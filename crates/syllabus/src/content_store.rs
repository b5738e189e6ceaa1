//! SQLite-backed [`ContentStore`] implementation.
//!
//! Maps each store operation onto the `content_items` table created by
//! [`crate::migrate`]. Rows are returned in rowid order, i.e. ingestion
//! order, so keyword-fallback ties reproduce across runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use syllabus_core::error::EngineError;
use syllabus_core::models::{ContentItem, PageMetadata, SourceKind, SourceRef};
use syllabus_core::namespace::Namespace;
use syllabus_core::store::ContentStore;

/// SQLite implementation of the [`ContentStore`] trait.
pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SERVICE: &str = "content store";

fn store_err(err: sqlx::Error) -> EngineError {
    EngineError::upstream(SERVICE, err)
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Option<ContentItem> {
    let id: String = row.get("id");
    let namespace_key: String = row.get("namespace");
    let kind_tag: String = row.get("kind");
    let owner_id: String = row.get("owner_id");
    let name: String = row.get("name");
    let body: String = row.get("body");
    let created_ts: i64 = row.get("created_at");

    let namespace = match Namespace::parse_key(&namespace_key) {
        Some(ns) => ns,
        None => {
            warn!(id, namespace_key, "content row carries an unparseable namespace key");
            return None;
        }
    };
    let kind = match SourceKind::parse_tag(&kind_tag) {
        Some(k) => k,
        None => {
            warn!(id, kind_tag, "content row carries an unknown kind tag");
            return None;
        }
    };
    let created_at: DateTime<Utc> =
        DateTime::from_timestamp(created_ts, 0).unwrap_or_else(Utc::now);

    Some(match kind {
        SourceKind::Document => ContentItem::Document {
            id,
            namespace,
            owner_id,
            file_name: name,
            media_type: row
                .get::<Option<String>, _>("media_type")
                .unwrap_or_else(|| "text/plain".to_string()),
            text: body,
            created_at,
        },
        SourceKind::Website => ContentItem::ScrapedPage {
            id,
            namespace,
            owner_id,
            url: row.get::<Option<String>, _>("url").unwrap_or_default(),
            title: name,
            markdown: body,
            metadata: PageMetadata {
                title: row.get("meta_title"),
                description: row.get("meta_description"),
                og_image: row.get("meta_og_image"),
            },
            created_at,
        },
    })
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn put(&self, item: &ContentItem) -> Result<(), EngineError> {
        let (url, media_type, meta) = match item {
            ContentItem::Document { media_type, .. } => {
                (None, Some(media_type.clone()), PageMetadata::default())
            }
            ContentItem::ScrapedPage { url, metadata, .. } => {
                (Some(url.clone()), None, metadata.clone())
            }
        };

        sqlx::query(
            r#"
            INSERT INTO content_items (id, namespace, kind, owner_id, natural_key, name,
                                       url, media_type, meta_title, meta_description,
                                       meta_og_image, body, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(namespace, kind, natural_key) DO UPDATE SET
                owner_id = excluded.owner_id,
                name = excluded.name,
                url = excluded.url,
                media_type = excluded.media_type,
                meta_title = excluded.meta_title,
                meta_description = excluded.meta_description,
                meta_og_image = excluded.meta_og_image,
                body = excluded.body
            "#,
        )
        .bind(item.id())
        .bind(item.namespace().as_key())
        .bind(item.kind().as_tag())
        .bind(item.owner_id())
        .bind(item.natural_key())
        .bind(item.display_name())
        .bind(url)
        .bind(media_type)
        .bind(meta.title)
        .bind(meta.description)
        .bind(meta.og_image)
        .bind(item.body())
        .bind(item.created_at().timestamp())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn get(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<Option<ContentItem>, EngineError> {
        let row = sqlx::query(
            "SELECT * FROM content_items WHERE namespace = ? AND kind = ? AND id = ?",
        )
        .bind(namespace.as_key())
        .bind(source.kind.as_tag())
        .bind(&source.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.as_ref().and_then(row_to_item))
    }

    async fn find_id(
        &self,
        namespace: &Namespace,
        kind: SourceKind,
        natural_key: &str,
    ) -> Result<Option<String>, EngineError> {
        sqlx::query_scalar(
            "SELECT id FROM content_items WHERE namespace = ? AND kind = ? AND natural_key = ?",
        )
        .bind(namespace.as_key())
        .bind(kind.as_tag())
        .bind(natural_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<ContentItem>, EngineError> {
        let rows = sqlx::query("SELECT * FROM content_items WHERE namespace = ? ORDER BY rowid ASC")
            .bind(namespace.as_key())
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(rows.iter().filter_map(row_to_item).collect())
    }

    async fn delete(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<bool, EngineError> {
        let result =
            sqlx::query("DELETE FROM content_items WHERE namespace = ? AND kind = ? AND id = ?")
                .bind(namespace.as_key())
                .bind(source.kind.as_tag())
                .bind(&source.id)
                .execute(&self.pool)
                .await
                .map_err(store_err)?;

        Ok(result.rows_affected() > 0)
    }
}
