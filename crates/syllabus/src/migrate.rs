use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Content items: the locally held record of every ingested document
    // and scraped page. natural_key is the file name for documents and
    // the URL for pages, so re-ingestion recognizes the same item.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content_items (
            id TEXT PRIMARY KEY,
            namespace TEXT NOT NULL,
            kind TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            natural_key TEXT NOT NULL,
            name TEXT NOT NULL,
            url TEXT,
            media_type TEXT,
            meta_title TEXT,
            meta_description TEXT,
            meta_og_image TEXT,
            body TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(namespace, kind, natural_key)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Index chunks: the local index backend's storage. One row per chunk,
    // keyed by (namespace, content key, ordinal) so an item's chunk set
    // replaces atomically.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS index_chunks (
            namespace TEXT NOT NULL,
            source_key TEXT NOT NULL,
            ordinal INTEGER NOT NULL,
            kind TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            text TEXT NOT NULL,
            hash TEXT NOT NULL,
            PRIMARY KEY (namespace, source_key, ordinal)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_content_items_namespace ON content_items(namespace)",
    )
    .execute(&pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_index_chunks_namespace ON index_chunks(namespace)")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}
