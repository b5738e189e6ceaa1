//! SQLite-backed [`VectorIndex`] implementation for local and development
//! deployments.
//!
//! Stores chunks in the `index_chunks` table and scores them with the
//! engine's deterministic lexical-overlap scorer — no embedding model
//! required. Production deployments implement [`VectorIndex`] against a
//! hosted embedding index instead; this backend keeps the full pipeline
//! runnable (and its tenant-isolation behavior testable) on one machine.
//!
//! Chunk replacement is transactional (delete + insert under the content
//! key), so an item's chunk set is always complete or absent, never
//! partial.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use syllabus_core::error::EngineError;
use syllabus_core::index::{ChunkInfo, ChunkTags, IndexedChunk, ScoredHit, VectorIndex};
use syllabus_core::models::{SourceKind, SourceRef};
use syllabus_core::namespace::Namespace;
use syllabus_core::retrieval::lexical_overlap;

/// SQLite implementation of the [`VectorIndex`] trait.
pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SERVICE: &str = "vector index";

fn index_err(err: sqlx::Error) -> EngineError {
    EngineError::upstream(SERVICE, err)
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    async fn upsert(
        &self,
        tags: &ChunkTags,
        source: &SourceRef,
        chunks: Vec<IndexedChunk>,
    ) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await.map_err(index_err)?;

        sqlx::query("DELETE FROM index_chunks WHERE namespace = ? AND source_key = ?")
            .bind(tags.namespace.as_key())
            .bind(source.key())
            .execute(&mut *tx)
            .await
            .map_err(index_err)?;

        for chunk in &chunks {
            sqlx::query(
                r#"
                INSERT INTO index_chunks (namespace, source_key, ordinal, kind, owner_id, text, hash)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(tags.namespace.as_key())
            .bind(source.key())
            .bind(chunk.ordinal as i64)
            .bind(tags.kind.as_tag())
            .bind(&tags.owner_id)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .execute(&mut *tx)
            .await
            .map_err(index_err)?;
        }

        tx.commit().await.map_err(index_err)
    }

    async fn search(
        &self,
        namespace: &Namespace,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredHit>, EngineError> {
        let rows = sqlx::query(
            r#"
            SELECT namespace, source_key, ordinal, kind, owner_id, text
            FROM index_chunks
            WHERE namespace = ?
            "#,
        )
        .bind(namespace.as_key())
        .fetch_all(&self.pool)
        .await
        .map_err(index_err)?;

        let mut hits: Vec<(i64, ScoredHit)> = Vec::new();
        for row in &rows {
            let namespace_key: String = row.get("namespace");
            let source_key: String = row.get("source_key");
            let kind_tag: String = row.get("kind");

            let Some(source) = SourceRef::parse(&source_key) else {
                warn!(source_key, "index row carries an unparseable content key");
                continue;
            };
            let Some(kind) = SourceKind::parse_tag(&kind_tag) else {
                warn!(kind_tag, "index row carries an unknown kind tag");
                continue;
            };
            // Tags report the row's stored namespace, not the requested
            // one, so the engine's re-check stays meaningful.
            let Some(tagged_namespace) = Namespace::parse_key(&namespace_key) else {
                warn!(namespace_key, "index row carries an unparseable namespace key");
                continue;
            };

            let text: String = row.get("text");
            let score = lexical_overlap(query, &text);
            if score > 0.0 && score >= min_score {
                hits.push((
                    row.get("ordinal"),
                    ScoredHit {
                        source,
                        tags: ChunkTags {
                            namespace: tagged_namespace,
                            kind,
                            owner_id: row.get("owner_id"),
                        },
                        text,
                        score,
                    },
                ));
            }
        }

        hits.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.source.key().cmp(&b.1.source.key()))
                .then_with(|| a.0.cmp(&b.0))
        });
        hits.truncate(limit);

        Ok(hits.into_iter().map(|(_, hit)| hit).collect())
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<ChunkInfo>, EngineError> {
        let rows = sqlx::query(
            r#"
            SELECT source_key, ordinal, length(text) AS chars
            FROM index_chunks
            WHERE namespace = ?
            ORDER BY source_key ASC, ordinal ASC
            "#,
        )
        .bind(namespace.as_key())
        .fetch_all(&self.pool)
        .await
        .map_err(index_err)?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let source_key: String = row.get("source_key");
                let source = SourceRef::parse(&source_key)?;
                let ordinal: i64 = row.get("ordinal");
                let chars: i64 = row.get("chars");
                Some(ChunkInfo {
                    source,
                    ordinal: ordinal as usize,
                    chars: chars as usize,
                })
            })
            .collect())
    }

    async fn delete(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<usize, EngineError> {
        let result = sqlx::query("DELETE FROM index_chunks WHERE namespace = ? AND source_key = ?")
            .bind(namespace.as_key())
            .bind(source.key())
            .execute(&self.pool)
            .await
            .map_err(index_err)?;

        Ok(result.rows_affected() as usize)
    }
}
