//! Ingestion coordination: authorize → persist → chunk → tag → index.
//!
//! The index submission for one item is a single upsert under the item's
//! content key, so re-ingestion replaces rather than duplicates, and a
//! failed submission leaves no partial chunk state behind. Ingestion
//! failures are hard failures — nothing here retries, so a partial corpus
//! is never silently assumed complete.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::access::AccessPolicy;
use crate::chunk::{chunk_hash, chunk_text};
use crate::error::EngineError;
use crate::index::{ChunkTags, IndexedChunk, VectorIndex};
use crate::models::{ContentItem, SourceRef};
use crate::namespace::Namespace;
use crate::store::ContentStore;

/// What an ingestion produced, for display to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReceipt {
    pub source: SourceRef,
    pub chunk_count: usize,
}

/// Coordinates ingestion, removal, and listing of content items for a
/// namespace.
pub struct Ingestor {
    store: Arc<dyn ContentStore>,
    index: Arc<dyn VectorIndex>,
    access: Arc<dyn AccessPolicy>,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn ContentStore>,
        index: Arc<dyn VectorIndex>,
        access: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            store,
            index,
            access,
        }
    }

    /// Ingest one content item into its namespace.
    ///
    /// Zero chunks (content entirely below the minimum viable size) is a
    /// success with `chunk_count: 0`; the item's index key is cleared so a
    /// shrunken re-ingestion does not leave stale chunks behind.
    pub async fn ingest(
        &self,
        caller_id: &str,
        item: ContentItem,
    ) -> Result<IngestionReceipt, EngineError> {
        let namespace = item.namespace().clone();
        self.access.authorize(caller_id, &namespace).await?;

        self.store.put(&item).await?;

        let chunks = chunk_text(item.body());
        if chunks.is_empty() {
            debug!(source = %item.source_ref(), "content produced zero chunks");
        }
        let indexed: Vec<IndexedChunk> = chunks
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| IndexedChunk {
                ordinal,
                hash: chunk_hash(&text),
                text,
            })
            .collect();
        let chunk_count = indexed.len();

        let tags = ChunkTags {
            namespace: namespace.clone(),
            kind: item.kind(),
            owner_id: item.owner_id().to_string(),
        };
        let source = item.source_ref();
        self.index.upsert(&tags, &source, indexed).await?;

        info!(
            namespace = %namespace,
            source = %source,
            chunk_count,
            "ingested content item"
        );
        Ok(IngestionReceipt {
            source,
            chunk_count,
        })
    }

    /// Delete a content item and cascade-delete its chunks from the index.
    /// Returns the number of chunks removed.
    pub async fn remove(
        &self,
        caller_id: &str,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<usize, EngineError> {
        self.access.authorize(caller_id, namespace).await?;

        self.store.delete(namespace, source).await?;
        let removed = self.index.delete(namespace, source).await?;
        info!(namespace = %namespace, source = %source, removed, "removed content item");
        Ok(removed)
    }

    /// List the namespace's content items.
    pub async fn list(
        &self,
        caller_id: &str,
        namespace: &Namespace,
    ) -> Result<Vec<ContentItem>, EngineError> {
        self.access.authorize(caller_id, namespace).await?;
        self.store.list(namespace).await
    }
}
