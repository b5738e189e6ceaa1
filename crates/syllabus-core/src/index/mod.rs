//! Vector index abstraction.
//!
//! The [`VectorIndex`] trait is the seam to the external embedding index.
//! The engine only decides *what* gets indexed, under *which* namespace,
//! and how results are filtered — nearest-neighbor search itself is the
//! backend's job.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`upsert`](VectorIndex::upsert) | Replace all chunks stored under a content key |
//! | [`search`](VectorIndex::search) | Scored search constrained to one namespace |
//! | [`list`](VectorIndex::list) | Chunk metadata for a namespace |
//! | [`delete`](VectorIndex::delete) | Cascade-delete a content item's chunks |
//!
//! `upsert` has replace semantics per content key: submitting the chunk
//! set for an item that is already indexed replaces the old set, never
//! duplicates it, and an empty set clears the key. The whole call is a
//! single atomic submit-or-fail unit — partial chunk state is never
//! acceptable, since it would leave a document partially citable.
//!
//! Bundled backends: [`memory::InMemoryIndex`] here and
//! `syllabus::sqlite_index::SqliteIndex` in the app crate.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{SourceKind, SourceRef};
use crate::namespace::Namespace;

/// Tenant filter tags carried by every indexed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkTags {
    pub namespace: Namespace,
    pub kind: SourceKind,
    pub owner_id: String,
}

/// One chunk as submitted to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Zero-based position within the source item; preserves source order.
    pub ordinal: usize,
    pub text: String,
    /// SHA-256 of `text`, for staleness detection.
    pub hash: String,
}

/// A scored candidate chunk returned from [`VectorIndex::search`].
#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub source: SourceRef,
    pub tags: ChunkTags,
    pub text: String,
    /// Relevance score in `[0.0, 1.0]`, already ranked by the backend.
    pub score: f32,
}

/// Lightweight chunk metadata returned from [`VectorIndex::list`].
#[derive(Debug, Clone, Serialize)]
pub struct ChunkInfo {
    pub source: SourceRef,
    pub ordinal: usize,
    pub chars: usize,
}

/// The external embedding/vector index, consumed as a capability.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replace the chunk set stored under `source` in the tagged
    /// namespace. Atomic: either every chunk is indexed or none are.
    async fn upsert(
        &self,
        tags: &ChunkTags,
        source: &SourceRef,
        chunks: Vec<IndexedChunk>,
    ) -> Result<(), EngineError>;

    /// Scored search constrained to `namespace`. Backends that can
    /// pre-filter on `min_score` should; the engine re-checks regardless.
    async fn search(
        &self,
        namespace: &Namespace,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredHit>, EngineError>;

    /// Chunk metadata for everything indexed in `namespace`, ordered by
    /// content key then ordinal.
    async fn list(&self, namespace: &Namespace) -> Result<Vec<ChunkInfo>, EngineError>;

    /// Remove all chunks stored under `source`. Returns the number of
    /// chunks removed.
    async fn delete(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<usize, EngineError>;
}
