//! In-memory [`VectorIndex`] implementation for tests and examples.
//!
//! Uses a `HashMap` behind `std::sync::RwLock` for thread safety. Search is
//! brute-force over every chunk in the namespace, scored with the
//! deterministic lexical-overlap scorer so tests need no embedding model.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::models::SourceRef;
use crate::namespace::Namespace;
use crate::retrieval::lexical_overlap;

use super::{ChunkInfo, ChunkTags, IndexedChunk, ScoredHit, VectorIndex};

struct Entry {
    source: SourceRef,
    tags: ChunkTags,
    chunks: Vec<IndexedChunk>,
}

/// In-memory index keyed by `(namespace key, content key)`.
#[derive(Default)]
pub struct InMemoryIndex {
    entries: RwLock<HashMap<(String, String), Entry>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of chunks currently indexed, across all namespaces.
    pub fn chunk_count(&self) -> usize {
        self.entries
            .read()
            .unwrap()
            .values()
            .map(|e| e.chunks.len())
            .sum()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(
        &self,
        tags: &ChunkTags,
        source: &SourceRef,
        chunks: Vec<IndexedChunk>,
    ) -> Result<(), EngineError> {
        let key = (tags.namespace.as_key(), source.key());
        let mut entries = self.entries.write().unwrap();
        if chunks.is_empty() {
            entries.remove(&key);
        } else {
            entries.insert(
                key,
                Entry {
                    source: source.clone(),
                    tags: tags.clone(),
                    chunks,
                },
            );
        }
        Ok(())
    }

    async fn search(
        &self,
        namespace: &Namespace,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredHit>, EngineError> {
        let ns_key = namespace.as_key();
        let entries = self.entries.read().unwrap();

        let mut hits: Vec<ScoredHit> = Vec::new();
        for ((entry_ns, _), entry) in entries.iter() {
            if *entry_ns != ns_key {
                continue;
            }
            for chunk in &entry.chunks {
                let score = lexical_overlap(query, &chunk.text);
                if score > 0.0 && score >= min_score {
                    hits.push(ScoredHit {
                        source: entry.source.clone(),
                        tags: entry.tags.clone(),
                        text: chunk.text.clone(),
                        score,
                    });
                }
            }
        }

        // Ranked by score; ties broken by content key then text so the
        // ordering is reproducible across runs.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.source.key().cmp(&b.source.key()))
                .then_with(|| a.text.cmp(&b.text))
        });
        hits.truncate(limit);

        Ok(hits)
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<ChunkInfo>, EngineError> {
        let ns_key = namespace.as_key();
        let entries = self.entries.read().unwrap();

        let mut infos: Vec<ChunkInfo> = entries
            .iter()
            .filter(|((entry_ns, _), _)| *entry_ns == ns_key)
            .flat_map(|(_, entry)| {
                entry.chunks.iter().map(|chunk| ChunkInfo {
                    source: entry.source.clone(),
                    ordinal: chunk.ordinal,
                    chars: chunk.text.chars().count(),
                })
            })
            .collect();

        infos.sort_by(|a, b| {
            a.source
                .key()
                .cmp(&b.source.key())
                .then(a.ordinal.cmp(&b.ordinal))
        });
        Ok(infos)
    }

    async fn delete(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<usize, EngineError> {
        let key = (namespace.as_key(), source.key());
        let mut entries = self.entries.write().unwrap();
        Ok(entries.remove(&key).map(|e| e.chunks.len()).unwrap_or(0))
    }
}
