//! Content record store abstraction.
//!
//! The [`ContentStore`] trait holds the locally available content items a
//! tenant has ingested — the corpus the deterministic keyword fallback
//! ranks over, and the system of record for cascade deletes. Raw file
//! bytes live elsewhere; the store only carries the extracted text and
//! metadata the engine needs.
//!
//! Bundled backends: [`memory::InMemoryContentStore`] here and
//! `syllabus::content_store::SqliteContentStore` in the app crate.

pub mod memory;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::models::{ContentItem, SourceKind, SourceRef};
use crate::namespace::Namespace;

/// Storage for a tenant's ingested content items.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert or update an item under its namespace. Updating an existing
    /// id replaces the record.
    async fn put(&self, item: &ContentItem) -> Result<(), EngineError>;

    /// Fetch one item by provenance reference.
    async fn get(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<Option<ContentItem>, EngineError>;

    /// Look up an existing item's id by its natural key (file name for
    /// documents, URL for pages), so re-ingestion can reuse the id and
    /// stay idempotent.
    async fn find_id(
        &self,
        namespace: &Namespace,
        kind: SourceKind,
        natural_key: &str,
    ) -> Result<Option<String>, EngineError>;

    /// All items in a namespace, in ingestion order (stable, so fallback
    /// ranking ties reproduce).
    async fn list(&self, namespace: &Namespace) -> Result<Vec<ContentItem>, EngineError>;

    /// Delete one item. Returns whether it existed.
    async fn delete(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<bool, EngineError>;
}
