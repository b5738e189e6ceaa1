//! In-memory [`ContentStore`] implementation for tests and examples.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::models::{ContentItem, SourceKind, SourceRef};
use crate::namespace::Namespace;

use super::ContentStore;

/// In-memory store keyed by namespace, preserving ingestion order.
#[derive(Default)]
pub struct InMemoryContentStore {
    items: RwLock<HashMap<String, Vec<ContentItem>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, item: &ContentItem) -> Result<(), EngineError> {
        let mut items = self.items.write().unwrap();
        let entries = items.entry(item.namespace().as_key()).or_default();
        match entries.iter_mut().find(|e| e.id() == item.id()) {
            Some(existing) => *existing = item.clone(),
            None => entries.push(item.clone()),
        }
        Ok(())
    }

    async fn get(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<Option<ContentItem>, EngineError> {
        let items = self.items.read().unwrap();
        Ok(items.get(&namespace.as_key()).and_then(|entries| {
            entries
                .iter()
                .find(|e| e.id() == source.id && e.kind() == source.kind)
                .cloned()
        }))
    }

    async fn find_id(
        &self,
        namespace: &Namespace,
        kind: SourceKind,
        natural_key: &str,
    ) -> Result<Option<String>, EngineError> {
        let items = self.items.read().unwrap();
        Ok(items.get(&namespace.as_key()).and_then(|entries| {
            entries
                .iter()
                .find(|e| e.kind() == kind && e.natural_key() == natural_key)
                .map(|e| e.id().to_string())
        }))
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<ContentItem>, EngineError> {
        let items = self.items.read().unwrap();
        Ok(items.get(&namespace.as_key()).cloned().unwrap_or_default())
    }

    async fn delete(
        &self,
        namespace: &Namespace,
        source: &SourceRef,
    ) -> Result<bool, EngineError> {
        let mut items = self.items.write().unwrap();
        let Some(entries) = items.get_mut(&namespace.as_key()) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|e| !(e.id() == source.id && e.kind() == source.kind));
        Ok(entries.len() < before)
    }
}
