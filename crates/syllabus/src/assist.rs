//! The caller-facing assistant facade.
//!
//! Wires the core engine (namespace resolution, access policy, ingestion,
//! retrieval, attribution) to the configured backends and to the
//! completion provider. Every operation resolves the caller's namespace
//! first and authorizes against it before touching any data.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use syllabus_core::access::AccessPolicy;
use syllabus_core::attribution::attribute;
use syllabus_core::error::EngineError;
use syllabus_core::index::{ChunkInfo, VectorIndex};
use syllabus_core::ingest::{IngestionReceipt, Ingestor};
use syllabus_core::models::{
    AttributedAnswer, Attribution, ContentItem, PageMetadata, SourceKind, SourceRef,
};
use syllabus_core::namespace::Namespace;
use syllabus_core::retrieval::{self, KeywordMatch, RetrievalCandidate, RetrievalParams};
use syllabus_core::store::ContentStore;

use crate::completion::CompletionProvider;

/// Outcome of a semantic search: the candidates, the concatenated context
/// for generation, and the attribution of contributing sources.
#[derive(Debug)]
pub struct SearchOutcome {
    pub candidates: Vec<RetrievalCandidate>,
    pub source_text: String,
    pub attribution: Attribution,
    /// Candidates excluded by the similarity threshold. Nonzero with zero
    /// candidates means "related but not related enough", as opposed to an
    /// empty corpus.
    pub below_threshold: usize,
}

/// The assistant surface shared by the CLI and any embedding application.
pub struct Assistant {
    store: Arc<dyn ContentStore>,
    index: Arc<dyn VectorIndex>,
    access: Arc<dyn AccessPolicy>,
    ingestor: Ingestor,
    params: RetrievalParams,
}

impl Assistant {
    pub fn new(
        store: Arc<dyn ContentStore>,
        index: Arc<dyn VectorIndex>,
        access: Arc<dyn AccessPolicy>,
        params: RetrievalParams,
    ) -> Self {
        let ingestor = Ingestor::new(store.clone(), index.clone(), access.clone());
        Self {
            store,
            index,
            access,
            ingestor,
            params,
        }
    }

    /// Ingest an uploaded document. Re-ingesting a file of the same name
    /// in the same namespace replaces its chunks rather than duplicating
    /// them.
    pub async fn ingest_document(
        &self,
        owner_id: &str,
        space_id: Option<&str>,
        file_name: &str,
        media_type: &str,
        raw_text: &str,
    ) -> Result<IngestionReceipt, EngineError> {
        let namespace = Namespace::resolve(owner_id, space_id);
        let mut item =
            ContentItem::document(namespace.clone(), owner_id, file_name, media_type, raw_text);
        if let Some(existing) = self
            .store
            .find_id(&namespace, SourceKind::Document, file_name)
            .await?
        {
            debug!(file_name, id = %existing, "re-ingesting existing document");
            item = item.with_id(existing);
        }
        self.ingestor.ingest(owner_id, item).await
    }

    /// Ingest a scraped page. Re-scraping the same URL in the same
    /// namespace replaces its chunks.
    pub async fn ingest_scraped_page(
        &self,
        owner_id: &str,
        space_id: Option<&str>,
        url: &str,
        title: &str,
        raw_markdown: &str,
        metadata: PageMetadata,
    ) -> Result<IngestionReceipt, EngineError> {
        let namespace = Namespace::resolve(owner_id, space_id);
        let mut item = ContentItem::scraped_page(
            namespace.clone(),
            owner_id,
            url,
            title,
            raw_markdown,
            metadata,
        );
        if let Some(existing) = self
            .store
            .find_id(&namespace, SourceKind::Website, url)
            .await?
        {
            debug!(url, id = %existing, "re-ingesting existing page");
            item = item.with_id(existing);
        }
        self.ingestor.ingest(owner_id, item).await
    }

    /// Semantic search with attribution.
    pub async fn search(
        &self,
        owner_id: &str,
        space_id: Option<&str>,
        query: &str,
        limit: Option<usize>,
    ) -> Result<SearchOutcome, EngineError> {
        let namespace = Namespace::resolve(owner_id, space_id);
        self.access.authorize(owner_id, &namespace).await?;

        let mut params = self.params.clone();
        if let Some(limit) = limit {
            params.limit = limit;
        }

        let result = retrieval::retrieve(self.index.as_ref(), &namespace, query, &params).await?;
        let attribution = attribute(&result.candidates);
        Ok(SearchOutcome {
            source_text: result.context_text(),
            candidates: result.candidates,
            attribution,
            below_threshold: result.below_threshold,
        })
    }

    /// Semantic search followed by generation: retrieved context in,
    /// attributed prose out. With zero candidates the completion call is
    /// skipped and the answer text stays empty — the attribution still
    /// reports "no sources", which the caller renders distinctly from a
    /// failure.
    pub async fn answer(
        &self,
        owner_id: &str,
        space_id: Option<&str>,
        query: &str,
        limit: Option<usize>,
        completion: &dyn CompletionProvider,
    ) -> Result<AttributedAnswer> {
        let outcome = self.search(owner_id, space_id, query, limit).await?;
        if outcome.candidates.is_empty() {
            return Ok(AttributedAnswer {
                text: String::new(),
                attribution: outcome.attribution,
            });
        }

        let text = completion
            .complete(query, &outcome.source_text)
            .await
            .context("generation failed")?;
        Ok(AttributedAnswer {
            text,
            attribution: outcome.attribution,
        })
    }

    /// Deterministic keyword search over the namespace's own documents —
    /// usable without the vector index.
    pub async fn keyword_search(
        &self,
        owner_id: &str,
        space_id: Option<&str>,
        query: &str,
    ) -> Result<Vec<KeywordMatch>, EngineError> {
        let namespace = Namespace::resolve(owner_id, space_id);
        self.access.authorize(owner_id, &namespace).await?;

        let documents = self.store.list(&namespace).await?;
        Ok(retrieval::keyword_rank(query, &documents, &namespace))
    }

    /// List the namespace's content items.
    pub async fn list(
        &self,
        owner_id: &str,
        space_id: Option<&str>,
    ) -> Result<Vec<ContentItem>, EngineError> {
        let namespace = Namespace::resolve(owner_id, space_id);
        self.ingestor.list(owner_id, &namespace).await
    }

    /// Chunk metadata for everything indexed under the namespace.
    pub async fn chunks(
        &self,
        owner_id: &str,
        space_id: Option<&str>,
    ) -> Result<Vec<ChunkInfo>, EngineError> {
        let namespace = Namespace::resolve(owner_id, space_id);
        self.access.authorize(owner_id, &namespace).await?;
        self.index.list(&namespace).await
    }

    /// Delete a content item and cascade-delete its chunks from the
    /// index. Returns the number of chunks removed.
    pub async fn remove(
        &self,
        owner_id: &str,
        space_id: Option<&str>,
        source: &SourceRef,
    ) -> Result<usize, EngineError> {
        let namespace = Namespace::resolve(owner_id, space_id);
        self.ingestor.remove(owner_id, &namespace, source).await
    }
}
