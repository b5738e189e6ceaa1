//! Core data models used throughout Syllabus.
//!
//! These types represent the content items, provenance references, and
//! attribution results that flow through the ingestion and retrieval
//! pipeline. Provenance and content variants are closed sum types so that
//! every consumer handles both cases exhaustively; the flat string forms
//! (`doc_<id>` / `web_<id>`) exist only at the index boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::namespace::Namespace;

/// The provenance kind of an ingested content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// An uploaded document.
    Document,
    /// A scraped web page.
    Website,
}

impl SourceKind {
    /// The flat tag value used in index filter tags (`"document"` / `"website"`).
    pub fn as_tag(&self) -> &'static str {
        match self {
            SourceKind::Document => "document",
            SourceKind::Website => "website",
        }
    }

    /// Parse a filter-tag value back into a kind.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            "document" => Some(SourceKind::Document),
            "website" => Some(SourceKind::Website),
            _ => None,
        }
    }
}

/// A typed reference to the content item a chunk came from.
///
/// Serialized to the external index's flat key form (`doc_<id>` /
/// `web_<id>`) by [`SourceRef::key`] and parsed back by
/// [`SourceRef::parse`]. Internal code never string-matches on prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: String,
}

impl SourceRef {
    pub fn document(id: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Document,
            id: id.into(),
        }
    }

    pub fn website(id: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Website,
            id: id.into(),
        }
    }

    /// The flat content key this reference serializes to at the index
    /// boundary.
    pub fn key(&self) -> String {
        match self.kind {
            SourceKind::Document => format!("doc_{}", self.id),
            SourceKind::Website => format!("web_{}", self.id),
        }
    }

    /// Parse a flat content key. Returns `None` for keys that carry neither
    /// known prefix or have an empty id suffix.
    pub fn parse(key: &str) -> Option<Self> {
        let (kind, id) = if let Some(id) = key.strip_prefix("doc_") {
            (SourceKind::Document, id)
        } else if let Some(id) = key.strip_prefix("web_") {
            (SourceKind::Website, id)
        } else {
            return None;
        };
        if id.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            id: id.to_string(),
        })
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Page metadata extracted by the scraper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_image: Option<String>,
}

/// An ingestible unit: an uploaded document or a scraped web page.
///
/// Owned exclusively by the tenant it was ingested under, and immutable
/// once chunked — re-ingestion replaces the item's chunks rather than
/// mutating them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentItem {
    Document {
        id: String,
        namespace: Namespace,
        owner_id: String,
        file_name: String,
        media_type: String,
        text: String,
        created_at: DateTime<Utc>,
    },
    ScrapedPage {
        id: String,
        namespace: Namespace,
        owner_id: String,
        url: String,
        title: String,
        markdown: String,
        metadata: PageMetadata,
        created_at: DateTime<Utc>,
    },
}

impl ContentItem {
    /// Create an uploaded document with a fresh UUID.
    pub fn document(
        namespace: Namespace,
        owner_id: impl Into<String>,
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        ContentItem::Document {
            id: Uuid::new_v4().to_string(),
            namespace,
            owner_id: owner_id.into(),
            file_name: file_name.into(),
            media_type: media_type.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a scraped page with a fresh UUID.
    pub fn scraped_page(
        namespace: Namespace,
        owner_id: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        markdown: impl Into<String>,
        metadata: PageMetadata,
    ) -> Self {
        ContentItem::ScrapedPage {
            id: Uuid::new_v4().to_string(),
            namespace,
            owner_id: owner_id.into(),
            url: url.into(),
            title: title.into(),
            markdown: markdown.into(),
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Replace the generated id, e.g. when re-ingesting an existing item.
    pub fn with_id(mut self, new_id: impl Into<String>) -> Self {
        match &mut self {
            ContentItem::Document { id, .. } | ContentItem::ScrapedPage { id, .. } => {
                *id = new_id.into();
            }
        }
        self
    }

    pub fn id(&self) -> &str {
        match self {
            ContentItem::Document { id, .. } | ContentItem::ScrapedPage { id, .. } => id,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        match self {
            ContentItem::Document { namespace, .. }
            | ContentItem::ScrapedPage { namespace, .. } => namespace,
        }
    }

    pub fn owner_id(&self) -> &str {
        match self {
            ContentItem::Document { owner_id, .. }
            | ContentItem::ScrapedPage { owner_id, .. } => owner_id,
        }
    }

    /// The raw text the chunker and the keyword fallback operate on.
    pub fn body(&self) -> &str {
        match self {
            ContentItem::Document { text, .. } => text,
            ContentItem::ScrapedPage { markdown, .. } => markdown,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            ContentItem::Document { .. } => SourceKind::Document,
            ContentItem::ScrapedPage { .. } => SourceKind::Website,
        }
    }

    pub fn source_ref(&self) -> SourceRef {
        SourceRef {
            kind: self.kind(),
            id: self.id().to_string(),
        }
    }

    /// Human-readable name surfaced in search results and listings.
    pub fn display_name(&self) -> &str {
        match self {
            ContentItem::Document { file_name, .. } => file_name,
            ContentItem::ScrapedPage { title, url, .. } => {
                if title.is_empty() {
                    url
                } else {
                    title
                }
            }
        }
    }

    /// The natural key used to recognize re-ingestion of the same item:
    /// file name for documents, URL for scraped pages.
    pub fn natural_key(&self) -> &str {
        match self {
            ContentItem::Document { file_name, .. } => file_name,
            ContentItem::ScrapedPage { url, .. } => url,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ContentItem::Document { created_at, .. }
            | ContentItem::ScrapedPage { created_at, .. } => *created_at,
        }
    }
}

/// The de-duplicated set of source identifiers backing a generated answer,
/// split by provenance type for downstream display.
///
/// Both id lists are sorted lexicographically for reproducibility. Empty
/// lists are a valid, common outcome ("no sources found"), distinct from a
/// retrieval failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub document_ids: Vec<String>,
    pub website_ids: Vec<String>,
}

impl Attribution {
    pub fn is_empty(&self) -> bool {
        self.document_ids.is_empty() && self.website_ids.is_empty()
    }
}

/// Generated prose paired with the attribution of its sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributedAnswer {
    pub text: String,
    pub attribution: Attribution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ref_key_round_trip() {
        let doc = SourceRef::document("7");
        assert_eq!(doc.key(), "doc_7");
        assert_eq!(SourceRef::parse("doc_7"), Some(doc));

        let web = SourceRef::website("3");
        assert_eq!(web.key(), "web_3");
        assert_eq!(SourceRef::parse("web_3"), Some(web));
    }

    #[test]
    fn source_ref_rejects_foreign_keys() {
        assert_eq!(SourceRef::parse("chunk_9"), None);
        assert_eq!(SourceRef::parse("doc_"), None);
        assert_eq!(SourceRef::parse(""), None);
        assert_eq!(SourceRef::parse("document_1"), None);
    }

    #[test]
    fn content_item_accessors() {
        let ns = Namespace::personal("42");
        let item = ContentItem::document(ns.clone(), "42", "notes.md", "text/markdown", "body");
        assert_eq!(item.kind(), SourceKind::Document);
        assert_eq!(item.namespace(), &ns);
        assert_eq!(item.display_name(), "notes.md");
        assert_eq!(item.body(), "body");
        assert_eq!(item.source_ref().key(), format!("doc_{}", item.id()));
    }

    #[test]
    fn scraped_page_falls_back_to_url_for_display() {
        let ns = Namespace::shared("s1");
        let page = ContentItem::scraped_page(
            ns,
            "42",
            "https://example.com/syllabus",
            "",
            "content",
            PageMetadata::default(),
        );
        assert_eq!(page.display_name(), "https://example.com/syllabus");
        assert_eq!(page.kind(), SourceKind::Website);
    }

    #[test]
    fn with_id_replaces_generated_id() {
        let item = ContentItem::document(Namespace::personal("u"), "u", "a.txt", "text/plain", "x")
            .with_id("fixed");
        assert_eq!(item.id(), "fixed");
        assert_eq!(item.source_ref().key(), "doc_fixed");
    }
}
