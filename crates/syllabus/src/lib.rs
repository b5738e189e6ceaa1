//! # Syllabus
//!
//! **Tenant-scoped content ingestion, retrieval, and attribution for AI
//! teaching assistants.**
//!
//! Syllabus turns uploaded documents and scraped web pages into
//! retrieval-sized chunks, isolates every tenant's corpus behind a
//! namespace (personal or shared space), ranks relevant content for a
//! query — via the vector index or a deterministic keyword fallback — and
//! attributes which sources backed a generated answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌───────────────┐
//! │ Upload/Scrape│──▶│ Chunk + Tag        │──▶│ Vector index  │
//! │  (raw text)  │   │ (namespace-scoped) │   │ (per tenant)  │
//! └──────────────┘   └───────────────────┘   └──────┬────────┘
//!                                                   │
//!                            ┌──────────────────────┤
//!                            ▼                      ▼
//!                      ┌──────────┐          ┌─────────────┐
//!                      │ Keyword  │          │  Semantic   │
//!                      │ fallback │          │  retrieval  │
//!                      └────┬─────┘          └──────┬──────┘
//!                           └───────┬───────────────┘
//!                                   ▼
//!                            ┌─────────────┐
//!                            │ Attribution │
//!                            └─────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The [`assist::Assistant`] facade receives raw document text or
//!    scraped markdown with an owner and optional space.
//! 2. The namespace resolver derives the isolation key; the access policy
//!    authorizes the caller (fail closed).
//! 3. The chunker splits the text into bounded, sentence-respecting
//!    chunks, each tagged with namespace, content kind, and owner.
//! 4. One atomic index upsert per item makes re-ingestion idempotent.
//! 5. Retrieval ranks namespace-scoped candidates; attribution
//!    de-duplicates their source references for citation.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`content_store`] | SQLite `ContentStore` backend |
//! | [`sqlite_index`] | SQLite `VectorIndex` backend (local/dev) |
//! | [`scrape`] | Web scraper client (consumed capability) |
//! | [`completion`] | Completion provider client (consumed capability) |
//! | [`assist`] | The caller-facing assistant facade |
//!
//! ## Configuration
//!
//! Syllabus is configured via a TOML file (default: `./config/syllabus.toml`).
//! See [`config`] for all available options and [`config::load_config`]
//! for validation rules.

pub mod assist;
pub mod completion;
pub mod config;
pub mod content_store;
pub mod db;
pub mod migrate;
pub mod scrape;
pub mod sqlite_index;

pub use assist::{Assistant, SearchOutcome};
pub use syllabus_core::models::{AttributedAnswer, Attribution, ContentItem, SourceRef};
pub use syllabus_core::namespace::Namespace;
