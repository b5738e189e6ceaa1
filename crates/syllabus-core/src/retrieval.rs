//! Retrieval engine: the semantic path and the deterministic keyword
//! fallback.
//!
//! Both paths enforce the namespace boundary themselves, even though the
//! index and the store are already asked for namespace-scoped data — a
//! candidate tagged with a different namespace is dropped and logged, no
//! matter what the backend returned.
//!
//! # Semantic path
//!
//! [`retrieve`] delegates ranking to the external index and applies the
//! configured similarity threshold in the engine, counting how many
//! candidates it excluded. An all-excluded retrieval therefore returns
//! zero candidates with a nonzero [`Retrieval::below_threshold`] — the
//! same shape as an empty corpus, but distinguishable in logs when tuning
//! the threshold.
//!
//! # Keyword fallback
//!
//! [`keyword_rank`] scores locally held documents by case-insensitive
//! occurrence counts of the query's tokens. It is pure and fully
//! deterministic: stable descending sort (equal-score documents keep their
//! ingestion order), a fixed result cap of [`KEYWORD_RESULT_CAP`], and
//! previews truncated to [`PREVIEW_CHARS`] characters.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::index::VectorIndex;
use crate::models::{ContentItem, SourceRef};
use crate::namespace::Namespace;

/// Keyword fallback results are capped here regardless of the caller's
/// requested limit (kept for UI brevity; a product decision, not a bug).
pub const KEYWORD_RESULT_CAP: usize = 5;

/// Preview length for fallback results; previews are for display and
/// citation context, not for feeding back into generation.
pub const PREVIEW_CHARS: usize = 500;

const PREVIEW_MARKER: &str = "...";

/// Query tokens shorter than this are discarded as stop-word-like noise.
const MIN_TOKEN_CHARS: usize = 3;

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    /// Candidates scoring below this are rejected rather than padding the
    /// context with irrelevant filler.
    pub min_score: f32,
    /// Maximum candidates returned from the semantic path.
    pub limit: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            min_score: 0.5,
            limit: 8,
        }
    }
}

/// An ephemeral, request-scoped retrieval candidate. Never persisted.
#[derive(Debug, Clone)]
pub struct RetrievalCandidate {
    pub source: SourceRef,
    pub score: f32,
    pub text: String,
}

/// Outcome of a semantic retrieval.
#[derive(Debug, Default)]
pub struct Retrieval {
    /// Ranked candidates, bounded by [`RetrievalParams::limit`].
    pub candidates: Vec<RetrievalCandidate>,
    /// Candidates the index returned that scored below the threshold.
    pub below_threshold: usize,
}

impl Retrieval {
    /// Concatenated candidate texts, ready to hand to the generation step.
    pub fn context_text(&self) -> String {
        self.candidates
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Semantic retrieval over the external vector index.
///
/// The index is asked for namespace-scoped, ranked hits with no score
/// floor; the engine applies `params.min_score` itself so exclusions are
/// observable, re-checks every hit's namespace tag, and bounds the result.
pub async fn retrieve(
    index: &dyn VectorIndex,
    namespace: &Namespace,
    query: &str,
    params: &RetrievalParams,
) -> Result<Retrieval, EngineError> {
    if query.trim().is_empty() {
        return Ok(Retrieval::default());
    }

    let hits = index.search(namespace, query, params.limit, 0.0).await?;

    let mut below_threshold = 0usize;
    let mut candidates = Vec::new();
    for hit in hits {
        if hit.tags.namespace != *namespace {
            warn!(
                requested = %namespace,
                tagged = %hit.tags.namespace,
                source = %hit.source,
                "index returned a foreign-namespace chunk; dropping"
            );
            continue;
        }
        if hit.score < params.min_score {
            below_threshold += 1;
            continue;
        }
        candidates.push(RetrievalCandidate {
            source: hit.source,
            score: hit.score,
            text: hit.text,
        });
    }
    candidates.truncate(params.limit);

    if candidates.is_empty() && below_threshold > 0 {
        debug!(
            namespace = %namespace,
            below_threshold,
            min_score = params.min_score,
            "all semantic candidates scored below the similarity threshold"
        );
    }

    Ok(Retrieval {
        candidates,
        below_threshold,
    })
}

/// A ranked fallback-search result: a document preview, not a chunk.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordMatch {
    pub source: SourceRef,
    pub name: String,
    /// Summed occurrence count of surviving query tokens.
    pub score: usize,
    /// Body preview, at most [`PREVIEW_CHARS`] characters plus a marker.
    pub preview: String,
}

/// Deterministic keyword-overlap ranking over locally held documents.
///
/// Documents tagged with a namespace other than `namespace` never appear,
/// regardless of what the store handed over.
pub fn keyword_rank(
    query: &str,
    documents: &[ContentItem],
    namespace: &Namespace,
) -> Vec<KeywordMatch> {
    let tokens = query_tokens(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<KeywordMatch> = documents
        .iter()
        .filter(|item| {
            if item.namespace() != namespace {
                warn!(
                    requested = %namespace,
                    tagged = %item.namespace(),
                    source = %item.source_ref(),
                    "store returned a foreign-namespace item; dropping"
                );
                return false;
            }
            true
        })
        .filter_map(|item| {
            let body = item.body().to_lowercase();
            let score: usize = tokens.iter().map(|t| body.matches(t.as_str()).count()).sum();
            if score == 0 {
                return None;
            }
            Some(KeywordMatch {
                source: item.source_ref(),
                name: item.display_name().to_string(),
                score,
                preview: preview(item.body()),
            })
        })
        .collect();

    // Stable sort: equal-score documents keep their retrieval order.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(KEYWORD_RESULT_CAP);
    matches
}

/// Fraction of surviving query tokens present in `text`, in `[0.0, 1.0]`.
///
/// The deterministic relevance scorer used by the bundled index backends
/// in place of embedding similarity.
pub fn lexical_overlap(query: &str, text: &str) -> f32 {
    let mut tokens = query_tokens(query);
    tokens.sort();
    tokens.dedup();
    if tokens.is_empty() {
        return 0.0;
    }

    let haystack = text.to_lowercase();
    let present = tokens
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .count();
    present as f32 / tokens.len() as f32
}

fn query_tokens(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(|t| t.to_lowercase())
        .collect()
}

fn preview(body: &str) -> String {
    let mut out: String = body.chars().take(PREVIEW_CHARS).collect();
    if body.chars().count() > PREVIEW_CHARS {
        out.push_str(PREVIEW_MARKER);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::InMemoryIndex;
    use crate::index::{ChunkTags, IndexedChunk};
    use crate::models::SourceKind;

    fn doc(ns: &Namespace, name: &str, text: &str) -> ContentItem {
        ContentItem::document(ns.clone(), "owner", name, "text/plain", text)
    }

    #[test]
    fn short_tokens_are_discarded() {
        assert_eq!(query_tokens("go to TX on a jet"), vec!["jet"]);
        assert!(query_tokens("a of to").is_empty());
    }

    #[test]
    fn keyword_rank_orders_by_occurrence_count() {
        let ns = Namespace::personal("1");
        let docs = vec![
            doc(&ns, "once.txt", "mitosis appears here a single time"),
            doc(&ns, "thrice.txt", "mitosis, mitosis, and again mitosis"),
            doc(&ns, "none.txt", "nothing relevant in this one"),
        ];

        let ranked = keyword_rank("mitosis", &docs, &ns);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "thrice.txt");
        assert_eq!(ranked[0].score, 3);
        assert_eq!(ranked[1].name, "once.txt");
        assert_eq!(ranked[1].score, 1);
    }

    #[test]
    fn keyword_rank_is_case_insensitive() {
        let ns = Namespace::personal("1");
        let docs = vec![doc(&ns, "d.txt", "Mitosis and MITOSIS and mItOsIs")];
        let ranked = keyword_rank("mitosis", &docs, &ns);
        assert_eq!(ranked[0].score, 3);
    }

    #[test]
    fn equal_scores_keep_retrieval_order() {
        let ns = Namespace::personal("1");
        let docs = vec![
            doc(&ns, "first.txt", "osmosis mentioned once"),
            doc(&ns, "second.txt", "osmosis mentioned once"),
            doc(&ns, "third.txt", "osmosis mentioned once"),
        ];
        let ranked = keyword_rank("osmosis", &docs, &ns);
        let names: Vec<&str> = ranked.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["first.txt", "second.txt", "third.txt"]);
    }

    #[test]
    fn results_are_capped_at_five() {
        let ns = Namespace::personal("1");
        let docs: Vec<ContentItem> = (0..8)
            .map(|i| doc(&ns, &format!("d{i}.txt"), "entropy is discussed"))
            .collect();
        let ranked = keyword_rank("entropy", &docs, &ns);
        assert_eq!(ranked.len(), KEYWORD_RESULT_CAP);
    }

    #[test]
    fn previews_are_truncated_with_marker() {
        let ns = Namespace::personal("1");
        let long_body = format!("entropy {}", "x".repeat(900));
        let docs = vec![doc(&ns, "long.txt", &long_body)];
        let ranked = keyword_rank("entropy", &docs, &ns);
        let preview = &ranked[0].preview;
        assert!(preview.chars().count() <= PREVIEW_CHARS + PREVIEW_MARKER.len());
        assert!(preview.ends_with(PREVIEW_MARKER));

        let short_docs = vec![doc(&ns, "short.txt", "entropy in a short body")];
        let ranked = keyword_rank("entropy", &short_docs, &ns);
        assert!(!ranked[0].preview.ends_with(PREVIEW_MARKER));
    }

    #[test]
    fn foreign_namespace_documents_never_rank() {
        let mine = Namespace::personal("1");
        let theirs = Namespace::shared("s");
        let docs = vec![
            doc(&mine, "mine.txt", "thermodynamics notes"),
            doc(&theirs, "theirs.txt", "thermodynamics notes"),
        ];
        let ranked = keyword_rank("thermodynamics", &docs, &mine);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "mine.txt");
    }

    #[test]
    fn lexical_overlap_is_a_fraction_of_tokens() {
        assert_eq!(lexical_overlap("cell division biology", "cell biology"), 2.0 / 3.0);
        assert_eq!(lexical_overlap("cell", "cell cell cell"), 1.0);
        assert_eq!(lexical_overlap("missing", "nothing here"), 0.0);
        assert_eq!(lexical_overlap("", "anything"), 0.0);
    }

    #[tokio::test]
    async fn retrieve_applies_threshold_and_counts_exclusions() {
        let index = InMemoryIndex::new();
        let ns = Namespace::personal("1");
        let tags = ChunkTags {
            namespace: ns.clone(),
            kind: SourceKind::Document,
            owner_id: "1".into(),
        };
        index
            .upsert(
                &tags,
                &SourceRef::document("a"),
                vec![IndexedChunk {
                    ordinal: 0,
                    text: "covers cell biology only".into(),
                    hash: crate::chunk::chunk_hash("covers cell biology only"),
                }],
            )
            .await
            .unwrap();

        // One of three query tokens matches: overlap 1/3, below 0.5.
        let params = RetrievalParams {
            min_score: 0.5,
            limit: 8,
        };
        let retrieval = retrieve(&index, &ns, "biology exam schedule", &params)
            .await
            .unwrap();
        assert!(retrieval.candidates.is_empty());
        assert_eq!(retrieval.below_threshold, 1);

        // Two of three tokens match: overlap 2/3, above 0.5.
        let retrieval = retrieve(&index, &ns, "cell biology homework", &params)
            .await
            .unwrap();
        assert_eq!(retrieval.candidates.len(), 1);
        assert_eq!(retrieval.below_threshold, 0);
    }

    #[tokio::test]
    async fn retrieve_empty_query_short_circuits() {
        let index = InMemoryIndex::new();
        let ns = Namespace::personal("1");
        let retrieval = retrieve(&index, &ns, "   ", &RetrievalParams::default())
            .await
            .unwrap();
        assert!(retrieval.candidates.is_empty());
        assert_eq!(retrieval.below_threshold, 0);
    }
}
