//! Attribution builder: which sources backed an answer.
//!
//! A document contributing multiple chunks is cited once, not once per
//! chunk. Output ordering is lexicographic for reproducibility. Zero
//! candidates yield two empty sets — "no sources found" is a valid,
//! common outcome, not an error.

use std::collections::BTreeSet;

use tracing::warn;

use crate::models::{Attribution, SourceKind, SourceRef};
use crate::retrieval::RetrievalCandidate;

/// Derive the de-duplicated source attribution for a candidate set.
pub fn attribute(candidates: &[RetrievalCandidate]) -> Attribution {
    collect(candidates.iter().map(|c| c.source.clone()))
}

/// Attribution from flat content keys, e.g. when the candidate set comes
/// back from an external system that only carries keys. Keys that parse to
/// neither provenance kind are skipped — they can only arise from foreign
/// index writes, which the retrieval engine already treats as untrusted.
pub fn attribute_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Attribution {
    collect(keys.into_iter().filter_map(|key| {
        let parsed = SourceRef::parse(key);
        if parsed.is_none() {
            warn!(key, "skipping unattributable content key");
        }
        parsed
    }))
}

fn collect(sources: impl Iterator<Item = SourceRef>) -> Attribution {
    let mut document_ids = BTreeSet::new();
    let mut website_ids = BTreeSet::new();

    for source in sources {
        match source.kind {
            SourceKind::Document => document_ids.insert(source.id),
            SourceKind::Website => website_ids.insert(source.id),
        };
    }

    Attribution {
        document_ids: document_ids.into_iter().collect(),
        website_ids: website_ids.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_candidates_yield_empty_sets() {
        let attribution = attribute(&[]);
        assert!(attribution.document_ids.is_empty());
        assert!(attribution.website_ids.is_empty());
        assert!(attribution.is_empty());
    }

    #[test]
    fn duplicate_chunks_cite_their_document_once() {
        let attribution = attribute_keys(["doc_7", "doc_7", "web_3"]);
        assert_eq!(attribution.document_ids, vec!["7"]);
        assert_eq!(attribution.website_ids, vec!["3"]);
    }

    #[test]
    fn output_is_sorted_lexicographically() {
        let attribution = attribute_keys(["doc_b", "doc_a", "web_2", "web_10"]);
        assert_eq!(attribution.document_ids, vec!["a", "b"]);
        // Lexicographic, not numeric.
        assert_eq!(attribution.website_ids, vec!["10", "2"]);
    }

    #[test]
    fn unparseable_keys_are_skipped() {
        let attribution = attribute_keys(["doc_1", "chunk_9", "", "web_x"]);
        assert_eq!(attribution.document_ids, vec!["1"]);
        assert_eq!(attribution.website_ids, vec!["x"]);
    }

    #[test]
    fn candidate_sources_split_by_kind() {
        let candidates = vec![
            RetrievalCandidate {
                source: SourceRef::document("d1"),
                score: 0.9,
                text: "one".into(),
            },
            RetrievalCandidate {
                source: SourceRef::website("w1"),
                score: 0.8,
                text: "two".into(),
            },
            RetrievalCandidate {
                source: SourceRef::document("d1"),
                score: 0.7,
                text: "three".into(),
            },
        ];
        let attribution = attribute(&candidates);
        assert_eq!(attribution.document_ids, vec!["d1"]);
        assert_eq!(attribution.website_ids, vec!["w1"]);
    }
}
