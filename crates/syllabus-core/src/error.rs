//! Engine error type.
//!
//! Two conditions are deliberately *not* errors: chunking that produces
//! zero chunks (a zero-chunk success, see [`crate::ingest`]) and a
//! retrieval whose candidates all scored below the similarity threshold
//! (zero results with a nonzero `below_threshold` counter, see
//! [`crate::retrieval::Retrieval`]). Collapsing either into an error — or
//! collapsing an upstream failure into an empty result — would make "nothing
//! relevant found" indistinguishable from "retrieval broke".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller lacks access to the resolved namespace. Always fails
    /// closed; never degrades to a partial result.
    #[error("caller is not authorized for namespace {namespace}")]
    Unauthorized { namespace: String },

    /// An out-of-scope collaborator (vector index, content store, scraper,
    /// completion) failed. Surfaced verbatim to the caller.
    #[error("{service} unavailable: {message}")]
    Upstream { service: String, message: String },
}

impl EngineError {
    pub fn unauthorized(namespace: &crate::namespace::Namespace) -> Self {
        EngineError::Unauthorized {
            namespace: namespace.as_key(),
        }
    }

    pub fn upstream(service: &str, err: impl std::fmt::Display) -> Self {
        EngineError::Upstream {
            service: service.to_string(),
            message: err.to_string(),
        }
    }
}
