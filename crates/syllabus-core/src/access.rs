//! Access control seam.
//!
//! Membership and invitation workflows live outside the engine; the engine
//! only ever asks one question — may this caller touch this namespace? —
//! and fails closed on any answer but yes.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::EngineError;
use crate::namespace::Namespace;

/// The out-of-scope access-control collaborator, consumed as a capability.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Ok iff `user_id` may ingest into / retrieve from `namespace`.
    /// Anything else is [`EngineError::Unauthorized`] — never a degraded
    /// result.
    async fn authorize(&self, user_id: &str, namespace: &Namespace) -> Result<(), EngineError>;
}

/// Grants everything. For single-operator deployments (the `syl` CLI)
/// where the process owner owns every namespace it can name.
pub struct OpenPolicy;

#[async_trait]
impl AccessPolicy for OpenPolicy {
    async fn authorize(&self, _user_id: &str, _namespace: &Namespace) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Explicit-grant policy: personal namespaces admit only their owner,
/// shared namespaces admit only accepted members. Everything else is
/// denied.
#[derive(Default)]
pub struct MembershipPolicy {
    members: HashMap<String, HashSet<String>>,
}

impl MembershipPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `user_id` as an accepted member of `space_id`.
    pub fn with_member(mut self, space_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.members
            .entry(space_id.into())
            .or_default()
            .insert(user_id.into());
        self
    }
}

#[async_trait]
impl AccessPolicy for MembershipPolicy {
    async fn authorize(&self, user_id: &str, namespace: &Namespace) -> Result<(), EngineError> {
        let allowed = match namespace {
            Namespace::Personal { user_id: owner } => owner == user_id,
            Namespace::Shared { space_id } => self
                .members
                .get(space_id)
                .is_some_and(|members| members.contains(user_id)),
        };
        if allowed {
            Ok(())
        } else {
            Err(EngineError::unauthorized(namespace))
        }
    }
}
