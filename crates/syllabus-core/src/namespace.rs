//! Tenant namespaces: the isolation boundary for every ingestion and
//! retrieval operation.
//!
//! A namespace is either personal (one user's private corpus) or shared (a
//! collaborative space whose content is owned by the space, not by the
//! contributing member). The two cases are a closed sum type so call sites
//! handle both exhaustively; the flat `user_<id>` / `space_<id>` key form
//! exists only at the index and storage boundary.

use serde::{Deserialize, Serialize};

/// The isolation key scoping a tenant's content within shared
/// infrastructure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// Strictly private to one user.
    Personal { user_id: String },
    /// Shared among all accepted members of a collaborative space.
    Shared { space_id: String },
}

impl Namespace {
    pub fn personal(user_id: impl Into<String>) -> Self {
        Namespace::Personal {
            user_id: user_id.into(),
        }
    }

    pub fn shared(space_id: impl Into<String>) -> Self {
        Namespace::Shared {
            space_id: space_id.into(),
        }
    }

    /// Resolve the namespace for an operation.
    ///
    /// A present space identifier wins: content inside a space belongs to
    /// the space as a whole, regardless of which member contributed it.
    /// Without one, the namespace is the user's private corpus.
    ///
    /// Pure and total — never queries external state, never fails, and is
    /// stable for a fixed input for the lifetime of the space.
    pub fn resolve(user_id: &str, space_id: Option<&str>) -> Self {
        match space_id {
            Some(space) => Namespace::shared(space),
            None => Namespace::personal(user_id),
        }
    }

    /// The flat key this namespace serializes to at the index boundary.
    pub fn as_key(&self) -> String {
        match self {
            Namespace::Personal { user_id } => format!("user_{user_id}"),
            Namespace::Shared { space_id } => format!("space_{space_id}"),
        }
    }

    /// Parse a flat namespace key, e.g. when reading back index filter
    /// tags. Returns `None` for keys with neither known prefix or an empty
    /// id suffix.
    pub fn parse_key(key: &str) -> Option<Self> {
        if let Some(id) = key.strip_prefix("user_") {
            if !id.is_empty() {
                return Some(Namespace::personal(id));
            }
        }
        if let Some(id) = key.strip_prefix("space_") {
            if !id.is_empty() {
                return Some(Namespace::shared(id));
            }
        }
        None
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_wins_over_user() {
        let ns = Namespace::resolve("42", Some("team-9"));
        assert_eq!(ns, Namespace::shared("team-9"));
        assert_eq!(ns.as_key(), "space_team-9");
    }

    #[test]
    fn no_space_means_personal() {
        let ns = Namespace::resolve("42", None);
        assert_eq!(ns, Namespace::personal("42"));
        assert_eq!(ns.as_key(), "user_42");
    }

    #[test]
    fn resolution_is_stable() {
        let a = Namespace::resolve("7", Some("s"));
        let b = Namespace::resolve("7", Some("s"));
        assert_eq!(a, b);
        assert_eq!(a.as_key(), b.as_key());
    }

    #[test]
    fn key_round_trip() {
        for ns in [Namespace::personal("42"), Namespace::shared("team-9")] {
            assert_eq!(Namespace::parse_key(&ns.as_key()), Some(ns));
        }
    }

    #[test]
    fn distinct_tenants_never_collide() {
        // A user and a space with the same raw id map to different keys.
        assert_ne!(
            Namespace::personal("9").as_key(),
            Namespace::shared("9").as_key()
        );
    }

    #[test]
    fn parse_rejects_foreign_keys() {
        assert_eq!(Namespace::parse_key("tenant_1"), None);
        assert_eq!(Namespace::parse_key("user_"), None);
        assert_eq!(Namespace::parse_key(""), None);
    }
}
