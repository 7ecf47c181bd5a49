//! Identity directory boundary
//!
//! Identities are owned by the identity service; this crate only resolves
//! references and derives display data from them.

use crate::domain::{Identity, UserSummary};
use anyhow::Result;
use std::collections::HashMap;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryIdentityDirectory;
pub use postgres::PgIdentityDirectory;

/// Username shown when an author cannot be resolved
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// Gravatar URL for an email address
pub fn gravatar_url(email: &str) -> String {
    let digest = md5::compute(email.trim().to_lowercase());
    format!("https://gravatar.com/avatar/{:x}?s=128", digest)
}

#[async_trait::async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>>;

    /// Batch lookup; ids that do not resolve are absent from the map
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Identity>> {
        let mut found = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(identity) = self.find_by_id(*id).await? {
                found.insert(*id, identity);
            }
        }
        Ok(found)
    }

    fn derive_avatar(&self, email: &str) -> String {
        gravatar_url(email)
    }

    /// Display data for a possibly-unresolved identity
    fn summarize(&self, identity: Option<&Identity>) -> UserSummary {
        match identity {
            Some(identity) => UserSummary {
                username: identity.username.clone(),
                avatar: self.derive_avatar(&identity.email),
            },
            None => UserSummary {
                username: UNKNOWN_USERNAME.to_string(),
                avatar: self.derive_avatar(""),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_normalizes_email() {
        assert_eq!(
            gravatar_url(" Alice@Example.com "),
            gravatar_url("alice@example.com")
        );
        assert_eq!(
            gravatar_url(""),
            "https://gravatar.com/avatar/d41d8cd98f00b204e9800998ecf8427e?s=128"
        );
    }

    #[test]
    fn test_summarize_unknown_identity() {
        let directory = InMemoryIdentityDirectory::new();
        let summary = directory.summarize(None);
        assert_eq!(summary.username, UNKNOWN_USERNAME);
        assert_eq!(summary.avatar, gravatar_url(""));
    }
}
