use super::IdentityDirectory;
use crate::domain::Identity;
use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identity directory backed by a map, for local runs and tests
#[derive(Default)]
pub struct InMemoryIdentityDirectory {
    users: RwLock<HashMap<Uuid, Identity>>,
}

impl InMemoryIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an identity
    pub async fn insert(&self, identity: Identity) {
        self.users.write().await.insert(identity.id, identity);
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}
