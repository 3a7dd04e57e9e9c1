//! Mock implementation of UserLookup for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::user::{AccountStatus, UserAccount};
use crate::errors::DomainError;

use super::trait_::UserLookup;

/// Mock user lookup backed by a map
pub struct MockUserLookup {
    users: Arc<RwLock<HashMap<String, UserAccount>>>,
}

impl MockUserLookup {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn with_user(self, user: UserAccount) -> Self {
        self.upsert(user).await;
        self
    }

    pub async fn upsert(&self, user: UserAccount) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn set_status(&self, user_id: &str, status: AccountStatus) {
        if let Some(user) = self.users.write().await.get_mut(user_id) {
            user.status = status;
        }
    }

    pub async fn remove(&self, user_id: &str) {
        self.users.write().await.remove(user_id);
    }
}

impl Default for MockUserLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserLookup for MockUserLookup {
    async fn get_by_id(&self, user_id: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}
