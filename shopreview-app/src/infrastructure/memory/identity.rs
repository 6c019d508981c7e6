use crate::application::IdentityProvider;
use async_trait::async_trait;
use dashmap::DashMap;
use shopreview_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Moderator directory held in memory, keyed by user id with the contact email.
#[derive(Clone)]
pub struct InMemoryIdentity {
    moderators: Arc<DashMap<Uuid, Option<String>>>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self {
            moderators: Arc::new(DashMap::new()),
        }
    }

    pub fn with_moderators<I: IntoIterator<Item = Uuid>>(moderators: I) -> Self {
        let identity = Self::new();
        for user_id in moderators {
            identity.grant_moderator(user_id);
        }
        identity
    }

    pub fn grant_moderator(&self, user_id: Uuid) {
        self.moderators.entry(user_id).or_insert(None);
    }

    pub fn revoke_moderator(&self, user_id: Uuid) {
        self.moderators.remove(&user_id);
    }

    pub fn moderator_email(&self, user_id: Uuid) -> Option<String> {
        self.moderators.get(&user_id).and_then(|e| e.clone())
    }
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn is_moderator(&self, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self.moderators.contains_key(&user_id))
    }

    async fn add_moderator(&self, user_id: Uuid, email: Option<String>) -> Result<(), AppError> {
        self.moderators.insert(user_id, email);
        Ok(())
    }
}
