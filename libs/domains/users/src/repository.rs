use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

#[cfg(test)]
use mockall::automock;

/// Repository trait for User persistence and the subscription graph
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a new user
    async fn create(&self, input: NewUser) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// List users ordered by ID, optionally restricted to the given IDs
    async fn list(&self, ids: Option<Vec<i64>>, from: u64, size: u64) -> UserResult<Vec<User>>;

    /// Delete a user by ID, returns false when absent
    async fn delete(&self, id: i64) -> UserResult<bool>;

    /// Add a follower-followed edge
    async fn subscribe(&self, follower_id: i64, followed_id: i64) -> UserResult<()>;

    /// Remove a follower-followed edge, returns false when absent
    async fn unsubscribe(&self, follower_id: i64, followed_id: i64) -> UserResult<bool>;

    /// IDs of all users the given user follows, ascending
    async fn followed_ids(&self, follower_id: i64) -> UserResult<Vec<i64>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i64, User>>>,
    subscriptions: Arc<RwLock<HashSet<(i64, i64)>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashSet::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == input.email) {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id,
            name: input.name,
            email: input.email,
        };
        users.insert(id, user.clone());

        tracing::info!(user_id = id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn list(&self, ids: Option<Vec<i64>>, from: u64, size: u64) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = match ids {
            Some(ids) => {
                let wanted: HashSet<i64> = ids.into_iter().collect();
                users
                    .values()
                    .filter(|u| wanted.contains(&u.id))
                    .cloned()
                    .collect()
            }
            None => users.values().cloned().collect(),
        };
        result.sort_by_key(|u| u.id);

        Ok(result
            .into_iter()
            .skip(from as usize)
            .take(size as usize)
            .collect())
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            let mut subscriptions = self.subscriptions.write().await;
            subscriptions.retain(|(follower, followed)| *follower != id && *followed != id);

            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn subscribe(&self, follower_id: i64, followed_id: i64) -> UserResult<()> {
        let mut subscriptions = self.subscriptions.write().await;

        if !subscriptions.insert((follower_id, followed_id)) {
            return Err(UserError::AlreadySubscribed {
                follower: follower_id,
                followed: followed_id,
            });
        }

        tracing::info!(follower_id, followed_id, "Created subscription");
        Ok(())
    }

    async fn unsubscribe(&self, follower_id: i64, followed_id: i64) -> UserResult<bool> {
        let mut subscriptions = self.subscriptions.write().await;
        Ok(subscriptions.remove(&(follower_id, followed_id)))
    }

    async fn followed_ids(&self, follower_id: i64) -> UserResult<Vec<i64>> {
        let subscriptions = self.subscriptions.read().await;

        let mut ids: Vec<i64> = subscriptions
            .iter()
            .filter(|(follower, _)| *follower == follower_id)
            .map(|(_, followed)| *followed)
            .collect();
        ids.sort_unstable();

        Ok(ids)
    }
}
