use std::sync::Arc;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a new user
    pub async fn create_user(&self, input: NewUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: i64) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// List users, optionally restricted to the given IDs
    pub async fn list_users(
        &self,
        ids: Option<Vec<i64>>,
        from: u64,
        size: u64,
    ) -> UserResult<Vec<User>> {
        self.repository.list(ids, from, size).await
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }

    /// Subscribe `follower_id` to `followed_id`.
    ///
    /// Both users must exist and a user cannot follow themselves.
    pub async fn subscribe(&self, follower_id: i64, followed_id: i64) -> UserResult<()> {
        if follower_id == followed_id {
            return Err(UserError::SelfSubscription(follower_id));
        }

        self.get_user(follower_id).await?;
        self.get_user(followed_id).await?;

        self.repository.subscribe(follower_id, followed_id).await
    }

    /// Remove a subscription
    pub async fn unsubscribe(&self, follower_id: i64, followed_id: i64) -> UserResult<()> {
        let removed = self.repository.unsubscribe(follower_id, followed_id).await?;

        if !removed {
            return Err(UserError::NotSubscribed {
                follower: follower_id,
                followed: followed_id,
            });
        }

        Ok(())
    }

    /// IDs of all users the given user follows
    pub async fn followed_ids(&self, follower_id: i64) -> UserResult<Vec<i64>> {
        self.get_user(follower_id).await?;
        self.repository.followed_ids(follower_id).await
    }
}
