use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};

use crate::{
    entity::{subscriptions, users},
    error::{UserError, UserResult},
    models::{NewUser, User},
    repository::UserRepository,
};

/// Postgres-backed implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let email = input.email.clone();
        let active_model = users::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                UserError::DuplicateEmail(email)
            } else {
                UserError::Database(e)
            }
        })?;

        tracing::info!(user_id = model.id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let model = users::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, ids: Option<Vec<i64>>, from: u64, size: u64) -> UserResult<Vec<User>> {
        let mut query = users::Entity::find();

        if let Some(ids) = ids {
            query = query.filter(users::Column::Id.is_in(ids));
        }

        let models = query
            .order_by_asc(users::Column::Id)
            .offset(from)
            .limit(size)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn subscribe(&self, follower_id: i64, followed_id: i64) -> UserResult<()> {
        let active_model = subscriptions::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
            created_on: Set(Utc::now()),
            ..Default::default()
        };

        active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                UserError::AlreadySubscribed {
                    follower: follower_id,
                    followed: followed_id,
                }
            } else {
                UserError::Database(e)
            }
        })?;

        tracing::info!(follower_id, followed_id, "Created subscription");
        Ok(())
    }

    async fn unsubscribe(&self, follower_id: i64, followed_id: i64) -> UserResult<bool> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::FollowerId.eq(follower_id))
            .filter(subscriptions::Column::FollowedId.eq(followed_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn followed_ids(&self, follower_id: i64) -> UserResult<Vec<i64>> {
        let ids: Vec<i64> = subscriptions::Entity::find()
            .select_only()
            .column(subscriptions::Column::FollowedId)
            .filter(subscriptions::Column::FollowerId.eq(follower_id))
            .order_by_asc(subscriptions::Column::FollowedId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids)
    }
}
