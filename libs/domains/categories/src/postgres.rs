use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, SqlErr,
};

use crate::{
    entity,
    error::{CategoryError, CategoryResult},
    models::{Category, NewCategory, UpdateCategory},
    repository::CategoryRepository,
};

/// Postgres-backed implementation of CategoryRepository
#[derive(Clone)]
pub struct PgCategoryRepository {
    db: DatabaseConnection,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, input: NewCategory) -> CategoryResult<Category> {
        let name = input.name.clone();
        let active_model = entity::ActiveModel {
            name: Set(input.name),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                CategoryError::DuplicateName(name)
            } else {
                CategoryError::Database(e)
            }
        })?;

        tracing::info!(category_id = model.id, "Created category");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> CategoryResult<Option<Category>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, from: u64, size: u64) -> CategoryResult<Vec<Category>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .offset(from)
            .limit(size)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, input: UpdateCategory) -> CategoryResult<Category> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CategoryError::NotFound(id))?;

        let name = input.name.clone();
        let mut active_model: entity::ActiveModel = model.into();
        active_model.name = Set(input.name);

        let updated = active_model.update(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                CategoryError::DuplicateName(name)
            } else {
                CategoryError::Database(e)
            }
        })?;

        tracing::info!(category_id = id, "Updated category");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> CategoryResult<bool> {
        // Events reference categories through a foreign key; a violation here
        // means the category is still in use.
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) {
                    CategoryError::NotEmpty(id)
                } else {
                    CategoryError::Database(e)
                }
            })?;

        if result.rows_affected > 0 {
            tracing::info!(category_id = id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
