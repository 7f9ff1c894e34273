use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, NewCategory, UpdateCategory};

#[cfg(test)]
use mockall::automock;

/// Repository trait for Category persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, input: NewCategory) -> CategoryResult<Category>;

    /// Get a category by ID
    async fn get_by_id(&self, id: i64) -> CategoryResult<Option<Category>>;

    /// List categories ordered by ID, windowed by from/size
    async fn list(&self, from: u64, size: u64) -> CategoryResult<Vec<Category>>;

    /// Rename an existing category
    async fn update(&self, id: i64, input: UpdateCategory) -> CategoryResult<Category>;

    /// Delete a category by ID, returns false when absent
    async fn delete(&self, id: i64) -> CategoryResult<bool>;
}

/// In-memory implementation of CategoryRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<i64, Category>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            categories: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, input: NewCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;

        if categories.values().any(|c| c.name == input.name) {
            return Err(CategoryError::DuplicateName(input.name));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let category = Category {
            id,
            name: input.name,
        };
        categories.insert(id, category.clone());

        tracing::info!(category_id = id, "Created category");
        Ok(category)
    }

    async fn get_by_id(&self, id: i64) -> CategoryResult<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id).cloned())
    }

    async fn list(&self, from: u64, size: u64) -> CategoryResult<Vec<Category>> {
        let categories = self.categories.read().await;

        let mut result: Vec<Category> = categories.values().cloned().collect();
        result.sort_by_key(|c| c.id);

        Ok(result
            .into_iter()
            .skip(from as usize)
            .take(size as usize)
            .collect())
    }

    async fn update(&self, id: i64, input: UpdateCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;

        if !categories.contains_key(&id) {
            return Err(CategoryError::NotFound(id));
        }

        if categories
            .values()
            .any(|c| c.id != id && c.name == input.name)
        {
            return Err(CategoryError::DuplicateName(input.name));
        }

        let category = categories
            .get_mut(&id)
            .ok_or(CategoryError::NotFound(id))?;
        category.name = input.name;
        let updated = category.clone();

        tracing::info!(category_id = id, "Updated category");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> CategoryResult<bool> {
        let mut categories = self.categories.write().await;

        if categories.remove(&id).is_some() {
            tracing::info!(category_id = id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_category() {
        let repo = InMemoryCategoryRepository::new();

        let category = repo
            .create(NewCategory {
                name: "concerts".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(category.name, "concerts");

        let fetched = repo.get_by_id(category.id).await.unwrap();
        assert_eq!(fetched.unwrap().name, "concerts");
    }

    #[tokio::test]
    async fn test_duplicate_name_error() {
        let repo = InMemoryCategoryRepository::new();

        repo.create(NewCategory {
            name: "theatre".to_string(),
        })
        .await
        .unwrap();

        let result = repo
            .create(NewCategory {
                name: "theatre".to_string(),
            })
            .await;
        assert!(matches!(result, Err(CategoryError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_rename_to_taken_name_rejected() {
        let repo = InMemoryCategoryRepository::new();

        let first = repo
            .create(NewCategory {
                name: "concerts".to_string(),
            })
            .await
            .unwrap();
        repo.create(NewCategory {
            name: "theatre".to_string(),
        })
        .await
        .unwrap();

        let result = repo
            .update(
                first.id,
                UpdateCategory {
                    name: "theatre".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(CategoryError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_rename_to_own_name_allowed() {
        let repo = InMemoryCategoryRepository::new();

        let category = repo
            .create(NewCategory {
                name: "concerts".to_string(),
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                category.id,
                UpdateCategory {
                    name: "concerts".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "concerts");
    }

    #[tokio::test]
    async fn test_list_window() {
        let repo = InMemoryCategoryRepository::new();

        for name in ["a", "b", "c", "d"] {
            repo.create(NewCategory {
                name: name.to_string(),
            })
            .await
            .unwrap();
        }

        let page = repo.list(1, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "b");
        assert_eq!(page[1].name, "c");
    }
}
