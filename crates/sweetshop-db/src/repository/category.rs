//! # Category Repository
//!
//! Database operations for catalog categories.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use sweetshop_core::{Category, CategoryUpdate, NewCategory};
use tracing::debug;

use super::{clean_optional, generate_id};
use crate::error::{DbError, DbResult};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, image_url, created_at
            FROM categories
            ORDER BY name COLLATE NOCASE, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, image_url, created_at
            FROM categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Like [`get_by_id`](Self::get_by_id) but missing rows are an error.
    pub async fn require(&self, id: &str) -> DbResult<Category> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - The stored category
    /// * `Err(DbError::UniqueViolation)` - A category with this name exists
    pub async fn insert(&self, category: &NewCategory) -> DbResult<Category> {
        category.validate()?;

        let id = generate_id();
        let name = category.name.trim();

        debug!(id = %id, name = %name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, image_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(clean_optional(category.description.as_deref()))
        .bind(clean_optional(category.image_url.as_deref()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("category name", name),
            other => other,
        })?;

        self.require(&id).await
    }

    /// Applies a partial update. Only the fields present are written.
    pub async fn update(&self, id: &str, update: &CategoryUpdate) -> DbResult<Category> {
        update.validate()?;

        if update.is_empty() {
            return self.require(id).await;
        }

        debug!(id = %id, "Updating category");

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE categories SET ");
        {
            let mut columns = query.separated(", ");
            if let Some(name) = &update.name {
                columns.push("name = ").push_bind_unseparated(name.trim());
            }
            if let Some(description) = &update.description {
                columns
                    .push("description = ")
                    .push_bind_unseparated(clean_optional(description.as_deref()));
            }
            if let Some(image_url) = &update.image_url {
                columns
                    .push("image_url = ")
                    .push_bind_unseparated(clean_optional(image_url.as_deref()));
            }
        }
        query.push(" WHERE id = ").push_bind(id);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { value, .. } => DbError::UniqueViolation {
                    field: "category name".to_string(),
                    value: update.name.as_deref().map(str::trim).unwrap_or(&value).to_string(),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.require(id).await
    }

    /// Deletes a category. Sweets in it keep existing with no category.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Finds a category by exact name (seeding).
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, image_url, created_at
            FROM categories
            WHERE name = ?1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use sweetshop_core::{Money, NewSweet};

    fn named(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();
        repo.insert(&named("Toffee")).await.unwrap();
        repo.insert(&named("chocolate")).await.unwrap();
        repo.insert(&named("Gummies")).await.unwrap();

        let names: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["chocolate", "Gummies", "Toffee"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();
        repo.insert(&named("Chocolate")).await.unwrap();

        let err = repo.insert(&named(" Chocolate ")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_clear_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();
        let created = repo
            .insert(&NewCategory {
                name: "Chocolate".to_string(),
                description: Some("Cocoa based".to_string()),
                image_url: Some("/img/choc.png".to_string()),
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.id,
                &CategoryUpdate {
                    name: Some("Fine Chocolate".to_string()),
                    image_url: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Fine Chocolate");
        assert_eq!(updated.description.as_deref(), Some("Cocoa based"));
        assert_eq!(updated.image_url, None);

        let unchanged = repo
            .update(&created.id, &CategoryUpdate::default())
            .await
            .unwrap();
        assert_eq!(unchanged, updated);

        assert!(matches!(
            repo.update("missing", &CategoryUpdate::default())
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_detaches_sweets() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db.categories().insert(&named("Mints")).await.unwrap();
        let sweet = db
            .sweets()
            .insert(&NewSweet {
                name: "Peppermint".to_string(),
                description: None,
                category_id: Some(category.id.clone()),
                price: Money::from_cents(90),
                quantity: 4,
                image_url: None,
            })
            .await
            .unwrap();

        db.categories().delete(&category.id).await.unwrap();

        let sweet = db.sweets().require(&sweet.id).await.unwrap();
        assert_eq!(sweet.category_id, None);
        assert!(sweet.category.is_none());

        assert!(matches!(
            db.categories().delete(&category.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
