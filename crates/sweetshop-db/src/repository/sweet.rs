//! # Sweet Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Listing and filtered search, newest first, with the category embedded
//! - CRUD for the admin console (partial updates)
//! - Restock as a single delta statement
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, add in Rust, write back absolute value             │
//! │     SELECT quantity ...; UPDATE sweets SET quantity = 15            │
//! │     (a purchase between the two statements is lost)                 │
//! │                                                                     │
//! │  ✅ CORRECT: delta update                                           │
//! │     UPDATE sweets SET quantity = quantity + 10 WHERE id = ?         │
//! │                                                                     │
//! │  Restock (+10) and purchase (-3) commute: final stock is the same  │
//! │  whichever commits first.                                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use sweetshop_core::validation::validate_restock_quantity;
use sweetshop_core::{Category, Money, NewSweet, Sweet, SweetFilter, SweetUpdate};
use tracing::debug;

use super::{clean_optional, generate_id};
use crate::error::{DbError, DbResult};

// =============================================================================
// Row Mapping
// =============================================================================

/// Sweet columns joined with their (optional) category.
pub(crate) const SWEET_SELECT: &str = r#"
    SELECT
        s.id,
        s.name,
        s.description,
        s.category_id,
        s.price_cents,
        s.quantity,
        s.image_url,
        s.created_at,
        s.updated_at,
        c.id AS cat_id,
        c.name AS cat_name,
        c.description AS cat_description,
        c.image_url AS cat_image_url,
        c.created_at AS cat_created_at
    FROM sweets s
    LEFT JOIN categories c ON c.id = s.category_id
"#;

/// Newest first; rowid breaks ties between rows created in the same instant.
pub(crate) const SWEET_ORDER: &str = " ORDER BY s.created_at DESC, s.rowid DESC";

/// The `cat_*` columns of a LEFT JOIN on categories.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CategoryColumns {
    cat_id: Option<String>,
    cat_name: Option<String>,
    cat_description: Option<String>,
    cat_image_url: Option<String>,
    cat_created_at: Option<DateTime<Utc>>,
}

impl CategoryColumns {
    pub(crate) fn into_category(self) -> Option<Category> {
        match (self.cat_id, self.cat_name, self.cat_created_at) {
            (Some(id), Some(name), Some(created_at)) => Some(Category {
                id,
                name,
                description: self.cat_description,
                image_url: self.cat_image_url,
                created_at,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SweetRow {
    id: String,
    name: String,
    description: Option<String>,
    category_id: Option<String>,
    price_cents: i64,
    quantity: i64,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    category: CategoryColumns,
}

impl From<SweetRow> for Sweet {
    fn from(row: SweetRow) -> Self {
        Sweet {
            id: row.id,
            name: row.name,
            description: row.description,
            category_id: row.category_id,
            price: Money::from_cents(row.price_cents),
            quantity: row.quantity,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category: row.category.into_category(),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sweet database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.sweets();
///
/// let chocolate = repo.search(&SweetFilter { name: Some("choc".into()), ..Default::default() }).await?;
/// let fudge = repo.restock(&fudge_id, 10).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SweetRepository {
    pool: SqlitePool,
}

impl SweetRepository {
    /// Creates a new SweetRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SweetRepository { pool }
    }

    /// Lists the whole catalog, optionally restricted to one category.
    pub async fn list(&self, category_id: Option<&str>) -> DbResult<Vec<Sweet>> {
        let filter = SweetFilter {
            category_id: category_id.map(str::to_string),
            ..Default::default()
        };
        self.search(&filter).await
    }

    /// Searches the catalog.
    ///
    /// ## Filters (all optional, combined with AND)
    /// - `name`: case-insensitive substring, matched in Rust after the
    ///   query because SQLite `lower()` only folds ASCII
    /// - `category_id`: exact match
    /// - `min_price` / `max_price`: inclusive bounds in cents
    ///
    /// ## Example
    /// ```rust,ignore
    /// let filter = SweetFilter {
    ///     name: Some("bear".into()),
    ///     max_price: Some(Money::from_cents(300)),
    ///     ..Default::default()
    /// };
    /// let gummies = repo.search(&filter).await?;
    /// ```
    pub async fn search(&self, filter: &SweetFilter) -> DbResult<Vec<Sweet>> {
        filter.validate()?;

        debug!(?filter, "Searching sweets");

        let mut query = QueryBuilder::<Sqlite>::new(SWEET_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(category_id) = clean_optional(filter.category_id.as_deref()) {
            query.push(" AND s.category_id = ").push_bind(category_id);
        }
        if let Some(min) = filter.min_price {
            query.push(" AND s.price_cents >= ").push_bind(min.cents());
        }
        if let Some(max) = filter.max_price {
            query.push(" AND s.price_cents <= ").push_bind(max.cents());
        }
        query.push(SWEET_ORDER);

        let rows: Vec<SweetRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let sweets: Vec<Sweet> = rows
            .into_iter()
            .filter(|row| filter.matches_name(&row.name))
            .map(Sweet::from)
            .collect();

        debug!(count = sweets.len(), "Search returned sweets");
        Ok(sweets)
    }

    /// Gets a sweet by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Sweet))` - Sweet found
    /// * `Ok(None)` - Sweet not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sweet>> {
        let sql = format!("{SWEET_SELECT} WHERE s.id = ?1");
        let row: Option<SweetRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Sweet::from))
    }

    /// Like [`get_by_id`](Self::get_by_id) but missing rows are an error.
    pub async fn require(&self, id: &str) -> DbResult<Sweet> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sweet", id))
    }

    /// Inserts a new sweet.
    ///
    /// ## Returns
    /// * `Ok(Sweet)` - The stored sweet (with its category embedded)
    /// * `Err(DbError::ForeignKeyViolation)` - `category_id` does not exist
    pub async fn insert(&self, sweet: &NewSweet) -> DbResult<Sweet> {
        sweet.validate()?;

        let id = generate_id();
        let now = Utc::now();

        debug!(id = %id, name = %sweet.name, "Inserting sweet");

        sqlx::query(
            r#"
            INSERT INTO sweets (
                id, name, description, category_id,
                price_cents, quantity, image_url,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(sweet.name.trim())
        .bind(clean_optional(sweet.description.as_deref()))
        .bind(clean_optional(sweet.category_id.as_deref()))
        .bind(sweet.price.cents())
        .bind(sweet.quantity)
        .bind(clean_optional(sweet.image_url.as_deref()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.require(&id).await
    }

    /// Applies a partial update.
    ///
    /// Only the fields present in `update` are written; `updated_at` is always
    /// refreshed.
    ///
    /// ## Returns
    /// * `Ok(Sweet)` - The sweet after the update
    /// * `Err(DbError::NotFound)` - Sweet doesn't exist
    pub async fn update(&self, id: &str, update: &SweetUpdate) -> DbResult<Sweet> {
        update.validate()?;

        debug!(id = %id, "Updating sweet");

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE sweets SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(name) = &update.name {
            query.push(", name = ").push_bind(name.trim());
        }
        if let Some(description) = &update.description {
            query
                .push(", description = ")
                .push_bind(clean_optional(description.as_deref()));
        }
        if let Some(category_id) = &update.category_id {
            query
                .push(", category_id = ")
                .push_bind(clean_optional(category_id.as_deref()));
        }
        if let Some(price) = update.price {
            query.push(", price_cents = ").push_bind(price.cents());
        }
        if let Some(quantity) = update.quantity {
            query.push(", quantity = ").push_bind(quantity);
        }
        if let Some(image_url) = &update.image_url {
            query
                .push(", image_url = ")
                .push_bind(clean_optional(image_url.as_deref()));
        }

        query.push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sweet", id));
        }

        self.require(id).await
    }

    /// Adds stock to a sweet.
    ///
    /// ## Arguments
    /// * `id` - Sweet ID
    /// * `quantity` - Positive increment
    ///
    /// ## Returns
    /// The sweet with its new stock level.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<Sweet> {
        validate_restock_quantity(quantity)?;

        debug!(id = %id, quantity, "Restocking sweet");

        let result = sqlx::query(
            r#"
            UPDATE sweets
            SET
                quantity = quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sweet", id));
        }

        self.require(id).await
    }

    /// Permanently deletes a sweet.
    ///
    /// Purchases keep their `sweet_id`; their embedded sweet becomes `null`.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sweet");

        let result = sqlx::query("DELETE FROM sweets WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sweet", id));
        }

        Ok(())
    }

    /// Counts sweets in the catalog (seeding, diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sweets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
