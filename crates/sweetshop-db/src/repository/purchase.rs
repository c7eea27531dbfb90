//! # Purchase Repository
//!
//! The one write path with a cross-row invariant: stock must never go
//! negative, and every successful purchase must leave exactly one purchase
//! row whose total matches the price at the moment of the decrement.
//!
//! ## Transaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(user_id, sweet_id, quantity)                                   │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  UPDATE sweets SET quantity = quantity - :n                            │
//! │   WHERE id = :id AND quantity >= :n                                    │
//! │   RETURNING price_cents, quantity          (takes the write lock)      │
//! │    │                                                                    │
//! │    ├── 0 rows ─► SELECT sweet ─► NotFound | InsufficientStock          │
//! │    │             ROLLBACK (nothing changed)                            │
//! │    ▼                                                                    │
//! │  PurchaseQuote (unit price × n)                                        │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  INSERT INTO purchases (..., total_price_cents)                         │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  COMMIT   (any error before this point rolls back the decrement)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent purchases of the last units serialize on the SQLite write
//! lock; the second one's conditional UPDATE then matches zero rows.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sweetshop_core::validation::validate_purchase_quantity;
use sweetshop_core::{CoreError, Money, Purchase, PurchaseQuote, Sweet};
use tracing::{debug, info};

use super::generate_id;
use super::sweet::CategoryColumns;
use crate::error::{DbError, DbResult};

// =============================================================================
// Row Mapping
// =============================================================================

const PURCHASE_SELECT: &str = r#"
    SELECT
        p.id,
        p.user_id,
        p.sweet_id,
        p.quantity,
        p.total_price_cents,
        p.created_at,
        s.id AS s_id,
        s.name AS s_name,
        s.description AS s_description,
        s.category_id AS s_category_id,
        s.price_cents AS s_price_cents,
        s.quantity AS s_quantity,
        s.image_url AS s_image_url,
        s.created_at AS s_created_at,
        s.updated_at AS s_updated_at,
        c.id AS cat_id,
        c.name AS cat_name,
        c.description AS cat_description,
        c.image_url AS cat_image_url,
        c.created_at AS cat_created_at
    FROM purchases p
    LEFT JOIN sweets s ON s.id = p.sweet_id
    LEFT JOIN categories c ON c.id = s.category_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    user_id: String,
    sweet_id: String,
    quantity: i64,
    total_price_cents: i64,
    created_at: DateTime<Utc>,
    s_id: Option<String>,
    s_name: Option<String>,
    s_description: Option<String>,
    s_category_id: Option<String>,
    s_price_cents: Option<i64>,
    s_quantity: Option<i64>,
    s_image_url: Option<String>,
    s_created_at: Option<DateTime<Utc>>,
    s_updated_at: Option<DateTime<Utc>>,
    #[sqlx(flatten)]
    category: CategoryColumns,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        let sweet = match (
            row.s_id,
            row.s_name,
            row.s_price_cents,
            row.s_quantity,
            row.s_created_at,
            row.s_updated_at,
        ) {
            (Some(id), Some(name), Some(price_cents), Some(quantity), Some(created), Some(updated)) => {
                Some(Sweet {
                    id,
                    name,
                    description: row.s_description,
                    category_id: row.s_category_id,
                    price: Money::from_cents(price_cents),
                    quantity,
                    image_url: row.s_image_url,
                    created_at: created,
                    updated_at: updated,
                    category: row.category.into_category(),
                })
            }
            _ => None,
        };

        Purchase {
            id: row.id,
            user_id: row.user_id,
            sweet_id: row.sweet_id,
            quantity: row.quantity,
            total_price: Money::from_cents(row.total_price_cents),
            created_at: row.created_at,
            sweet,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for purchases.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Buys `quantity` units of a sweet for a customer, atomically.
    ///
    /// ## Returns
    /// * `Ok(Purchase)` - Committed purchase with the post-purchase sweet embedded
    /// * `Err(DbError::NotFound)` - Sweet doesn't exist
    /// * `Err(DbError::Domain(InsufficientStock))` - Not enough stock; nothing changed
    /// * `Err(DbError::UnknownAccount)` - `user_id` has no users row; nothing changed
    /// * `Err(DbError::Domain(Validation))` - Quantity outside 1..=999
    pub async fn create(&self, user_id: &str, sweet_id: &str, quantity: i64) -> DbResult<Purchase> {
        validate_purchase_quantity(quantity)?;

        debug!(user_id = %user_id, sweet_id = %sweet_id, quantity, "Processing purchase");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let decremented: Option<(i64, i64)> = sqlx::query_as(
            r#"
            UPDATE sweets
            SET
                quantity = quantity - ?2,
                updated_at = ?3
            WHERE id = ?1 AND quantity >= ?2
            RETURNING price_cents, quantity
            "#,
        )
        .bind(sweet_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((price_cents, remaining)) = decremented else {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT quantity FROM sweets WHERE id = ?1")
                    .bind(sweet_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            debug!(sweet_id = %sweet_id, ?available, requested = quantity, "Purchase rejected");

            return Err(match available {
                None => DbError::not_found("Sweet", sweet_id),
                Some(available) => CoreError::InsufficientStock {
                    sweet_id: sweet_id.to_string(),
                    available,
                    requested: quantity,
                }
                .into(),
            });
        };

        let quote = PurchaseQuote::new(
            sweet_id,
            Money::from_cents(price_cents),
            quantity,
            remaining + quantity,
        )?;

        let purchase_id = generate_id();

        sqlx::query(
            r#"
            INSERT INTO purchases (id, user_id, sweet_id, quantity, total_price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&purchase_id)
        .bind(user_id)
        .bind(sweet_id)
        .bind(quantity)
        .bind(quote.total.cents())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|err| match DbError::from(err) {
            // sweet_id has no FK, so the only reference that can dangle is the buyer
            DbError::ForeignKeyViolation { .. } => DbError::UnknownAccount {
                id: user_id.to_string(),
            },
            other => other,
        })?;

        tx.commit().await?;

        info!(
            purchase_id = %purchase_id,
            sweet_id = %sweet_id,
            quantity,
            total = %quote.total,
            remaining_stock = quote.remaining_stock,
            "Purchase recorded"
        );

        self.get_by_id(&purchase_id)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", &purchase_id))
    }

    /// Gets a purchase by ID, with its sweet embedded.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let sql = format!("{PURCHASE_SELECT} WHERE p.id = ?1");
        let row: Option<PurchaseRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Purchase::from))
    }

    /// Lists a customer's purchases, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Purchase>> {
        let sql = format!("{PURCHASE_SELECT} WHERE p.user_id = ?1 ORDER BY p.created_at DESC, p.rowid DESC");
        let rows: Vec<PurchaseRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(user_id = %user_id, count = rows.len(), "Listed purchases");
        Ok(rows.into_iter().map(Purchase::from).collect())
    }

    /// Counts purchase rows for a sweet (diagnostics and tests).
    pub async fn count_for_sweet(&self, sweet_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE sweet_id = ?1")
            .bind(sweet_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use sweetshop_core::{AccountKind, NewSweet};

    async fn setup(price_cents: i64, quantity: i64) -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed(db, price_cents, quantity).await
    }

    async fn seed(db: Database, price_cents: i64, quantity: i64) -> (Database, String, String) {
        let user = db
            .accounts(AccountKind::User)
            .create("kid@candy.shop", "Kid", "hash")
            .await
            .unwrap();
        let sweet = db
            .sweets()
            .insert(&NewSweet {
                name: "Fudge".to_string(),
                description: None,
                category_id: None,
                price: Money::from_cents(price_cents),
                quantity,
                image_url: None,
            })
            .await
            .unwrap();
        (db, user.id, sweet.id)
    }

    #[tokio::test]
    async fn test_purchase_decrements_stock_and_freezes_total() {
        let (db, user_id, sweet_id) = setup(200, 5).await;

        let purchase = db.purchases().create(&user_id, &sweet_id, 3).await.unwrap();
        assert_eq!(purchase.quantity, 3);
        assert_eq!(purchase.total_price.cents(), 600);
        assert_eq!(purchase.user_id, user_id);
        assert_eq!(purchase.sweet.as_ref().unwrap().quantity, 2);

        assert_eq!(db.sweets().require(&sweet_id).await.unwrap().quantity, 2);

        // A later price change does not touch the recorded total
        db.sweets()
            .update(
                &sweet_id,
                &sweetshop_core::SweetUpdate {
                    price: Some(Money::from_cents(999)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let stored = db.purchases().get_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(stored.total_price.cents(), 600);
    }

    #[tokio::test]
    async fn test_purchase_by_missing_user_changes_nothing() {
        let (db, _user_id, sweet_id) = setup(200, 5).await;

        let err = db.purchases().create("ghost-user", &sweet_id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::UnknownAccount { ref id } if id == "ghost-user"));

        assert_eq!(db.sweets().require(&sweet_id).await.unwrap().quantity, 5);
        assert_eq!(db.purchases().count_for_sweet(&sweet_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let (db, user_id, sweet_id) = setup(200, 2).await;

        let err = db.purchases().create(&user_id, &sweet_id, 3).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(db.sweets().require(&sweet_id).await.unwrap().quantity, 2);
        assert_eq!(db.purchases().count_for_sweet(&sweet_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sold_out_then_restocked() {
        let (db, user_id, sweet_id) = setup(350, 0).await;

        assert!(matches!(
            db.purchases().create(&user_id, &sweet_id, 1).await.unwrap_err(),
            DbError::Domain(CoreError::InsufficientStock { available: 0, .. })
        ));

        db.sweets().restock(&sweet_id, 10).await.unwrap();

        let purchase = db.purchases().create(&user_id, &sweet_id, 10).await.unwrap();
        assert_eq!(purchase.total_price.cents(), 3500);
        assert_eq!(db.sweets().require(&sweet_id).await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_unknown_sweet_and_bad_quantity() {
        let (db, user_id, sweet_id) = setup(100, 5).await;

        assert!(matches!(
            db.purchases().create(&user_id, "missing", 1).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        for quantity in [0, -1, 1000] {
            assert!(matches!(
                db.purchases().create(&user_id, &sweet_id, quantity).await.unwrap_err(),
                DbError::Domain(CoreError::Validation(_))
            ));
        }
        assert_eq!(db.sweets().require(&sweet_id).await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_survives_deletion() {
        let (db, user_id, sweet_id) = setup(100, 10).await;
        let purchases = db.purchases();

        let first = purchases.create(&user_id, &sweet_id, 1).await.unwrap();
        let second = purchases.create(&user_id, &sweet_id, 2).await.unwrap();

        let history = purchases.list_for_user(&user_id).await.unwrap();
        let ids: Vec<_> = history.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert_eq!(history[0].sweet.as_ref().unwrap().name, "Fudge");

        assert!(purchases.list_for_user("someone-else").await.unwrap().is_empty());

        db.sweets().delete(&sweet_id).await.unwrap();

        let history = purchases.list_for_user(&user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|p| p.sweet.is_none()));
        assert_eq!(history[0].sweet_id, sweet_id);
        assert_eq!(history[1].total_price.cents(), 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_purchases_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("race.db")).max_connections(4))
            .await
            .unwrap();
        let (db, user_id, sweet_id) = seed(db, 150, 5).await;

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let repo = db.purchases();
                let user_id = user_id.clone();
                let sweet_id = sweet_id.clone();
                tokio::spawn(async move { repo.create(&user_id, &sweet_id, 5).await })
            })
            .collect();

        let mut succeeded = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(db.sweets().require(&sweet_id).await.unwrap().quantity, 0);
        assert_eq!(db.purchases().count_for_sweet(&sweet_id).await.unwrap(), 1);
    }
}
