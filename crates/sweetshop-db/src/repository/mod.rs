//! # Repository Module
//!
//! Database repository implementations for the Sweet Shop.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.sweets().search(&filter)                                   │
//! │       ▼                                                                 │
//! │  SweetRepository                                                       │
//! │  ├── list / search / get_by_id                                         │
//! │  ├── insert / update / delete                                          │
//! │  └── restock                                                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  All SQL lives in this module tree; handlers never see a query.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SweetRepository`](sweet::SweetRepository) - Catalog CRUD, search, restock
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Atomic purchase, history
//! - [`AccountRepository`](account::AccountRepository) - Customer/admin accounts

pub mod account;
pub mod category;
pub mod purchase;
pub mod sweet;

use uuid::Uuid;

/// Generates a new primary key (UUID v4, hyphenated).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Trims optional free text and turns blank strings into `None`.
pub(crate) fn clean_optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
