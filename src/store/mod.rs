//! Persistence boundary: one repository trait per entity, with PostgreSQL and in-memory stores.

mod error;
mod memory;
mod postgres;

pub use error::{ConstraintKind, ConstraintViolation, StoreError};
pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::model::{NewOrder, NewProduct, NewUser, Order, Product, User, UserChanges};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn get_user(&self, id: i32) -> Result<Option<User>, StoreError>;
    /// All users in id order.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    /// Returns `None` when no user has `id`.
    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, StoreError>;
    /// Returns `false` when no user has `id`. Fails while the user still owns orders.
    async fn delete_user(&self, id: i32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;
    async fn get_order(&self, id: i32) -> Result<Option<Order>, StoreError>;
    /// Orders in id order, optionally only those of one user.
    async fn list_orders(&self, user_id: Option<i32>) -> Result<Vec<Order>, StoreError>;
    async fn update_order(&self, id: i32, order_date: String) -> Result<Option<Order>, StoreError>;
    /// Also removes the order's product associations.
    async fn delete_order(&self, id: i32) -> Result<bool, StoreError>;
    async fn add_product_to_order(&self, order_id: i32, product_id: i32) -> Result<(), StoreError>;
    async fn remove_product_from_order(&self, order_id: i32, product_id: i32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError>;
    async fn get_product(&self, id: i32) -> Result<Option<Product>, StoreError>;
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn update_product(&self, id: i32, product: NewProduct) -> Result<Option<Product>, StoreError>;
    /// Also removes the product from every order.
    async fn delete_product(&self, id: i32) -> Result<bool, StoreError>;
}

/// Everything the HTTP layer needs from a backing store.
#[async_trait]
pub trait Store: UserRepository + OrderRepository + ProductRepository {
    async fn ping(&self) -> Result<(), StoreError>;
}
