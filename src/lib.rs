//! E-commerce data API: users, orders and products stored in PostgreSQL, with CRUD over
//! HTTP for users.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError};
pub use migration::apply_schema;
pub use model::{NewOrder, NewProduct, NewUser, Order, Product, User, UserChanges};
pub use routes::{app, common_routes, user_routes};
pub use state::AppState;
pub use store::{
    ensure_database_exists, ConstraintKind, ConstraintViolation, MemoryStore, OrderRepository,
    PgStore, ProductRepository, Store, StoreError, UserRepository,
};
