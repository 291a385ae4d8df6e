//! PostgreSQL store: builder-generated SQL executed against a pool.

use super::{OrderRepository, ProductRepository, Store, StoreError, UserRepository};
use crate::model::{NewOrder, NewProduct, NewUser, Order, Product, User, UserChanges};
use crate::schema::{ORDER, ORDER_PRODUCT, PRODUCT, USER};
use crate::sql::{delete, insert, select_by_key, select_list, update, BindValue, QueryBuf};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{ConnectOptions, FromRow, PgPool};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

#[derive(FromRow)]
struct UserRow {
    id: i32,
    name: String,
    address: String,
    email: String,
    orders: Json<Vec<i32>>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            name: r.name,
            email: r.email,
            address: r.address,
            orders: r.orders.0,
        }
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: i32,
    order_date: String,
    user_id: i32,
    products: Json<Vec<i32>>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Order {
            id: r.id,
            order_date: r.order_date,
            user_id: r.user_id,
            products: r.products.0,
        }
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: i32,
    product_name: String,
    price: f64,
    orders: Json<Vec<i32>>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            product_name: r.product_name,
            price: r.price,
            orders: r.orders.0,
        }
    }
}

impl PgStore {
    /// Tables are looked up in `schema` (see [`crate::migration::apply_schema`]).
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    async fn fetch_optional<T>(&self, q: QueryBuf) -> Result<Option<T>, StoreError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let QueryBuf { sql, params } = q;
        let mut query = sqlx::query_as::<_, T>(&sql);
        for p in params {
            query = query.bind(p);
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn fetch_one<T>(&self, q: QueryBuf) -> Result<T, StoreError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let QueryBuf { sql, params } = q;
        let mut query = sqlx::query_as::<_, T>(&sql);
        for p in params {
            query = query.bind(p);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn fetch_all<T>(&self, q: QueryBuf) -> Result<Vec<T>, StoreError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let QueryBuf { sql, params } = q;
        let mut query = sqlx::query_as::<_, T>(&sql);
        for p in params {
            query = query.bind(p);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, q: QueryBuf) -> Result<u64, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let QueryBuf { sql, params } = q;
        let mut query = sqlx::query(&sql);
        for p in params {
            query = query.bind(p);
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let q = insert(
            &USER,
            &self.schema,
            &[
                ("name", user.name.into()),
                ("address", user.address.into()),
                ("email", user.email.into()),
            ],
        );
        Ok(self.fetch_one::<UserRow>(q).await?.into())
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        let q = select_by_key(&USER, &self.schema, &[id.into()]);
        Ok(self.fetch_optional::<UserRow>(q).await?.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let q = select_list(&USER, &self.schema, &[]);
        let rows = self.fetch_all::<UserRow>(q).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let q = update(
            &USER,
            &self.schema,
            &[id.into()],
            &[("name", changes.name.into()), ("email", changes.email.into())],
        );
        Ok(self.fetch_optional::<UserRow>(q).await?.map(User::from))
    }

    async fn delete_user(&self, id: i32) -> Result<bool, StoreError> {
        let q = delete(&USER, &self.schema, &[id.into()]);
        let affected = self.execute(q).await.map_err(StoreError::deleting)?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let q = insert(
            &ORDER,
            &self.schema,
            &[
                ("order_date", order.order_date.into()),
                ("user_id", order.user_id.into()),
            ],
        );
        Ok(self.fetch_one::<OrderRow>(q).await?.into())
    }

    async fn get_order(&self, id: i32) -> Result<Option<Order>, StoreError> {
        let q = select_by_key(&ORDER, &self.schema, &[id.into()]);
        Ok(self.fetch_optional::<OrderRow>(q).await?.map(Order::from))
    }

    async fn list_orders(&self, user_id: Option<i32>) -> Result<Vec<Order>, StoreError> {
        let filters: Vec<(&str, BindValue)> = user_id
            .map(|id| vec![("user_id", id.into())])
            .unwrap_or_default();
        let q = select_list(&ORDER, &self.schema, &filters);
        let rows = self.fetch_all::<OrderRow>(q).await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn update_order(&self, id: i32, order_date: String) -> Result<Option<Order>, StoreError> {
        let q = update(&ORDER, &self.schema, &[id.into()], &[("order_date", order_date.into())]);
        Ok(self.fetch_optional::<OrderRow>(q).await?.map(Order::from))
    }

    async fn delete_order(&self, id: i32) -> Result<bool, StoreError> {
        let q = delete(&ORDER, &self.schema, &[id.into()]);
        let affected = self.execute(q).await.map_err(StoreError::deleting)?;
        Ok(affected > 0)
    }

    async fn add_product_to_order(&self, order_id: i32, product_id: i32) -> Result<(), StoreError> {
        let q = insert(
            &ORDER_PRODUCT,
            &self.schema,
            &[("order_id", order_id.into()), ("product_id", product_id.into())],
        );
        self.execute(q).await?;
        Ok(())
    }

    async fn remove_product_from_order(&self, order_id: i32, product_id: i32) -> Result<bool, StoreError> {
        let q = delete(&ORDER_PRODUCT, &self.schema, &[order_id.into(), product_id.into()]);
        Ok(self.execute(q).await? > 0)
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let q = insert(
            &PRODUCT,
            &self.schema,
            &[
                ("product_name", product.product_name.into()),
                ("price", product.price.into()),
            ],
        );
        Ok(self.fetch_one::<ProductRow>(q).await?.into())
    }

    async fn get_product(&self, id: i32) -> Result<Option<Product>, StoreError> {
        let q = select_by_key(&PRODUCT, &self.schema, &[id.into()]);
        Ok(self.fetch_optional::<ProductRow>(q).await?.map(Product::from))
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let q = select_list(&PRODUCT, &self.schema, &[]);
        let rows = self.fetch_all::<ProductRow>(q).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(&self, id: i32, product: NewProduct) -> Result<Option<Product>, StoreError> {
        let q = update(
            &PRODUCT,
            &self.schema,
            &[id.into()],
            &[
                ("product_name", product.product_name.into()),
                ("price", product.price.into()),
            ],
        );
        Ok(self.fetch_optional::<ProductRow>(q).await?.map(Product::from))
    }

    async fn delete_product(&self, id: i32) -> Result<bool, StoreError> {
        let q = delete(&PRODUCT, &self.schema, &[id.into()]);
        let affected = self.execute(q).await.map_err(StoreError::deleting)?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Connect to the server's `postgres` database and create the target database when missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url);
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", crate::sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split `postgres://host/db?opts` into (`postgres://host/postgres?opts`, `db`).
fn parse_db_name_from_url(url: &str) -> (String, String) {
    let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    let Some(slash) = url[authority_start..].find('/').map(|i| authority_start + i) else {
        return (url.to_string(), String::new());
    };
    let path_start = slash + 1;
    let path_and_query = &url[path_start..];
    let (db_name, query) = match path_and_query.split_once('?') {
        Some((db, q)) => (db, format!("?{}", q)),
        None => (path_and_query, String::new()),
    };
    (
        format!("{}postgres{}", &url[..path_start], query),
        db_name.trim().to_string(),
    )
}
