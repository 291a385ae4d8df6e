//! In-memory store with the same key and constraint semantics as the PostgreSQL schema.
//! Every operation runs under one write or read lock, so each is atomic.

use super::{
    ConstraintKind, ConstraintViolation, OrderRepository, ProductRepository, Store, StoreError,
    UserRepository,
};
use crate::model::{NewOrder, NewProduct, NewUser, Order, Product, User, UserChanges};
use crate::schema::{
    ORDER, ORDER_PRODUCT_ORDER_FK, ORDER_PRODUCT_PK, ORDER_PRODUCT_PRODUCT_FK, ORDER_USER_FK,
    PRODUCT, USER, USER_EMAIL_UNIQUE,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

struct UserRow {
    name: String,
    address: String,
    email: String,
}

struct OrderRow {
    order_date: String,
    user_id: i32,
}

struct ProductRow {
    product_name: String,
    price: f64,
}

/// Key sequence behaving like SERIAL: values are never reused, and it fails
/// instead of wrapping once `i32::MAX` has been handed out.
#[derive(Default)]
struct Sequence(i32);

impl Sequence {
    fn next(&mut self, table: &'static str) -> Result<i32, StoreError> {
        self.0 = self
            .0
            .checked_add(1)
            .ok_or(StoreError::SequenceExhausted(table))?;
        Ok(self.0)
    }
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, UserRow>,
    orders: BTreeMap<i32, OrderRow>,
    products: BTreeMap<i32, ProductRow>,
    /// (order_id, product_id)
    order_products: BTreeSet<(i32, i32)>,
    user_ids: Sequence,
    order_ids: Sequence,
    product_ids: Sequence,
}

impl Tables {
    fn user(&self, id: i32) -> Option<User> {
        self.users.get(&id).map(|u| User {
            id,
            name: u.name.clone(),
            email: u.email.clone(),
            address: u.address.clone(),
            orders: self
                .orders
                .iter()
                .filter(|(_, o)| o.user_id == id)
                .map(|(oid, _)| *oid)
                .collect(),
        })
    }

    fn order(&self, id: i32) -> Option<Order> {
        self.orders.get(&id).map(|o| Order {
            id,
            order_date: o.order_date.clone(),
            user_id: o.user_id,
            products: self
                .order_products
                .range((id, i32::MIN)..=(id, i32::MAX))
                .map(|(_, pid)| *pid)
                .collect(),
        })
    }

    fn product(&self, id: i32) -> Option<Product> {
        self.products.get(&id).map(|p| Product {
            id,
            product_name: p.product_name.clone(),
            price: p.price,
            orders: self
                .order_products
                .iter()
                .filter(|(_, pid)| *pid == id)
                .map(|(oid, _)| *oid)
                .collect(),
        })
    }

    fn check_email_free(&self, email: &str, except: Option<i32>) -> Result<(), ConstraintViolation> {
        let taken = self
            .users
            .iter()
            .any(|(id, u)| u.email == email && Some(*id) != except);
        if taken {
            return Err(ConstraintViolation::new(ConstraintKind::Unique, USER_EMAIL_UNIQUE));
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        t.check_email_free(&user.email, None)?;
        let id = t.user_ids.next(USER.name)?;
        t.users.insert(
            id,
            UserRow {
                name: user.name.clone(),
                address: user.address.clone(),
                email: user.email.clone(),
            },
        );
        Ok(User {
            id,
            name: user.name,
            email: user.email,
            address: user.address,
            orders: Vec::new(),
        })
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.user(id))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.keys().filter_map(|id| t.user(*id)).collect())
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&id) {
            return Ok(None);
        }
        t.check_email_free(&changes.email, Some(id))?;
        if let Some(row) = t.users.get_mut(&id) {
            row.name = changes.name;
            row.email = changes.email;
        }
        Ok(t.user(id))
    }

    async fn delete_user(&self, id: i32) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&id) {
            return Ok(false);
        }
        if t.orders.values().any(|o| o.user_id == id) {
            return Err(
                ConstraintViolation::new(ConstraintKind::ForeignKeyReferenced, ORDER_USER_FK).into(),
            );
        }
        t.users.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&order.user_id) {
            return Err(
                ConstraintViolation::new(ConstraintKind::ForeignKeyMissing, ORDER_USER_FK).into(),
            );
        }
        let id = t.order_ids.next(ORDER.name)?;
        t.orders.insert(
            id,
            OrderRow {
                order_date: order.order_date.clone(),
                user_id: order.user_id,
            },
        );
        Ok(Order {
            id,
            order_date: order.order_date,
            user_id: order.user_id,
            products: Vec::new(),
        })
    }

    async fn get_order(&self, id: i32) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.read().await.order(id))
    }

    async fn list_orders(&self, user_id: Option<i32>) -> Result<Vec<Order>, StoreError> {
        let t = self.tables.read().await;
        Ok(t
            .orders
            .iter()
            .filter(|(_, o)| user_id.map_or(true, |uid| o.user_id == uid))
            .filter_map(|(id, _)| t.order(*id))
            .collect())
    }

    async fn update_order(&self, id: i32, order_date: String) -> Result<Option<Order>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(row) = t.orders.get_mut(&id) else {
            return Ok(None);
        };
        row.order_date = order_date;
        Ok(t.order(id))
    }

    async fn delete_order(&self, id: i32) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        if t.orders.remove(&id).is_none() {
            return Ok(false);
        }
        t.order_products.retain(|(oid, _)| *oid != id);
        Ok(true)
    }

    async fn add_product_to_order(&self, order_id: i32, product_id: i32) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        if !t.orders.contains_key(&order_id) {
            return Err(ConstraintViolation::new(
                ConstraintKind::ForeignKeyMissing,
                ORDER_PRODUCT_ORDER_FK,
            )
            .into());
        }
        if !t.products.contains_key(&product_id) {
            return Err(ConstraintViolation::new(
                ConstraintKind::ForeignKeyMissing,
                ORDER_PRODUCT_PRODUCT_FK,
            )
            .into());
        }
        if !t.order_products.insert((order_id, product_id)) {
            return Err(ConstraintViolation::new(ConstraintKind::Unique, ORDER_PRODUCT_PK).into());
        }
        Ok(())
    }

    async fn remove_product_from_order(&self, order_id: i32, product_id: i32) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .write()
            .await
            .order_products
            .remove(&(order_id, product_id)))
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut t = self.tables.write().await;
        let id = t.product_ids.next(PRODUCT.name)?;
        t.products.insert(
            id,
            ProductRow {
                product_name: product.product_name.clone(),
                price: product.price,
            },
        );
        Ok(Product {
            id,
            product_name: product.product_name,
            price: product.price,
            orders: Vec::new(),
        })
    }

    async fn get_product(&self, id: i32) -> Result<Option<Product>, StoreError> {
        Ok(self.tables.read().await.product(id))
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.products.keys().filter_map(|id| t.product(*id)).collect())
    }

    async fn update_product(&self, id: i32, product: NewProduct) -> Result<Option<Product>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(row) = t.products.get_mut(&id) else {
            return Ok(None);
        };
        row.product_name = product.product_name;
        row.price = product.price;
        Ok(t.product(id))
    }

    async fn delete_product(&self, id: i32) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        if t.products.remove(&id).is_none() {
            return Ok(false);
        }
        t.order_products.retain(|(_, pid)| *pid != id);
        Ok(true)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Grace".into(),
            email: email.into(),
            address: "1 Harbor Way".into(),
        }
    }

    fn kind(err: StoreError) -> ConstraintKind {
        match err {
            StoreError::Constraint(v) => v.kind,
            other => panic!("expected constraint violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = store.create_user(new_user("a@x.com")).await.unwrap();
        assert!(store.delete_user(first.id).await.unwrap());
        let second = store.create_user(new_user("a@x.com")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn email_stays_unique_across_updates() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@x.com")).await.unwrap();
        let b = store.create_user(new_user("b@x.com")).await.unwrap();

        let err = store.create_user(new_user("a@x.com")).await.unwrap_err();
        assert_eq!(kind(err), ConstraintKind::Unique);

        let changes = UserChanges {
            name: "B".into(),
            email: "a@x.com".into(),
        };
        let err = store.update_user(b.id, changes).await.unwrap_err();
        assert_eq!(kind(err), ConstraintKind::Unique);

        let keep_own = UserChanges {
            name: "B".into(),
            email: "b@x.com".into(),
        };
        assert_eq!(store.update_user(b.id, keep_own).await.unwrap().unwrap().name, "B");
    }

    #[tokio::test]
    async fn orders_reference_existing_users() {
        let store = MemoryStore::new();
        let err = store
            .create_order(NewOrder {
                order_date: "2024-01-01".into(),
                user_id: 42,
            })
            .await
            .unwrap_err();
        assert_eq!(kind(err), ConstraintKind::ForeignKeyMissing);

        let user = store.create_user(new_user("o@x.com")).await.unwrap();
        let order = store
            .create_order(NewOrder {
                order_date: "2024-01-01".into(),
                user_id: user.id,
            })
            .await
            .unwrap();
        assert_eq!(store.get_user(user.id).await.unwrap().unwrap().orders, vec![order.id]);

        let err = store.delete_user(user.id).await.unwrap_err();
        assert_eq!(kind(err), ConstraintKind::ForeignKeyReferenced);
        assert!(store.get_user(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn association_pairs_are_unique_and_cascade() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("p@x.com")).await.unwrap();
        let order = store
            .create_order(NewOrder {
                order_date: "2024-02-02".into(),
                user_id: user.id,
            })
            .await
            .unwrap();
        let lamp = store
            .create_product(NewProduct {
                product_name: "lamp".into(),
                price: 19.5,
            })
            .await
            .unwrap();
        let desk = store
            .create_product(NewProduct {
                product_name: "desk".into(),
                price: 120.0,
            })
            .await
            .unwrap();

        store.add_product_to_order(order.id, desk.id).await.unwrap();
        store.add_product_to_order(order.id, lamp.id).await.unwrap();
        let err = store.add_product_to_order(order.id, lamp.id).await.unwrap_err();
        assert_eq!(kind(err), ConstraintKind::Unique);
        let err = store.add_product_to_order(order.id, 999).await.unwrap_err();
        assert_eq!(kind(err), ConstraintKind::ForeignKeyMissing);

        let fetched = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(fetched.products, vec![lamp.id, desk.id]);
        assert_eq!(store.get_product(lamp.id).await.unwrap().unwrap().orders, vec![order.id]);

        assert!(store.delete_product(lamp.id).await.unwrap());
        assert_eq!(store.get_order(order.id).await.unwrap().unwrap().products, vec![desk.id]);

        assert!(store.delete_order(order.id).await.unwrap());
        assert!(store.get_product(desk.id).await.unwrap().unwrap().orders.is_empty());
        assert!(store.delete_user(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn order_lines_can_be_removed_once() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("r@x.com")).await.unwrap();
        let order = store
            .create_order(NewOrder {
                order_date: "2024-03-03".into(),
                user_id: user.id,
            })
            .await
            .unwrap();
        let pen = store
            .create_product(NewProduct {
                product_name: "pen".into(),
                price: 2.0,
            })
            .await
            .unwrap();
        store.add_product_to_order(order.id, pen.id).await.unwrap();

        assert!(store.remove_product_from_order(order.id, pen.id).await.unwrap());
        assert!(!store.remove_product_from_order(order.id, pen.id).await.unwrap());
        assert!(store.get_order(order.id).await.unwrap().unwrap().products.is_empty());
    }

    #[tokio::test]
    async fn updates_rewrite_orders_and_products() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("u@x.com")).await.unwrap();
        let order = store
            .create_order(NewOrder {
                order_date: "2024-04-04".into(),
                user_id: user.id,
            })
            .await
            .unwrap();
        let updated = store
            .update_order(order.id, "2024-05-05".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.order_date, "2024-05-05");
        assert_eq!(updated.user_id, user.id);
        assert_eq!(store.update_order(order.id + 1, "2024-05-05".into()).await.unwrap(), None);

        let lamp = store
            .create_product(NewProduct {
                product_name: "lamp".into(),
                price: 19.5,
            })
            .await
            .unwrap();
        let changed = NewProduct {
            product_name: "floor lamp".into(),
            price: 49.0,
        };
        let updated = store.update_product(lamp.id, changed.clone()).await.unwrap().unwrap();
        assert_eq!(updated.product_name, "floor lamp");
        assert_eq!(updated.price, 49.0);
        assert_eq!(store.get_product(lamp.id).await.unwrap(), Some(updated));
        assert_eq!(store.update_product(lamp.id + 1, changed).await.unwrap(), None);
    }

    #[tokio::test]
    async fn exhausted_sequence_fails_without_writing() {
        let store = MemoryStore::new();
        store.tables.write().await.user_ids = Sequence(i32::MAX);
        let err = store.create_user(new_user("max@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::SequenceExhausted("user")));
        assert!(store.list_users().await.unwrap().is_empty());
    }
}
