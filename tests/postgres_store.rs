//! Runs against a live PostgreSQL server when `TEST_DATABASE_URL` is set; otherwise
//! each test returns early. Every test works in its own schema and drops it afterwards.

use ecommerce_api::schema::TABLES;
use ecommerce_api::{
    apply_schema, ConstraintKind, NewOrder, NewProduct, NewUser, OrderRepository, PgStore,
    ProductRepository, Store, StoreError, UserChanges, UserRepository,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::atomic::{AtomicU32, Ordering};

static SEQ: AtomicU32 = AtomicU32::new(0);

async fn store() -> Option<PgStore> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    let schema = format!(
        "test_{}_{}",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    );
    apply_schema(&pool, &schema, TABLES).await.expect("apply schema");
    Some(PgStore::new(pool, schema))
}

async fn drop_schema(store: PgStore) {
    sqlx::query(&format!("DROP SCHEMA \"{}\" CASCADE", store.schema()))
        .execute(store.pool())
        .await
        .expect("drop schema");
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Ada".into(),
        email: email.into(),
        address: "1 Loop Road".into(),
    }
}

fn kind(err: StoreError) -> ConstraintKind {
    match err {
        StoreError::Constraint(v) => v.kind,
        other => panic!("expected constraint violation, got {other:?}"),
    }
}

#[tokio::test]
async fn user_lifecycle() {
    let Some(store) = store().await else { return };
    store.ping().await.unwrap();

    let user = store.create_user(new_user("ada@x.com")).await.unwrap();
    assert_eq!(user.orders, Vec::<i32>::new());
    assert_eq!(store.get_user(user.id).await.unwrap(), Some(user.clone()));

    let updated = store
        .update_user(
            user.id,
            UserChanges {
                name: "Countess".into(),
                email: "countess@x.com".into(),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Countess");
    assert_eq!(updated.address, "1 Loop Road");

    assert!(store.delete_user(user.id).await.unwrap());
    assert!(!store.delete_user(user.id).await.unwrap());
    assert_eq!(store.get_user(user.id).await.unwrap(), None);

    drop_schema(store).await;
}

#[tokio::test]
async fn constraint_names_survive_the_database() {
    let Some(store) = store().await else { return };

    let user = store.create_user(new_user("a@x.com")).await.unwrap();
    assert_eq!(
        kind(store.create_user(new_user("a@x.com")).await.unwrap_err()),
        ConstraintKind::Unique
    );

    let missing = store
        .create_order(NewOrder {
            order_date: "2024-01-01".into(),
            user_id: user.id + 100,
        })
        .await
        .unwrap_err();
    assert_eq!(kind(missing), ConstraintKind::ForeignKeyMissing);

    store
        .create_order(NewOrder {
            order_date: "2024-01-01".into(),
            user_id: user.id,
        })
        .await
        .unwrap();
    assert_eq!(
        kind(store.delete_user(user.id).await.unwrap_err()),
        ConstraintKind::ForeignKeyReferenced
    );

    drop_schema(store).await;
}

#[tokio::test]
async fn order_products_cascade() {
    let Some(store) = store().await else { return };

    let user = store.create_user(new_user("b@x.com")).await.unwrap();
    let order = store
        .create_order(NewOrder {
            order_date: "2024-02-02".into(),
            user_id: user.id,
        })
        .await
        .unwrap();
    let pen = store
        .create_product(NewProduct {
            product_name: "Pen".into(),
            price: 1.5,
        })
        .await
        .unwrap();

    store.add_product_to_order(order.id, pen.id).await.unwrap();
    assert_eq!(
        kind(store.add_product_to_order(order.id, pen.id).await.unwrap_err()),
        ConstraintKind::Unique
    );
    assert_eq!(store.get_order(order.id).await.unwrap().unwrap().products, vec![pen.id]);
    assert_eq!(store.get_product(pen.id).await.unwrap().unwrap().orders, vec![order.id]);
    assert_eq!(store.get_user(user.id).await.unwrap().unwrap().orders, vec![order.id]);

    assert!(store.remove_product_from_order(order.id, pen.id).await.unwrap());
    assert!(!store.remove_product_from_order(order.id, pen.id).await.unwrap());
    store.add_product_to_order(order.id, pen.id).await.unwrap();

    assert!(store.delete_product(pen.id).await.unwrap());
    assert!(store.get_order(order.id).await.unwrap().unwrap().products.is_empty());

    assert_eq!(store.list_orders(Some(user.id)).await.unwrap().len(), 1);
    assert!(store.list_orders(Some(user.id + 1)).await.unwrap().is_empty());

    drop_schema(store).await;
}

#[tokio::test]
async fn updates_rewrite_orders_and_products() {
    let Some(store) = store().await else { return };

    let user = store.create_user(new_user("c@x.com")).await.unwrap();
    let order = store
        .create_order(NewOrder {
            order_date: "2024-03-03".into(),
            user_id: user.id,
        })
        .await
        .unwrap();
    let updated = store
        .update_order(order.id, "2024-04-04".into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.order_date, "2024-04-04");
    assert_eq!(updated.user_id, user.id);
    assert_eq!(store.update_order(order.id + 1, "2024-04-04".into()).await.unwrap(), None);

    let lamp = store
        .create_product(NewProduct {
            product_name: "Lamp".into(),
            price: 19.5,
        })
        .await
        .unwrap();
    let changed = NewProduct {
        product_name: "Floor lamp".into(),
        price: 49.0,
    };
    let updated = store.update_product(lamp.id, changed.clone()).await.unwrap().unwrap();
    assert_eq!(updated.product_name, "Floor lamp");
    assert_eq!(updated.price, 49.0);
    assert_eq!(store.get_product(lamp.id).await.unwrap(), Some(updated));
    assert_eq!(store.update_product(lamp.id + 1, changed).await.unwrap(), None);

    drop_schema(store).await;
}
