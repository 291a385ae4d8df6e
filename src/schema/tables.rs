//! The e-commerce schema: user, order, product and the order_product join table.

use super::types::*;

pub const USER_EMAIL_UNIQUE: &str = "uq_user_email";
pub const ORDER_USER_FK: &str = "fk_order_user";
pub const ORDER_PRODUCT_PK: &str = "uix_order_product";
pub const ORDER_PRODUCT_ORDER_FK: &str = "fk_order_product_order";
pub const ORDER_PRODUCT_PRODUCT_FK: &str = "fk_order_product_product";

pub const USER: TableDef = TableDef {
    name: "user",
    columns: &[
        ColumnDef { name: "id", sql_type: SqlType::Serial, nullable: false },
        ColumnDef { name: "name", sql_type: SqlType::VarChar(100), nullable: false },
        ColumnDef { name: "address", sql_type: SqlType::VarChar(200), nullable: false },
        ColumnDef { name: "email", sql_type: SqlType::VarChar(100), nullable: false },
    ],
    primary_key: PrimaryKeyDef {
        name: "user_pkey",
        columns: &["id"],
        message: "A user with this id already exists",
    },
    unique: &[UniqueDef {
        name: USER_EMAIL_UNIQUE,
        columns: &["email"],
        message: "A user with this email already exists",
    }],
    foreign_keys: &[],
    includes: &[IncludeDef {
        name: "orders",
        related_table: "order",
        value_column: "id",
        their_key: "user_id",
        our_key: "id",
    }],
};

pub const ORDER: TableDef = TableDef {
    name: "order",
    columns: &[
        ColumnDef { name: "id", sql_type: SqlType::Serial, nullable: false },
        ColumnDef { name: "order_date", sql_type: SqlType::VarChar(100), nullable: false },
        ColumnDef { name: "user_id", sql_type: SqlType::Integer, nullable: false },
    ],
    primary_key: PrimaryKeyDef {
        name: "order_pkey",
        columns: &["id"],
        message: "An order with this id already exists",
    },
    unique: &[],
    foreign_keys: &[ForeignKeyDef {
        name: ORDER_USER_FK,
        column: "user_id",
        references_table: "user",
        references_column: "id",
        on_delete: OnDelete::NoAction,
        missing_message: "user_id does not reference an existing user",
        referenced_message: "User still has orders and cannot be deleted",
    }],
    includes: &[IncludeDef {
        name: "products",
        related_table: "order_product",
        value_column: "product_id",
        their_key: "order_id",
        our_key: "id",
    }],
};

pub const PRODUCT: TableDef = TableDef {
    name: "product",
    columns: &[
        ColumnDef { name: "id", sql_type: SqlType::Serial, nullable: false },
        ColumnDef { name: "product_name", sql_type: SqlType::VarChar(100), nullable: false },
        ColumnDef { name: "price", sql_type: SqlType::Double, nullable: false },
    ],
    primary_key: PrimaryKeyDef {
        name: "product_pkey",
        columns: &["id"],
        message: "A product with this id already exists",
    },
    unique: &[],
    foreign_keys: &[],
    includes: &[IncludeDef {
        name: "orders",
        related_table: "order_product",
        value_column: "order_id",
        their_key: "product_id",
        our_key: "id",
    }],
};

pub const ORDER_PRODUCT: TableDef = TableDef {
    name: "order_product",
    columns: &[
        ColumnDef { name: "order_id", sql_type: SqlType::Integer, nullable: false },
        ColumnDef { name: "product_id", sql_type: SqlType::Integer, nullable: false },
    ],
    primary_key: PrimaryKeyDef {
        name: ORDER_PRODUCT_PK,
        columns: &["order_id", "product_id"],
        message: "Product is already part of this order",
    },
    unique: &[],
    foreign_keys: &[
        ForeignKeyDef {
            name: ORDER_PRODUCT_ORDER_FK,
            column: "order_id",
            references_table: "order",
            references_column: "id",
            on_delete: OnDelete::Cascade,
            missing_message: "order_id does not reference an existing order",
            referenced_message: "Order is still referenced by order lines",
        },
        ForeignKeyDef {
            name: ORDER_PRODUCT_PRODUCT_FK,
            column: "product_id",
            references_table: "product",
            references_column: "id",
            on_delete: OnDelete::Cascade,
            missing_message: "product_id does not reference an existing product",
            referenced_message: "Product is still referenced by order lines",
        },
    ],
    includes: &[],
};

/// All tables in dependency order (referenced tables first).
pub const TABLES: &[TableDef] = &[USER, PRODUCT, ORDER, ORDER_PRODUCT];
