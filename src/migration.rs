//! Materialize the schema: CREATE SCHEMA, CREATE TABLE, then named foreign keys.
//! Tables are created in declaration order; foreign keys are added afterwards, each
//! only when no constraint with that name exists yet, so startup is idempotent.

use crate::error::AppError;
use crate::schema::{validate, ForeignKeyDef, TableDef};
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;

/// CREATE TABLE IF NOT EXISTS with columns, primary key and unique constraints.
pub fn create_table_sql(schema: &str, table: &TableDef) -> String {
    let mut defs: Vec<String> = table
        .columns
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", quoted(c.name), c.sql_type.ddl());
            if !c.nullable {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect();

    let pk_cols: Vec<String> = table.primary_key.columns.iter().map(|c| quoted(c)).collect();
    defs.push(format!(
        "CONSTRAINT {} PRIMARY KEY ({})",
        quoted(table.primary_key.name),
        pk_cols.join(", ")
    ));
    for u in table.unique {
        let cols: Vec<String> = u.columns.iter().map(|c| quoted(c)).collect();
        defs.push(format!("CONSTRAINT {} UNIQUE ({})", quoted(u.name), cols.join(", ")));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        qualified_table(schema, table.name),
        defs.join(",\n  ")
    )
}

pub fn foreign_key_sql(schema: &str, table: &TableDef, fk: &ForeignKeyDef) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
        qualified_table(schema, table.name),
        quoted(fk.name),
        quoted(fk.column),
        qualified_table(schema, fk.references_table),
        quoted(fk.references_column),
        fk.on_delete.ddl()
    )
}

/// Validate `tables`, then create everything missing inside `schema`.
pub async fn apply_schema(pool: &PgPool, schema: &str, tables: &[TableDef]) -> Result<(), AppError> {
    validate(tables)?;

    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;

    for t in tables {
        let sql = create_table_sql(schema, t);
        tracing::debug!(sql = %sql, "create table");
        sqlx::query(&sql).execute(pool).await?;
    }

    for t in tables {
        for fk in t.foreign_keys {
            let exists: (bool,) = sqlx::query_as(
                "SELECT EXISTS(SELECT 1 FROM pg_constraint c JOIN pg_namespace n ON n.oid = c.connamespace \
                 WHERE c.conname = $1 AND n.nspname = $2)",
            )
            .bind(fk.name)
            .bind(schema)
            .fetch_one(pool)
            .await?;
            if exists.0 {
                continue;
            }
            let sql = foreign_key_sql(schema, t, fk);
            tracing::debug!(sql = %sql, "add foreign key");
            sqlx::query(&sql).execute(pool).await?;
        }
    }

    tracing::info!(schema = %schema, tables = tables.len(), "schema ready");
    Ok(())
}
