//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from table definitions.
//! The row being read or written is always aliased as `main`; includes are
//! rendered as scalar subqueries returning a JSON array of related ids.

use super::BindValue;
use crate::schema::{IncludeDef, TableDef};

const MAIN_ALIAS: &str = "main";
const REL_ALIAS: &str = "rel";

/// Quote identifier for PostgreSQL (safe: only from table definitions and config).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn include_subquery(schema: &str, inc: &IncludeDef) -> String {
    let value = format!("{}.{}", REL_ALIAS, quoted(inc.value_column));
    format!(
        "(SELECT COALESCE(json_agg({value} ORDER BY {value}), '[]'::json) FROM {} {} WHERE {}.{} = {}.{}) AS {}",
        qualified_table(schema, inc.related_table),
        REL_ALIAS,
        REL_ALIAS,
        quoted(inc.their_key),
        MAIN_ALIAS,
        quoted(inc.our_key),
        quoted(inc.name),
    )
}

/// All columns of `main` followed by every include of the table.
fn projection(table: &TableDef, schema: &str) -> String {
    table
        .columns
        .iter()
        .map(|c| format!("{}.{}", MAIN_ALIAS, quoted(c.name)))
        .chain(table.includes.iter().map(|inc| include_subquery(schema, inc)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `main.pk1 = $n AND main.pk2 = $m` pairing primary key columns with `key` in order.
fn key_predicate(q: &mut QueryBuf, table: &TableDef, key: &[BindValue]) -> String {
    table
        .primary_key
        .columns
        .iter()
        .zip(key)
        .map(|(col, v)| {
            let n = q.push_param(v.clone());
            format!("{}.{} = ${}", MAIN_ALIAS, quoted(col), n)
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn order_by_pk(table: &TableDef) -> String {
    table
        .primary_key
        .columns
        .iter()
        .map(|c| format!("{}.{}", MAIN_ALIAS, quoted(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT one row by primary key.
pub fn select_by_key(table: &TableDef, schema: &str, key: &[BindValue]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let predicate = key_predicate(&mut q, table, key);
    q.sql = format!(
        "SELECT {} FROM {} {} WHERE {}",
        projection(table, schema),
        qualified_table(schema, table.name),
        MAIN_ALIAS,
        predicate
    );
    q
}

/// SELECT rows with optional exact-match filters, ordered by primary key.
/// Filters on columns the table does not declare are ignored.
pub fn select_list(table: &TableDef, schema: &str, filters: &[(&str, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if table.column(col).is_none() {
            continue;
        }
        let n = q.push_param(val.clone());
        where_parts.push(format!("{}.{} = ${}", MAIN_ALIAS, quoted(col), n));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {} {}{} ORDER BY {}",
        projection(table, schema),
        qualified_table(schema, table.name),
        MAIN_ALIAS,
        where_clause,
        order_by_pk(table)
    );
    q
}

/// INSERT the given column values; generated keys are left to the database.
pub fn insert(table: &TableDef, schema: &str, values: &[(&str, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table.insertable_columns() {
        let Some((_, v)) = values.iter().find(|(name, _)| *name == c.name) else {
            continue;
        };
        let n = q.push_param(v.clone());
        cols.push(quoted(c.name));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} AS {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(schema, table.name),
        MAIN_ALIAS,
        cols.join(", "),
        placeholders.join(", "),
        projection(table, schema)
    );
    q
}

/// UPDATE by primary key: SET only the given columns that the table declares.
pub fn update(
    table: &TableDef,
    schema: &str,
    key: &[BindValue],
    values: &[(&str, BindValue)],
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (col, v) in values {
        if table.primary_key.columns.contains(col) || table.column(col).is_none() {
            continue;
        }
        let n = q.push_param(v.clone());
        sets.push(format!("{} = ${}", quoted(col), n));
    }
    if sets.is_empty() {
        return select_by_key(table, schema, key);
    }
    let predicate = key_predicate(&mut q, table, key);
    q.sql = format!(
        "UPDATE {} AS {} SET {} WHERE {} RETURNING {}",
        qualified_table(schema, table.name),
        MAIN_ALIAS,
        sets.join(", "),
        predicate,
        projection(table, schema)
    );
    q
}

/// DELETE by primary key.
pub fn delete(table: &TableDef, schema: &str, key: &[BindValue]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let predicate = key_predicate(&mut q, table, key);
    q.sql = format!(
        "DELETE FROM {} AS {} WHERE {}",
        qualified_table(schema, table.name),
        MAIN_ALIAS,
        predicate
    );
    q
}
