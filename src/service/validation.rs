//! Request validation from the column definitions of a table.

use crate::schema::{SqlType, TableDef};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name to error messages. `_schema` holds errors about the payload as a whole.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const MISSING: &str = "Missing data for required field.";
pub const NULL: &str = "Field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_A_NUMBER: &str = "Not a valid number.";
pub const NOT_AN_INTEGER: &str = "Not a valid integer.";
pub const UNKNOWN: &str = "Unknown field.";
pub const INVALID_INPUT: &str = "Invalid input type.";

/// Which loadable fields must be present, and which are accepted but optional.
pub struct LoadRules<'a> {
    pub required: &'a [&'a str],
    pub optional: &'a [&'a str],
}

pub struct RequestValidator;

impl RequestValidator {
    /// Check `body` against `table`'s columns. All errors are collected; on success the
    /// object is returned with only the declared (required or optional) fields present.
    pub fn validate(
        body: &Value,
        table: &TableDef,
        rules: &LoadRules<'_>,
    ) -> Result<Map<String, Value>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let Some(obj) = body.as_object() else {
            errors.insert("_schema".into(), vec![INVALID_INPUT.into()]);
            return Err(errors);
        };

        for key in obj.keys() {
            if !rules.required.contains(&key.as_str())
                && !rules.optional.contains(&key.as_str())
                && key.as_str() != table.pk()
            {
                push(&mut errors, key, UNKNOWN.into());
            }
        }

        let mut out = Map::new();
        for col in rules.required.iter().chain(rules.optional) {
            let required = rules.required.contains(col);
            match obj.get(*col) {
                None if required => push(&mut errors, col, MISSING.into()),
                None => {}
                Some(v) => match validate_field(table, col, v) {
                    Ok(()) => {
                        out.insert(col.to_string(), v.clone());
                    }
                    Err(msg) => push(&mut errors, col, msg),
                },
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors)
        }
    }
}

fn push(errors: &mut FieldErrors, field: &str, msg: String) {
    errors.entry(field.to_string()).or_default().push(msg);
}

fn validate_field(table: &TableDef, col: &str, v: &Value) -> Result<(), String> {
    let Some(def) = table.column(col) else {
        return Err(UNKNOWN.into());
    };
    if v.is_null() {
        return if def.nullable { Ok(()) } else { Err(NULL.into()) };
    }
    if def.sql_type.is_string() {
        // PostgreSQL text cannot hold NUL.
        let Some(s) = v.as_str().filter(|s| !s.contains('\0')) else {
            return Err(NOT_A_STRING.into());
        };
        let len = s.chars().count();
        if len < 1 {
            return Err("Shorter than minimum length 1.".into());
        }
        if let Some(max) = def.sql_type.max_length() {
            if len > max as usize {
                return Err(format!("Longer than maximum length {}.", max));
            }
        }
        return Ok(());
    }
    match def.sql_type {
        SqlType::Double if !v.is_number() => Err(NOT_A_NUMBER.into()),
        SqlType::Integer | SqlType::Serial
            if v.as_i64().and_then(|n| i32::try_from(n).ok()).is_none() =>
        {
            Err(NOT_AN_INTEGER.into())
        }
        _ => Ok(()),
    }
}
