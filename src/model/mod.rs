//! Typed entity records and their wire mapping.

mod order;
mod product;
mod user;

pub use order::{NewOrder, Order};
pub use product::{NewProduct, Product};
pub use user::{NewUser, User, UserChanges};

use crate::service::FieldErrors;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Build a typed payload from fields that already passed validation.
fn load<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, FieldErrors> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.insert("_schema".into(), vec![e.to_string()]);
        errors
    })
}
