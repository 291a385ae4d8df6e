use crate::schema::USER;
use crate::service::{FieldErrors, LoadRules, RequestValidator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored user with the ids of the orders it owns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub orders: Vec<i32>,
}

/// Payload for `POST /users`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: String,
}

impl NewUser {
    const RULES: LoadRules<'static> = LoadRules {
        required: &["name", "email", "address"],
        optional: &[],
    };

    pub fn from_wire(body: &Value) -> Result<Self, FieldErrors> {
        let fields = RequestValidator::validate(body, &USER, &Self::RULES)?;
        super::load(fields)
    }
}

/// Payload for `PUT /users/{id}`. Only name and email are applied; an address is
/// validated when sent but left unchanged.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
}

impl UserChanges {
    const RULES: LoadRules<'static> = LoadRules {
        required: &["name", "email"],
        optional: &["address"],
    };

    pub fn from_wire(body: &Value) -> Result<Self, FieldErrors> {
        let fields = RequestValidator::validate(body, &USER, &Self::RULES)?;
        super::load(fields)
    }
}
