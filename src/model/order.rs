use crate::schema::ORDER;
use crate::service::{FieldErrors, LoadRules, RequestValidator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Order {
    pub id: i32,
    pub order_date: String,
    pub user_id: i32,
    /// Ids of associated products, ascending.
    pub products: Vec<i32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewOrder {
    pub order_date: String,
    pub user_id: i32,
}

impl NewOrder {
    const RULES: LoadRules<'static> = LoadRules {
        required: &["order_date", "user_id"],
        optional: &[],
    };

    pub fn from_wire(body: &Value) -> Result<Self, FieldErrors> {
        let fields = RequestValidator::validate(body, &ORDER, &Self::RULES)?;
        super::load(fields)
    }
}
