use crate::schema::PRODUCT;
use crate::service::{FieldErrors, LoadRules, RequestValidator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    pub id: i32,
    pub product_name: String,
    pub price: f64,
    pub orders: Vec<i32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewProduct {
    pub product_name: String,
    pub price: f64,
}

impl NewProduct {
    const RULES: LoadRules<'static> = LoadRules {
        required: &["product_name", "price"],
        optional: &[],
    };

    pub fn from_wire(body: &Value) -> Result<Self, FieldErrors> {
        let fields = RequestValidator::validate(body, &PRODUCT, &Self::RULES)?;
        super::load(fields)
    }
}
