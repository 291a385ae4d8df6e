pub mod json;

pub use json::{JsonBody, NO_JSON};
