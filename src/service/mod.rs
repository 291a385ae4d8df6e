//! Inbound payload validation.

mod validation;
pub use validation::{FieldErrors, LoadRules, RequestValidator};
