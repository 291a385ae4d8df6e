//! Declarative schema: entity tables, keys and relationships.

pub mod tables;
pub mod types;
pub mod validator;

pub use tables::*;
pub use types::*;
pub use validator::validate;

/// A named constraint from any table in [`TABLES`].
#[derive(Clone, Copy, Debug)]
pub enum ConstraintDef {
    PrimaryKey(&'static PrimaryKeyDef),
    Unique(&'static UniqueDef),
    ForeignKey(&'static ForeignKeyDef),
}

pub fn find_constraint(name: &str) -> Option<ConstraintDef> {
    TABLES.iter().find_map(|t| {
        if t.primary_key.name == name {
            return Some(ConstraintDef::PrimaryKey(&t.primary_key));
        }
        if let Some(u) = t.unique.iter().find(|u| u.name == name) {
            return Some(ConstraintDef::Unique(u));
        }
        t.foreign_keys
            .iter()
            .find(|f| f.name == name)
            .map(ConstraintDef::ForeignKey)
    })
}
