//! Persistence errors. Both stores report constraint failures with the same constraint names.

use crate::schema::{find_constraint, ConstraintDef};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    /// A written row points at a row that does not exist.
    ForeignKeyMissing,
    /// A deleted row is still referenced by another row.
    ForeignKeyReferenced,
    NotNull,
    Check,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    pub constraint: Option<String>,
}

impl ConstraintViolation {
    pub fn new(kind: ConstraintKind, constraint: &str) -> Self {
        ConstraintViolation {
            kind,
            constraint: Some(constraint.to_string()),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = self.constraint.as_deref().and_then(find_constraint);
        let msg = match (known, self.kind) {
            (Some(ConstraintDef::PrimaryKey(pk)), _) => pk.message,
            (Some(ConstraintDef::Unique(u)), _) => u.message,
            (Some(ConstraintDef::ForeignKey(fk)), ConstraintKind::ForeignKeyReferenced) => {
                fk.referenced_message
            }
            (Some(ConstraintDef::ForeignKey(fk)), _) => fk.missing_message,
            (None, ConstraintKind::Unique) => "Value already exists",
            (None, ConstraintKind::ForeignKeyMissing) => "Referenced record does not exist",
            (None, ConstraintKind::ForeignKeyReferenced) => "Record is still referenced",
            (None, ConstraintKind::NotNull) => "Required value is missing",
            (None, ConstraintKind::Check) => "Value violates a check constraint",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    Constraint(ConstraintViolation),
    #[error("database: {0}")]
    Db(sqlx::Error),
    /// No key left in a table's id sequence.
    #[error("sequence for {0} is exhausted")]
    SequenceExhausted(&'static str),
}

impl StoreError {
    /// Reclassify foreign-key failures raised while deleting: the row is still referenced.
    pub(crate) fn deleting(self) -> Self {
        match self {
            StoreError::Constraint(v) if v.kind == ConstraintKind::ForeignKeyMissing => {
                StoreError::Constraint(ConstraintViolation {
                    kind: ConstraintKind::ForeignKeyReferenced,
                    ..v
                })
            }
            other => other,
        }
    }
}

impl From<ConstraintViolation> for StoreError {
    fn from(v: ConstraintViolation) -> Self {
        StoreError::Constraint(v)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;
        let Some(db) = e.as_database_error() else {
            return StoreError::Db(e);
        };
        let kind = match db.kind() {
            ErrorKind::UniqueViolation => ConstraintKind::Unique,
            ErrorKind::ForeignKeyViolation => ConstraintKind::ForeignKeyMissing,
            ErrorKind::NotNullViolation => ConstraintKind::NotNull,
            ErrorKind::CheckViolation => ConstraintKind::Check,
            _ => return StoreError::Db(e),
        };
        let constraint = db.constraint().map(str::to_string);
        StoreError::Constraint(ConstraintViolation { kind, constraint })
    }
}
