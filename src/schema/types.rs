//! Table definition types. Every identifier in generated SQL comes from these definitions.

/// Column storage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    /// Auto-generated integer key.
    Serial,
    Integer,
    VarChar(u32),
    Double,
}

impl SqlType {
    pub fn ddl(&self) -> String {
        match self {
            SqlType::Serial => "SERIAL".into(),
            SqlType::Integer => "INTEGER".into(),
            SqlType::VarChar(n) => format!("VARCHAR({})", n),
            SqlType::Double => "DOUBLE PRECISION".into(),
        }
    }

    /// Declared maximum length for string columns.
    pub fn max_length(&self) -> Option<u32> {
        match self {
            SqlType::VarChar(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, SqlType::VarChar(_))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct PrimaryKeyDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    /// Reported when an insert repeats an existing key.
    pub message: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct UniqueDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub message: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnDelete {
    NoAction,
    Cascade,
}

impl OnDelete {
    pub fn ddl(&self) -> &'static str {
        match self {
            OnDelete::NoAction => "NO ACTION",
            OnDelete::Cascade => "CASCADE",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ForeignKeyDef {
    pub name: &'static str,
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
    pub on_delete: OnDelete,
    /// Reported when the referenced row does not exist.
    pub missing_message: &'static str,
    /// Reported when a referenced row is deleted while still in use.
    pub referenced_message: &'static str,
}

/// To-many relationship rendered as an array of related ids:
/// `related_table.value_column` for every row where `related_table.their_key = self.our_key`.
#[derive(Clone, Copy, Debug)]
pub struct IncludeDef {
    pub name: &'static str,
    pub related_table: &'static str,
    pub value_column: &'static str,
    pub their_key: &'static str,
    pub our_key: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub primary_key: PrimaryKeyDef,
    pub unique: &'static [UniqueDef],
    pub foreign_keys: &'static [ForeignKeyDef],
    pub includes: &'static [IncludeDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Single-column primary key name. Composite keys return the first column.
    pub fn pk(&self) -> &'static str {
        self.primary_key.columns[0]
    }

    /// Columns written on insert: everything except generated keys.
    pub fn insertable_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.sql_type != SqlType::Serial)
    }
}
