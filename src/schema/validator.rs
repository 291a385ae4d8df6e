//! Schema validation: referential integrity of the table definitions themselves.

use crate::error::ConfigError;
use crate::schema::TableDef;
use std::collections::HashSet;

pub fn validate(tables: &[TableDef]) -> Result<(), ConfigError> {
    let mut seen_tables: HashSet<&str> = HashSet::new();
    let mut constraint_names: HashSet<&str> = HashSet::new();

    for t in tables {
        if !seen_tables.insert(t.name) {
            return Err(ConfigError::Validation(format!("duplicate table: {}", t.name)));
        }

        let mut column_names = HashSet::new();
        for c in t.columns {
            if !column_names.insert(c.name) {
                return Err(ConfigError::Validation(format!(
                    "duplicate column {} in table {}",
                    c.name, t.name
                )));
            }
        }

        if t.primary_key.columns.is_empty() {
            return Err(ConfigError::Validation(format!("table {} has no primary key", t.name)));
        }
        for pk in t.primary_key.columns {
            if !column_names.contains(pk) {
                return Err(ConfigError::InvalidPrimaryKey {
                    table: t.name.to_string(),
                    column: pk.to_string(),
                });
            }
        }

        let names = std::iter::once(t.primary_key.name)
            .chain(t.unique.iter().map(|u| u.name))
            .chain(t.foreign_keys.iter().map(|f| f.name));
        for name in names {
            if !constraint_names.insert(name) {
                return Err(ConfigError::Validation(format!("duplicate constraint name: {}", name)));
            }
        }

        for u in t.unique {
            for col in u.columns {
                if !column_names.contains(col) {
                    return Err(ConfigError::MissingReference {
                        kind: "column",
                        id: format!("{}.{}", t.name, col),
                    });
                }
            }
        }

        for fk in t.foreign_keys {
            if !column_names.contains(fk.column) {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", t.name, fk.column),
                });
            }
            // Referenced tables must be declared (and therefore created) first.
            let target = tables
                .iter()
                .take_while(|other| other.name != t.name)
                .find(|other| other.name == fk.references_table)
                .ok_or_else(|| ConfigError::MissingReference {
                    kind: "table",
                    id: fk.references_table.to_string(),
                })?;
            if target.column(fk.references_column).is_none() {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", target.name, fk.references_column),
                });
            }
        }
    }

    for t in tables {
        for inc in t.includes {
            let related = tables
                .iter()
                .find(|other| other.name == inc.related_table)
                .ok_or_else(|| ConfigError::MissingReference {
                    kind: "table",
                    id: inc.related_table.to_string(),
                })?;
            for col in [inc.value_column, inc.their_key] {
                if related.column(col).is_none() {
                    return Err(ConfigError::MissingReference {
                        kind: "column",
                        id: format!("{}.{}", related.name, col),
                    });
                }
            }
            if t.column(inc.our_key).is_none() {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", t.name, inc.our_key),
                });
            }
        }
    }
    Ok(())
}
