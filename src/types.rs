/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Store operations, used by repositories and by view invalidation events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// Logical column types. Drives parameter casts in SQL and value comparison in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Uuid,
    Text,
    Bool,
    Timestamp,
    Date,
    Numeric,
}

impl ColumnKind {
    pub fn pg_cast(&self) -> &'static str {
        match self {
            ColumnKind::Uuid => "uuid",
            ColumnKind::Text => "text",
            ColumnKind::Bool => "boolean",
            ColumnKind::Timestamp => "timestamptz",
            ColumnKind::Date => "date",
            ColumnKind::Numeric => "numeric",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// Static description of a logical table
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Column holding the owning user id, for owner-scoped entities
    pub owner: Option<&'static str>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}
