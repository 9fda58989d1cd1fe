use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, Owned};
use crate::types::{Column, ColumnKind, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Time of day, "HH:MM"
    pub time: String,
    pub category: String,
    pub icon: String,
    pub color: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Routine {
    const TABLE: &'static Table = &Table {
        name: "routines",
        columns: &[
            Column::new("id", ColumnKind::Uuid),
            Column::new("user_id", ColumnKind::Uuid),
            Column::new("title", ColumnKind::Text),
            Column::new("description", ColumnKind::Text),
            Column::new("time", ColumnKind::Text),
            Column::new("category", ColumnKind::Text),
            Column::new("icon", ColumnKind::Text),
            Column::new("color", ColumnKind::Text),
            Column::new("completed", ColumnKind::Bool),
            Column::new("created_at", ColumnKind::Timestamp),
            Column::new("updated_at", ColumnKind::Timestamp),
        ],
        owner: Some("user_id"),
    };

    const DEFAULT_ORDER: &'static str = "time asc, created_at asc";
}

impl Owned for Routine {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoutine {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub time: String,
    pub category: String,
    pub icon: String,
    pub color: String,
}

/// Partial update. `user_id`, `id` and timestamps are not client-writable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutinePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl RoutinePatch {
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }
}
