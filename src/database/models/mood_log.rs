use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, Owned};
use crate::types::{Column, ColumnKind, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Okay,
    Tired,
    Stressed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: Mood,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for MoodLog {
    const TABLE: &'static Table = &Table {
        name: "mood_logs",
        columns: &[
            Column::new("id", ColumnKind::Uuid),
            Column::new("user_id", ColumnKind::Uuid),
            Column::new("mood", ColumnKind::Text),
            Column::new("note", ColumnKind::Text),
            Column::new("created_at", ColumnKind::Timestamp),
        ],
        owner: Some("user_id"),
    };

    const DEFAULT_ORDER: &'static str = "created_at desc";
}

impl Owned for MoodLog {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMoodLog {
    pub mood: Mood,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewMoodLog {
    /// Blank notes are stored as NULL
    pub fn normalized(mut self) -> Self {
        self.note = self.note.filter(|n| !n.trim().is_empty());
        self
    }
}
