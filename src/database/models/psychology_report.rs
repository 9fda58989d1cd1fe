use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Entity;
use crate::types::{Column, ColumnKind, Table};

/// Published article in the shared psychology library. Read-only through the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsychologyReport {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub author_credentials: String,
    pub category: String,
    pub summary: String,
    pub content: String,
    /// Estimated reading time in minutes
    pub read_time: i32,
    pub published_date: NaiveDate,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for PsychologyReport {
    const TABLE: &'static Table = &Table {
        name: "psychology_reports",
        columns: &[
            Column::new("id", ColumnKind::Uuid),
            Column::new("title", ColumnKind::Text),
            Column::new("author", ColumnKind::Text),
            Column::new("author_credentials", ColumnKind::Text),
            Column::new("category", ColumnKind::Text),
            Column::new("summary", ColumnKind::Text),
            Column::new("content", ColumnKind::Text),
            Column::new("read_time", ColumnKind::Numeric),
            Column::new("published_date", ColumnKind::Date),
            Column::new("image_url", ColumnKind::Text),
            Column::new("created_at", ColumnKind::Timestamp),
        ],
        owner: None,
    };

    const DEFAULT_ORDER: &'static str = "published_date desc, title asc";
}
