use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Entity;
use crate::types::{Column, ColumnKind, Table};

/// Grants a psychiatrist visibility into one patient's data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub psychiatrist_id: Uuid,
    pub patient_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Entity for Assignment {
    const TABLE: &'static Table = &Table {
        name: "psychiatrist_patients",
        columns: &[
            Column::new("psychiatrist_id", ColumnKind::Uuid),
            Column::new("patient_id", ColumnKind::Uuid),
            Column::new("created_at", ColumnKind::Timestamp),
        ],
        owner: None,
    };

    const DEFAULT_ORDER: &'static str = "created_at asc";
}
