use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, Owned};
use crate::types::{Column, ColumnKind, Table};

/// Planned vs completed hours for one user on one day. (user_id, date) is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSample {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub planned_hours: f64,
    pub completed_hours: f64,
    pub created_at: DateTime<Utc>,
}

impl Entity for AnalyticsSample {
    const TABLE: &'static Table = &Table {
        name: "analytics_data",
        columns: &[
            Column::new("id", ColumnKind::Uuid),
            Column::new("user_id", ColumnKind::Uuid),
            Column::new("date", ColumnKind::Date),
            Column::new("planned_hours", ColumnKind::Numeric),
            Column::new("completed_hours", ColumnKind::Numeric),
            Column::new("created_at", ColumnKind::Timestamp),
        ],
        owner: Some("user_id"),
    };

    const DEFAULT_ORDER: &'static str = "date asc";
}

impl Owned for AnalyticsSample {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnalyticsSample {
    pub date: NaiveDate,
    pub planned_hours: f64,
    pub completed_hours: f64,
}

impl NewAnalyticsSample {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [("planned_hours", self.planned_hours), ("completed_hours", self.completed_hours)] {
            if !value.is_finite() || !(0.0..=24.0).contains(&value) {
                return Err(format!("{} must be between 0 and 24", field));
            }
        }
        Ok(())
    }
}
