use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, ProfileSummary};
use crate::types::{Column, ColumnKind, Table};

/// Who besides the patient and the author may read a report.
///
/// Persisted as the `is_private` boolean: `true` is `PatientAndAuthorOnly`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportVisibility {
    #[default]
    PatientAndAuthorOnly,
    SharedWithCareTeam,
}

impl ReportVisibility {
    pub fn from_private(is_private: bool) -> Self {
        if is_private {
            ReportVisibility::PatientAndAuthorOnly
        } else {
            ReportVisibility::SharedWithCareTeam
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, ReportVisibility::PatientAndAuthorOnly)
    }
}

mod is_private {
    use super::ReportVisibility;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &ReportVisibility, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bool(v.is_private())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ReportVisibility, D::Error> {
        // NULL in storage is treated as private
        let flag = Option::<bool>::deserialize(d)?.unwrap_or(true);
        Ok(ReportVisibility::from_private(flag))
    }
}

/// A clinical session note written by a psychiatrist about a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub psychiatrist_id: Uuid,
    pub title: String,
    pub content: String,
    pub session_date: NaiveDate,
    pub diagnosis: Option<String>,
    pub recommendations: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    #[serde(rename = "is_private", with = "is_private", default)]
    pub visibility: ReportVisibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for UserReport {
    const TABLE: &'static Table = &Table {
        name: "user_reports",
        columns: &[
            Column::new("id", ColumnKind::Uuid),
            Column::new("user_id", ColumnKind::Uuid),
            Column::new("psychiatrist_id", ColumnKind::Uuid),
            Column::new("title", ColumnKind::Text),
            Column::new("content", ColumnKind::Text),
            Column::new("session_date", ColumnKind::Date),
            Column::new("diagnosis", ColumnKind::Text),
            Column::new("recommendations", ColumnKind::Text),
            Column::new("follow_up_date", ColumnKind::Date),
            Column::new("is_private", ColumnKind::Bool),
            Column::new("created_at", ColumnKind::Timestamp),
            Column::new("updated_at", ColumnKind::Timestamp),
        ],
        owner: Some("user_id"),
    };

    const DEFAULT_ORDER: &'static str = "session_date desc";
}

/// A report with the patient and author names attached. Profiles missing at hydration time leave these null.
#[derive(Debug, Clone, Serialize)]
pub struct HydratedReport {
    #[serde(flatten)]
    pub report: UserReport,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub psychiatrist_name: Option<String>,
    pub psychiatrist_email: Option<String>,
}

impl HydratedReport {
    pub fn new(report: UserReport, patient: Option<&ProfileSummary>, author: Option<&ProfileSummary>) -> Self {
        Self {
            report,
            user_name: patient.and_then(|p| p.full_name.clone()),
            user_email: patient.map(|p| p.email.clone()),
            psychiatrist_name: author.and_then(|p| p.full_name.clone()),
            psychiatrist_email: author.map(|p| p.email.clone()),
        }
    }
}

fn private_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserReport {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub session_date: NaiveDate,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default = "private_by_default")]
    pub is_private: bool,
}

/// Partial update. `user_id` and `psychiatrist_id` are fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserReportPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "super::present", skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::present", skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::present", skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}
