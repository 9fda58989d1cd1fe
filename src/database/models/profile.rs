use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::Entity;
use crate::types::{Column, ColumnKind, Table};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Psychiatrist,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Psychiatrist => "psychiatrist",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "psychiatrist" => Ok(Role::Psychiatrist),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    /// An unset or unrecognized role reads as `user`
    #[serde(default, deserialize_with = "role_or_default")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

fn role_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Role, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

impl Entity for Profile {
    const TABLE: &'static Table = &Table {
        name: "profiles",
        columns: &[
            Column::new("id", ColumnKind::Uuid),
            Column::new("email", ColumnKind::Text),
            Column::new("full_name", ColumnKind::Text),
            Column::new("role", ColumnKind::Text),
            Column::new("created_at", ColumnKind::Timestamp),
        ],
        owner: Some("id"),
    };

    const DEFAULT_ORDER: &'static str = "created_at desc";
}

/// Name and email attached to rows that reference a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
        }
    }
}
