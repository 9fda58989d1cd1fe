use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{Profile, Role};
use crate::database::{Repository, Store};
use crate::filter::FilterData;

/// Authenticated caller, as asserted by a verified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Outcome of looking up the caller's role in `profiles`.
///
/// Keeps "no profile yet" apart from "store unreachable" so callers can choose between
/// the lenient [`Session::effective_role`] and the strict [`Session::strict_role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "role", rename_all = "snake_case")]
pub enum RoleLookup {
    Resolved(Role),
    NotFound,
    TransientError,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub role_lookup: RoleLookup,
}

impl Session {
    pub async fn resolve(store: Arc<dyn Store>, identity: Identity) -> Self {
        let profiles = Repository::<Profile>::new(store);
        let role_lookup = match profiles
            .select_one(FilterData::where_(json!({ "id": identity.id })))
            .await
        {
            Ok(Some(profile)) => RoleLookup::Resolved(profile.role),
            Ok(None) => {
                tracing::debug!("No profile for user {}, treating as user", identity.id);
                RoleLookup::NotFound
            }
            Err(e) => {
                tracing::warn!("Role lookup failed for user {}: {}", identity.id, e);
                RoleLookup::TransientError
            }
        };

        Self { identity, role_lookup }
    }

    /// Role used for gating. Anything short of a resolved profile counts as `user`.
    pub fn effective_role(&self) -> Role {
        match self.role_lookup {
            RoleLookup::Resolved(role) => role,
            RoleLookup::NotFound | RoleLookup::TransientError => Role::User,
        }
    }

    /// Role only when the lookup actually succeeded
    pub fn strict_role(&self) -> Option<Role> {
        match self.role_lookup {
            RoleLookup::Resolved(role) => Some(role),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.identity.id
    }

    /// Administrator acting out-of-band through the `habitual` CLI
    pub fn operator() -> Self {
        Self {
            identity: Identity {
                id: Uuid::nil(),
                email: "operator@localhost".to_string(),
            },
            role_lookup: RoleLookup::Resolved(Role::Admin),
        }
    }

    #[cfg(test)]
    pub fn with_role(id: Uuid, role: Role) -> Self {
        Self {
            identity: Identity {
                id,
                email: format!("{}@example.com", id.simple()),
            },
            role_lookup: RoleLookup::Resolved(role),
        }
    }
}
