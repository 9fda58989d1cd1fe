use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::access::{Identity, RoleLookup, Session};
use crate::database::models::{Assignment, Profile, Role};
use crate::database::{MemoryStore, Repository};
use crate::state::AppState;

/// Unit-test fixture: application state over a fresh in-memory store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone());
        Self { store, state }
    }

    /// Insert a profile with the given role, named `name`
    pub async fn seed_profile(&self, role: Role, name: &str) -> Profile {
        let id = Uuid::new_v4();
        Repository::<Profile>::new(self.state.store.clone())
            .insert(&json!({
                "id": id,
                "email": format!("{}@example.com", name.to_lowercase()),
                "full_name": name,
                "role": role,
                "created_at": Utc::now(),
            }))
            .await
            .expect("seed profile")
    }

    pub async fn assign(&self, psychiatrist: &Profile, patient: &Profile) {
        Repository::<Assignment>::new(self.state.store.clone())
            .insert(&json!({ "psychiatrist_id": psychiatrist.id, "patient_id": patient.id }))
            .await
            .expect("seed assignment");
    }

    /// Session resolved the same way the middleware does it
    pub async fn session(&self, profile: &Profile) -> Session {
        let identity = Identity {
            id: profile.id,
            email: profile.email.clone(),
        };
        Session::resolve(self.state.store.clone(), identity).await
    }

    /// Signed-in caller that has no profile row yet
    pub fn anonymous_session(&self) -> Session {
        Session {
            identity: Identity {
                id: Uuid::new_v4(),
                email: "newcomer@example.com".to_string(),
            },
            role_lookup: RoleLookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_profiles_resolve_their_role() {
        let ctx = TestContext::new();
        let doc = ctx.seed_profile(Role::Psychiatrist, "Doc").await;
        let session = ctx.session(&doc).await;
        assert_eq!(session.effective_role(), Role::Psychiatrist);
        assert_eq!(session.identity.email, "doc@example.com");
    }
}
