use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::access::{gate, AccessError, AccessResult, Identity, RoleLookup, Session};
use crate::aggregate::{role_counts, RoleCounts};
use crate::database::models::{Profile, ProfileSummary, Role};
use crate::database::{DatabaseError, Repository};
use crate::filter::FilterData;
use crate::services::ViewInvalidator;
use crate::state::AppState;
use crate::types::Operation;

#[derive(Debug, Clone, Serialize)]
pub struct WhoAmI {
    pub identity: Identity,
    pub role_lookup: RoleLookup,
    pub role: Role,
    pub profile: Option<Profile>,
}

/// Resolve-then-hydrate lookup of profile summaries by id.
///
/// Profiles can disappear between fetching the referencing rows and fetching the profiles.
/// Missing ids are simply absent from the map.
#[derive(Debug, Default)]
pub struct ProfileDirectory {
    entries: HashMap<Uuid, ProfileSummary>,
}

impl ProfileDirectory {
    pub async fn resolve(
        profiles: &Repository<Profile>,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<Self, DatabaseError> {
        let mut ids: Vec<Uuid> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();

        let entries = profiles
            .select_ids(&ids)
            .await?
            .iter()
            .map(|p| (p.id, ProfileSummary::from(p)))
            .collect();
        Ok(Self { entries })
    }

    pub fn get(&self, id: &Uuid) -> Option<&ProfileSummary> {
        self.entries.get(id)
    }
}

pub struct ProfileService {
    profiles: Repository<Profile>,
    views: ViewInvalidator,
    session: Session,
}

impl ProfileService {
    pub fn new(state: &AppState, session: Session) -> Self {
        Self {
            profiles: Repository::new(state.store.clone()),
            views: state.views.clone(),
            session,
        }
    }

    async fn find(&self, id: Uuid) -> AccessResult<Option<Profile>> {
        Ok(self.profiles.select_one(FilterData::where_(json!({ "id": id }))).await?)
    }

    pub async fn whoami(&self) -> AccessResult<WhoAmI> {
        // The session already carries the lookup outcome; a failed re-read just omits the profile
        let profile = match self.find(self.session.user_id()).await {
            Ok(profile) => profile,
            Err(AccessError::Store(e)) => {
                tracing::warn!("Profile read failed for whoami: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(WhoAmI {
            identity: self.session.identity.clone(),
            role_lookup: self.session.role_lookup.clone(),
            role: self.session.effective_role(),
            profile,
        })
    }

    /// Create the caller's profile on first use, or update its display name.
    /// `full_name` of `None` leaves an existing name alone; `Some(None)` or a blank name clears it.
    /// The role of a new profile is always `user`.
    pub async fn upsert_own(&self, full_name: Option<Option<String>>) -> AccessResult<Profile> {
        let supplied = full_name.is_some();
        let full_name = full_name
            .flatten()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let id = self.session.user_id();

        let profile = match self.find(id).await? {
            Some(existing) if !supplied => existing,
            Some(_) => self.profiles.update_404(id, &json!({ "full_name": full_name })).await?,
            None => {
                tracing::info!("Creating profile for user {}", id);
                self.profiles
                    .insert(&json!({
                        "id": id,
                        "email": self.session.identity.email,
                        "full_name": full_name,
                        "role": Role::User,
                        "created_at": Utc::now(),
                    }))
                    .await?
            }
        };

        self.views.invalidate("profiles", Operation::Update);
        Ok(profile)
    }

    pub async fn get_all_users(&self) -> AccessResult<Vec<Profile>> {
        gate::require_admin(&self.session)?;
        Ok(self.profiles.select_any(FilterData::default()).await?)
    }

    pub async fn update_user_role(&self, user_id: Uuid, role: Role) -> AccessResult<Profile> {
        gate::require_admin(&self.session)?;
        let updated = self.profiles.update_404(user_id, &json!({ "role": role })).await?;
        tracing::info!("User {} set role of {} to {}", self.session.user_id(), user_id, role);
        self.views.invalidate("profiles", Operation::Update);
        Ok(updated)
    }

    pub async fn role_counts(&self) -> AccessResult<RoleCounts> {
        gate::require_admin(&self.session)?;
        let profiles = self.profiles.select_any(FilterData::default()).await?;
        Ok(role_counts(&profiles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn non_admin_cannot_list_users() {
        let ctx = TestContext::new();
        let user = ctx.seed_profile(Role::User, "Uma").await;
        let doctor = ctx.seed_profile(Role::Psychiatrist, "Doc").await;

        for session in [ctx.session(&user).await, ctx.session(&doctor).await] {
            let err = ProfileService::new(&ctx.state, session).get_all_users().await.unwrap_err();
            assert!(matches!(err, AccessError::Unauthorized(_)));
        }

        let admin = ctx.seed_profile(Role::Admin, "Ada").await;
        let all = ProfileService::new(&ctx.state, ctx.session(&admin).await)
            .get_all_users()
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn upsert_creates_then_renames() {
        let ctx = TestContext::new();
        let session = ctx.anonymous_session();
        let service = ProfileService::new(&ctx.state, session.clone());

        let created = service.upsert_own(Some(Some("  New Person ".to_string()))).await.unwrap();
        assert_eq!(created.role, Role::User);
        assert_eq!(created.full_name.as_deref(), Some("New Person"));

        let renamed = service.upsert_own(Some(Some("Renamed".to_string()))).await.unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.full_name.as_deref(), Some("Renamed"));

        let untouched = service.upsert_own(None).await.unwrap();
        assert_eq!(untouched.full_name.as_deref(), Some("Renamed"));

        let cleared = service.upsert_own(Some(None)).await.unwrap();
        assert_eq!(cleared.full_name, None);
    }

    #[tokio::test]
    async fn directory_tolerates_missing_profiles() {
        let ctx = TestContext::new();
        let known = ctx.seed_profile(Role::User, "Known").await;
        let directory = ProfileDirectory::resolve(&Repository::new(ctx.state.store.clone()), [known.id, Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(directory.get(&known.id).and_then(|p| p.full_name.as_deref()), Some("Known"));
        assert!(directory.get(&Uuid::new_v4()).is_none());
    }
}
