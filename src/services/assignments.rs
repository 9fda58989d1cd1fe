use std::collections::HashSet;

use serde_json::json;
use uuid::Uuid;

use crate::access::{gate, AccessError, AccessResult, Session};
use crate::database::models::{Assignment, Profile, Role};
use crate::database::{DatabaseError, Repository};
use crate::filter::FilterData;
use crate::services::ViewInvalidator;
use crate::state::AppState;
use crate::types::Operation;

/// Patient ids assigned to `psychiatrist_id`
pub async fn assigned_patient_ids(
    assignments: &Repository<Assignment>,
    psychiatrist_id: Uuid,
) -> Result<HashSet<Uuid>, DatabaseError> {
    let rows = assignments
        .select_any(FilterData::where_(json!({ "psychiatrist_id": psychiatrist_id })))
        .await?;
    Ok(rows.into_iter().map(|a| a.patient_id).collect())
}

pub struct AssignmentService {
    assignments: Repository<Assignment>,
    profiles: Repository<Profile>,
    views: ViewInvalidator,
    session: Session,
}

impl AssignmentService {
    pub fn new(state: &AppState, session: Session) -> Self {
        Self {
            assignments: Repository::new(state.store.clone()),
            profiles: Repository::new(state.store.clone()),
            views: state.views.clone(),
            session,
        }
    }

    /// Profiles of the caller's patients ordered by name. No assignments is an empty list.
    pub async fn list_assigned_patients(&self) -> AccessResult<Vec<Profile>> {
        gate::require_psychiatrist(&self.session)?;

        let ids: Vec<Uuid> = assigned_patient_ids(&self.assignments, self.session.user_id())
            .await?
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let filter = FilterData::where_(json!({ "id": { "$in": ids } })).order_by("full_name asc, id asc");
        Ok(self.profiles.select_any(filter).await?)
    }

    pub async fn is_assigned_to_me(&self, patient_id: Uuid) -> AccessResult<bool> {
        Ok(crate::access::scope::is_assigned(&self.assignments, self.session.user_id(), patient_id).await?)
    }

    /// Admin view of assignment rows, optionally for one psychiatrist
    pub async fn list(&self, psychiatrist_id: Option<Uuid>) -> AccessResult<Vec<Assignment>> {
        gate::require_admin(&self.session)?;
        let filter = match psychiatrist_id {
            Some(id) => FilterData::where_(json!({ "psychiatrist_id": id })),
            None => FilterData::default(),
        };
        Ok(self.assignments.select_any(filter).await?)
    }

    /// Link a patient to a psychiatrist. Assigning an existing pair returns the existing row.
    pub async fn assign(&self, psychiatrist_id: Uuid, patient_id: Uuid) -> AccessResult<Assignment> {
        gate::require_admin(&self.session)?;
        if psychiatrist_id == patient_id {
            return Err(AccessError::validation("A psychiatrist cannot be their own patient"));
        }

        let psychiatrist = self
            .profiles
            .select_one(FilterData::where_(json!({ "id": psychiatrist_id })))
            .await?
            .ok_or_else(|| AccessError::not_found("Psychiatrist profile not found"))?;
        if !matches!(psychiatrist.role, Role::Psychiatrist | Role::Admin) {
            return Err(AccessError::validation(format!(
                "User {} is not a psychiatrist",
                psychiatrist_id
            )));
        }
        self.profiles
            .select_404(FilterData::where_(json!({ "id": patient_id })))
            .await?;

        let pair = json!({ "psychiatrist_id": psychiatrist_id, "patient_id": patient_id });
        if let Some(existing) = self.assignments.select_one(FilterData::where_(pair.clone())).await? {
            return Ok(existing);
        }

        let created = self.assignments.insert(&pair).await?;
        tracing::info!("Assigned patient {} to psychiatrist {}", patient_id, psychiatrist_id);
        self.views.invalidate("psychiatrist_patients", Operation::Create);
        Ok(created)
    }

    pub async fn unassign(&self, psychiatrist_id: Uuid, patient_id: Uuid) -> AccessResult<u64> {
        gate::require_admin(&self.session)?;
        let removed = self
            .assignments
            .delete_where(json!({ "psychiatrist_id": psychiatrist_id, "patient_id": patient_id }))
            .await?;
        if removed > 0 {
            tracing::info!("Unassigned patient {} from psychiatrist {}", patient_id, psychiatrist_id);
            self.views.invalidate("psychiatrist_patients", Operation::Delete);
        }
        Ok(removed)
    }
}
