use chrono::NaiveTime;
use serde_json::json;
use uuid::Uuid;

use super::degrade_store_errors;
use crate::access::scope::ListOptions;
use crate::access::{AccessError, AccessResult, AuthorizedRepository, Session};
use crate::database::models::{NewRoutine, Routine, RoutinePatch};
use crate::services::ViewInvalidator;
use crate::state::AppState;
use crate::types::Operation;

fn validate_time(time: &str) -> AccessResult<()> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| AccessError::validation(format!("time must be HH:MM, got '{}'", time)))
}

fn validate_title(title: &str) -> AccessResult<()> {
    if title.trim().is_empty() {
        return Err(AccessError::validation("title must not be empty"));
    }
    Ok(())
}

pub struct RoutineService {
    repo: AuthorizedRepository<Routine>,
    views: ViewInvalidator,
}

impl RoutineService {
    pub fn new(state: &AppState, session: Session) -> Self {
        Self {
            repo: AuthorizedRepository::new(state.store.clone(), session),
            views: state.views.clone(),
        }
    }

    /// Routines for `owner` (the caller when `None`), earliest time of day first
    pub async fn list(&self, owner: Option<Uuid>) -> AccessResult<Vec<Routine>> {
        let owner = owner.unwrap_or_else(|| self.repo.session().user_id());
        degrade_store_errors("routine list", self.repo.list(owner, ListOptions::default()).await)
    }

    pub async fn create(&self, new: NewRoutine) -> AccessResult<Routine> {
        validate_title(&new.title)?;
        validate_time(&new.time)?;

        let mut row = crate::database::repository::to_row(&new)?;
        row.insert("completed".to_string(), json!(false));
        let routine = self.repo.create(&row).await?;

        tracing::debug!("Created routine {} for user {}", routine.id, routine.user_id);
        self.views.invalidate("routines", Operation::Create);
        Ok(routine)
    }

    pub async fn update(&self, id: Uuid, patch: RoutinePatch) -> AccessResult<Routine> {
        if let Some(ref title) = patch.title {
            validate_title(title)?;
        }
        if let Some(ref time) = patch.time {
            validate_time(time)?;
        }

        let routine = self.repo.update(id, &patch).await?;
        self.views.invalidate("routines", Operation::Update);
        Ok(routine)
    }

    /// Set only the completion flag
    pub async fn toggle(&self, id: Uuid, completed: bool) -> AccessResult<Routine> {
        let routine = self.repo.update(id, &RoutinePatch::completion(completed)).await?;
        self.views.invalidate("routines", Operation::Update);
        Ok(routine)
    }

    pub async fn delete(&self, id: Uuid) -> AccessResult<u64> {
        let removed = self.repo.delete(id).await?;
        if removed > 0 {
            self.views.invalidate("routines", Operation::Delete);
        }
        Ok(removed)
    }
}
