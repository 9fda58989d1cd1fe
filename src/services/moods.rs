use uuid::Uuid;

use super::degrade_store_errors;
use crate::access::scope::ListOptions;
use crate::access::{AccessResult, AuthorizedRepository, Session};
use crate::config;
use crate::database::models::{MoodLog, NewMoodLog};
use crate::services::ViewInvalidator;
use crate::state::AppState;
use crate::types::Operation;

pub struct MoodService {
    repo: AuthorizedRepository<MoodLog>,
    views: ViewInvalidator,
}

impl MoodService {
    pub fn new(state: &AppState, session: Session) -> Self {
        Self {
            repo: AuthorizedRepository::new(state.store.clone(), session),
            views: state.views.clone(),
        }
    }

    pub async fn create(&self, new: NewMoodLog) -> AccessResult<MoodLog> {
        let log = self.repo.create(&new.normalized()).await?;
        self.views.invalidate("mood_logs", Operation::Create);
        Ok(log)
    }

    /// Most recent entries first. `limit` defaults to the configured feed size.
    pub async fn list(&self, owner: Option<Uuid>, limit: Option<i32>) -> AccessResult<Vec<MoodLog>> {
        let owner = owner.unwrap_or_else(|| self.repo.session().user_id());
        let limit = limit.unwrap_or(config::config().api.mood_feed_limit).max(1);
        degrade_store_errors("mood feed", self.repo.list(owner, ListOptions::limit(limit)).await)
    }
}
