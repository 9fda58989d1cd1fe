use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use super::degrade_store_errors;
use crate::access::scope::ListOptions;
use crate::access::{gate, AccessError, AccessResult, AuthorizedRepository, Session};
use crate::aggregate::{weekly_progress, DayProgress, PlatformAnalytics};
use crate::database::models::{AnalyticsSample, MoodLog, NewAnalyticsSample, Routine};
use crate::database::Repository;
use crate::filter::FilterData;
use crate::services::ViewInvalidator;
use crate::state::AppState;
use crate::types::Operation;

pub struct AnalyticsService {
    repo: AuthorizedRepository<AnalyticsSample>,
    samples: Repository<AnalyticsSample>,
    routines: Repository<Routine>,
    moods: Repository<MoodLog>,
    views: ViewInvalidator,
    session: Session,
}

impl AnalyticsService {
    pub fn new(state: &AppState, session: Session) -> Self {
        Self {
            repo: AuthorizedRepository::new(state.store.clone(), session.clone()),
            samples: Repository::new(state.store.clone()),
            routines: Repository::new(state.store.clone()),
            moods: Repository::new(state.store.clone()),
            views: state.views.clone(),
            session,
        }
    }

    fn owner(&self, owner: Option<Uuid>) -> Uuid {
        owner.unwrap_or_else(|| self.session.user_id())
    }

    /// Every sample for `owner`, oldest day first
    pub async fn list(&self, owner: Option<Uuid>) -> AccessResult<Vec<AnalyticsSample>> {
        let owner = self.owner(owner);
        degrade_store_errors("analytics chart", self.repo.list(owner, ListOptions::default()).await)
    }

    /// Record the caller's hours for a day, replacing an existing sample for that date
    pub async fn upsert(&self, sample: NewAnalyticsSample) -> AccessResult<AnalyticsSample> {
        sample.validate().map_err(AccessError::Validation)?;

        let changes = json!({
            "planned_hours": sample.planned_hours,
            "completed_hours": sample.completed_hours,
        });
        let updated = self
            .repo
            .update_own_where(json!({ "date": sample.date }), &changes)
            .await?;

        let stored = match updated.into_iter().next() {
            Some(existing) => existing,
            None => self.repo.create(&sample).await?,
        };

        self.views.invalidate("analytics_data", Operation::Update);
        Ok(stored)
    }

    pub async fn weekly(&self, owner: Option<Uuid>) -> AccessResult<Vec<DayProgress>> {
        self.weekly_ending(owner, Utc::now().date_naive()).await
    }

    /// Seven days ending on `today`; an unreadable store yields an all-zero week
    pub async fn weekly_ending(&self, owner: Option<Uuid>, today: NaiveDate) -> AccessResult<Vec<DayProgress>> {
        let owner = self.owner(owner);
        let window = ListOptions::matching(json!({
            "date": { "$between": [today - Duration::days(6), today] }
        }));
        let samples = degrade_store_errors("weekly progress", self.repo.list(owner, window).await)?;
        Ok(weekly_progress(&samples, today))
    }

    /// Platform-wide aggregates for the admin analytics page
    pub async fn platform(&self) -> AccessResult<PlatformAnalytics> {
        gate::require_admin(&self.session)?;

        let (routines, moods, samples) = futures::try_join!(
            self.routines.select_any(FilterData::default()),
            self.moods.select_any(FilterData::default()),
            self.samples.select_any(FilterData::default()),
        )?;
        Ok(PlatformAnalytics::build(&routines, &moods, &samples))
    }
}
