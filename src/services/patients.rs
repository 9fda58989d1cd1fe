use serde_json::json;
use uuid::Uuid;

use super::{AssignmentService, ReportService};
use crate::access::scope::ListOptions;
use crate::access::{gate, AccessError, AccessResult, AuthorizedRepository, Session};
use crate::aggregate::PatientDetail;
use crate::config;
use crate::database::models::{AnalyticsSample, MoodLog, Profile, Routine};
use crate::database::Repository;
use crate::filter::FilterData;
use crate::state::AppState;

/// Psychiatrist-facing summaries of assigned patients
pub struct PatientService {
    session: Session,
    profiles: Repository<Profile>,
    routines: AuthorizedRepository<Routine>,
    moods: AuthorizedRepository<MoodLog>,
    samples: AuthorizedRepository<AnalyticsSample>,
    reports: ReportService,
    assignments: AssignmentService,
}

impl PatientService {
    pub fn new(state: &AppState, session: Session) -> Self {
        Self {
            profiles: Repository::new(state.store.clone()),
            routines: AuthorizedRepository::new(state.store.clone(), session.clone()),
            moods: AuthorizedRepository::new(state.store.clone(), session.clone()),
            samples: AuthorizedRepository::new(state.store.clone(), session.clone()),
            reports: ReportService::new(state, session.clone()),
            assignments: AssignmentService::new(state, session.clone()),
            session,
        }
    }

    pub async fn detail(&self, patient_id: Uuid) -> AccessResult<PatientDetail> {
        gate::require_psychiatrist(&self.session)?;
        if !self.assignments.is_assigned_to_me(patient_id).await? {
            return Err(AccessError::unauthorized("Patient is not assigned to you"));
        }

        let profile = self
            .profiles
            .select_404(FilterData::where_(json!({ "id": patient_id })))
            .await?;
        self.build(&profile).await
    }

    async fn build(&self, profile: &Profile) -> AccessResult<PatientDetail> {
        let recent = ListOptions::limit(config::config().api.patient_recent_moods);
        let (routines, total_moods, recent_moods, samples, reports) = futures::try_join!(
            self.routines.list(profile.id, ListOptions::default()),
            self.moods.count(profile.id),
            self.moods.list(profile.id, recent),
            self.samples.list(profile.id, ListOptions::default()),
            self.reports.readable_raw(profile.id),
        )?;

        Ok(PatientDetail::build(
            profile,
            &routines,
            total_moods,
            recent_moods,
            &samples,
            &reports,
        ))
    }

    /// Detail for every assigned patient, in the same order as the patient list
    pub async fn stats(&self) -> AccessResult<Vec<PatientDetail>> {
        let patients = self.assignments.list_assigned_patients().await?;
        futures::future::try_join_all(patients.iter().map(|p| self.build(p))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Mood, NewAnalyticsSample, NewMoodLog, Role};
    use crate::services::{AnalyticsService, MoodService};
    use crate::testing::TestContext;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn detail_requires_assignment() {
        let ctx = TestContext::new();
        let doctor = ctx.seed_profile(Role::Psychiatrist, "Doc").await;
        let patient = ctx.seed_profile(Role::User, "Pat").await;

        let service = PatientService::new(&ctx.state, ctx.session(&doctor).await);
        assert!(matches!(service.detail(patient.id).await, Err(AccessError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn detail_summarizes_patient_activity() {
        let ctx = TestContext::new();
        let doctor = ctx.seed_profile(Role::Psychiatrist, "Doc").await;
        let patient = ctx.seed_profile(Role::User, "Pat").await;
        ctx.assign(&doctor, &patient).await;

        let own = ctx.session(&patient).await;
        let moods = MoodService::new(&ctx.state, own.clone());
        for _ in 0..12 {
            moods.create(NewMoodLog { mood: Mood::Tired, note: None }).await.unwrap();
        }
        AnalyticsService::new(&ctx.state, own)
            .upsert(NewAnalyticsSample {
                date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                planned_hours: 0.0,
                completed_hours: 2.0,
            })
            .await
            .unwrap();

        let detail = PatientService::new(&ctx.state, ctx.session(&doctor).await)
            .detail(patient.id)
            .await
            .unwrap();
        assert_eq!(detail.total_mood_logs, 12);
        assert_eq!(detail.recent_moods.len(), 10);
        assert_eq!(detail.total_completed_hours, 2.0);
        assert_eq!(detail.productivity_rate, 0);
        assert_eq!(detail.last_session_date, None);
    }

    #[tokio::test]
    async fn stats_cover_each_assigned_patient() {
        let ctx = TestContext::new();
        let doctor = ctx.seed_profile(Role::Psychiatrist, "Doc").await;
        for name in ["Bo", "Al"] {
            let patient = ctx.seed_profile(Role::User, name).await;
            ctx.assign(&doctor, &patient).await;
        }
        ctx.seed_profile(Role::User, "Unassigned").await;

        let stats = PatientService::new(&ctx.state, ctx.session(&doctor).await)
            .stats()
            .await
            .unwrap();
        let names: Vec<_> = stats.iter().filter_map(|s| s.full_name.as_deref()).collect();
        assert_eq!(names, vec!["Al", "Bo"]);
    }
}
