use std::collections::HashSet;

use serde_json::{json, Value};
use uuid::Uuid;

use super::assignments::assigned_patient_ids;
use super::ProfileDirectory;
use crate::access::{can_mutate_report, can_read_report, gate, AccessError, AccessResult, Session};
use crate::database::models::{Assignment, HydratedReport, NewUserReport, Profile, UserReport, UserReportPatch};
use crate::database::Repository;
use crate::filter::FilterData;
use crate::services::ViewInvalidator;
use crate::state::AppState;
use crate::types::Operation;

fn require_text(field: &str, value: &str) -> AccessResult<()> {
    if value.trim().is_empty() {
        return Err(AccessError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub struct ReportService {
    reports: Repository<UserReport>,
    profiles: Repository<Profile>,
    assignments: Repository<Assignment>,
    views: ViewInvalidator,
    session: Session,
}

impl ReportService {
    pub fn new(state: &AppState, session: Session) -> Self {
        Self {
            reports: Repository::new(state.store.clone()),
            profiles: Repository::new(state.store.clone()),
            assignments: Repository::new(state.store.clone()),
            views: state.views.clone(),
            session,
        }
    }

    async fn my_patients(&self) -> AccessResult<HashSet<Uuid>> {
        if !gate::is_psychiatrist(&self.session) {
            return Ok(HashSet::new());
        }
        Ok(assigned_patient_ids(&self.assignments, self.session.user_id()).await?)
    }

    async fn fetch(&self, id: Uuid) -> AccessResult<Option<UserReport>> {
        Ok(self.reports.select_one(FilterData::where_(json!({ "id": id }))).await?)
    }

    /// Keep the reports the caller may read, then attach patient and author names
    async fn readable(&self, reports: Vec<UserReport>) -> AccessResult<Vec<HydratedReport>> {
        let patients = self.my_patients().await?;
        let visible: Vec<UserReport> = reports
            .into_iter()
            .filter(|r| can_read_report(&self.session, r, patients.contains(&r.user_id)))
            .collect();
        self.hydrate(visible).await
    }

    async fn hydrate(&self, reports: Vec<UserReport>) -> AccessResult<Vec<HydratedReport>> {
        if reports.is_empty() {
            return Ok(vec![]);
        }
        let ids = reports.iter().flat_map(|r| [r.user_id, r.psychiatrist_id]);
        let directory = ProfileDirectory::resolve(&self.profiles, ids).await?;

        Ok(reports
            .into_iter()
            .map(|r| {
                let patient = directory.get(&r.user_id);
                let author = directory.get(&r.psychiatrist_id);
                HydratedReport::new(r, patient, author)
            })
            .collect())
    }

    async fn select(&self, where_clause: Option<Value>) -> AccessResult<Vec<UserReport>> {
        let filter = FilterData {
            where_clause,
            ..Default::default()
        };
        Ok(self.reports.select_any(filter).await?)
    }

    /// Write a report about one of the caller's assigned patients
    pub async fn create(&self, new: NewUserReport) -> AccessResult<HydratedReport> {
        gate::require_psychiatrist(&self.session)?;
        require_text("title", &new.title)?;
        require_text("content", &new.content)?;

        let author = self.session.user_id();
        if !crate::access::scope::is_assigned(&self.assignments, author, new.user_id).await? {
            return Err(AccessError::unauthorized("Patient is not assigned to you"));
        }

        let mut row = crate::database::repository::to_row(&new)?;
        row.insert("psychiatrist_id".to_string(), json!(author));
        let report = self.reports.insert(&row).await?;

        tracing::info!("Psychiatrist {} wrote report {} for {}", author, report.id, report.user_id);
        self.views.invalidate("user_reports", Operation::Create);
        let mut hydrated = self.hydrate(vec![report]).await?;
        hydrated.pop().ok_or_else(|| AccessError::not_found("Report not found"))
    }

    pub async fn update(&self, id: Uuid, patch: UserReportPatch) -> AccessResult<HydratedReport> {
        gate::require_psychiatrist(&self.session)?;
        if let Some(ref title) = patch.title {
            require_text("title", title)?;
        }
        if let Some(ref content) = patch.content {
            require_text("content", content)?;
        }

        let existing = self.fetch(id).await?.ok_or_else(|| AccessError::not_found("Report not found"))?;
        if !can_mutate_report(&self.session, &existing) {
            return Err(AccessError::unauthorized("Only the author or an admin may edit this report"));
        }

        let report = self.reports.update_404(id, &patch).await?;
        self.views.invalidate("user_reports", Operation::Update);
        let mut hydrated = self.hydrate(vec![report]).await?;
        hydrated.pop().ok_or_else(|| AccessError::not_found("Report not found"))
    }

    /// Remove a report. Deleting an id that no longer exists removes nothing.
    pub async fn delete(&self, id: Uuid) -> AccessResult<u64> {
        gate::require_psychiatrist(&self.session)?;
        let Some(existing) = self.fetch(id).await? else {
            return Ok(0);
        };
        if !can_mutate_report(&self.session, &existing) {
            return Err(AccessError::unauthorized("Only the author or an admin may delete this report"));
        }

        let removed = self.reports.delete(id).await?;
        self.views.invalidate("user_reports", Operation::Delete);
        Ok(removed)
    }

    /// Reports about `user_id` (the caller when `None`) that the caller may read
    pub async fn for_user(&self, user_id: Option<Uuid>) -> AccessResult<Vec<HydratedReport>> {
        let user_id = user_id.unwrap_or_else(|| self.session.user_id());
        let reports = self.select(Some(json!({ "user_id": user_id }))).await?;
        self.readable(reports).await
    }

    /// Reports the calling psychiatrist authored
    pub async fn by_psychiatrist(&self) -> AccessResult<Vec<HydratedReport>> {
        gate::require_psychiatrist(&self.session)?;
        let reports = self
            .select(Some(json!({ "psychiatrist_id": self.session.user_id() })))
            .await?;
        self.readable(reports).await
    }

    pub async fn all(&self) -> AccessResult<Vec<HydratedReport>> {
        gate::require_admin(&self.session)?;
        let reports = self.select(None).await?;
        self.readable(reports).await
    }

    pub async fn by_id(&self, id: Uuid) -> AccessResult<HydratedReport> {
        let report = self.fetch(id).await?.ok_or_else(|| AccessError::not_found("Report not found"))?;
        let assigned = gate::is_psychiatrist(&self.session)
            && crate::access::scope::is_assigned(&self.assignments, self.session.user_id(), report.user_id).await?;
        if !can_read_report(&self.session, &report, assigned) {
            return Err(AccessError::unauthorized("Not allowed to read this report"));
        }
        let mut hydrated = self.hydrate(vec![report]).await?;
        hydrated.pop().ok_or_else(|| AccessError::not_found("Report not found"))
    }

    /// Raw reports about `user_id` visible to the caller, for aggregation
    pub(crate) async fn readable_raw(&self, user_id: Uuid) -> AccessResult<Vec<UserReport>> {
        let patients = self.my_patients().await?;
        Ok(self
            .select(Some(json!({ "user_id": user_id })))
            .await?
            .into_iter()
            .filter(|r| can_read_report(&self.session, r, patients.contains(&r.user_id)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;
    use crate::testing::TestContext;
    use chrono::NaiveDate;

    fn report_for(patient: Uuid, title: &str, is_private: bool) -> NewUserReport {
        NewUserReport {
            user_id: patient,
            title: title.to_string(),
            content: "Discussed sleep and routines.".to_string(),
            session_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            diagnosis: None,
            recommendations: Some("Keep a journal".to_string()),
            follow_up_date: None,
            is_private,
        }
    }

    #[tokio::test]
    async fn author_sees_own_reports_with_patient_names() {
        let ctx = TestContext::new();
        let p = ctx.seed_profile(Role::Psychiatrist, "Paula").await;
        let q = ctx.seed_profile(Role::Psychiatrist, "Quinn").await;
        let a = ctx.seed_profile(Role::User, "Alex").await;
        let b = ctx.seed_profile(Role::User, "Blair").await;
        ctx.assign(&p, &a).await;

        let as_p = ReportService::new(&ctx.state, ctx.session(&p).await);
        as_p.create(report_for(a.id, "Intake", true)).await.unwrap();
        as_p.create(report_for(a.id, "Follow-up", false)).await.unwrap();
        let err = as_p.create(report_for(b.id, "Nope", true)).await.unwrap_err();
        assert!(matches!(err, AccessError::Unauthorized(_)));

        let mine = as_p.by_psychiatrist().await.unwrap();
        assert_eq!(mine.len(), 2);
        for r in &mine {
            assert_eq!(r.user_name.as_deref(), Some("Alex"));
            assert_eq!(r.user_email.as_deref(), Some("alex@example.com"));
            assert_eq!(r.psychiatrist_name.as_deref(), Some("Paula"));
        }

        let as_q = ReportService::new(&ctx.state, ctx.session(&q).await);
        assert!(as_q.by_psychiatrist().await.unwrap().is_empty());
        assert!(as_q.for_user(Some(a.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn patient_reads_private_reports_about_them() {
        let ctx = TestContext::new();
        let p = ctx.seed_profile(Role::Psychiatrist, "Paula").await;
        let a = ctx.seed_profile(Role::User, "Alex").await;
        ctx.assign(&p, &a).await;
        let created = ReportService::new(&ctx.state, ctx.session(&p).await)
            .create(report_for(a.id, "Intake", true))
            .await
            .unwrap();

        let as_a = ReportService::new(&ctx.state, ctx.session(&a).await);
        assert_eq!(as_a.for_user(None).await.unwrap().len(), 1);
        assert_eq!(as_a.by_id(created.report.id).await.unwrap().report.title, "Intake");
    }

    #[tokio::test]
    async fn only_author_or_admin_mutates() {
        let ctx = TestContext::new();
        let p = ctx.seed_profile(Role::Psychiatrist, "Paula").await;
        let q = ctx.seed_profile(Role::Psychiatrist, "Quinn").await;
        let admin = ctx.seed_profile(Role::Admin, "Ada").await;
        let a = ctx.seed_profile(Role::User, "Alex").await;
        ctx.assign(&p, &a).await;
        ctx.assign(&q, &a).await;

        let report = ReportService::new(&ctx.state, ctx.session(&p).await)
            .create(report_for(a.id, "Intake", false))
            .await
            .unwrap()
            .report;

        let as_q = ReportService::new(&ctx.state, ctx.session(&q).await);
        // shared with the care team, so Q can read but not edit
        assert!(as_q.by_id(report.id).await.is_ok());
        let patch = UserReportPatch { title: Some("Edited".to_string()), ..Default::default() };
        assert!(matches!(as_q.update(report.id, patch.clone()).await, Err(AccessError::Unauthorized(_))));

        let as_admin = ReportService::new(&ctx.state, ctx.session(&admin).await);
        let edited = as_admin.update(report.id, patch).await.unwrap();
        assert_eq!(edited.report.title, "Edited");
        assert_eq!(as_admin.all().await.unwrap().len(), 1);

        assert_eq!(as_admin.delete(report.id).await.unwrap(), 1);
        assert_eq!(as_admin.delete(report.id).await.unwrap(), 0);
        assert!(matches!(
            as_admin.update(report.id, UserReportPatch::default()).await,
            Err(AccessError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn hydration_tolerates_deleted_profiles() {
        let ctx = TestContext::new();
        let p = ctx.seed_profile(Role::Psychiatrist, "Paula").await;
        let a = ctx.seed_profile(Role::User, "Alex").await;
        ctx.assign(&p, &a).await;
        let service = ReportService::new(&ctx.state, ctx.session(&p).await);
        service.create(report_for(a.id, "Intake", true)).await.unwrap();

        Repository::<Profile>::new(ctx.state.store.clone()).delete(a.id).await.unwrap();
        let reports = service.by_psychiatrist().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].user_name, None);
        assert_eq!(reports[0].psychiatrist_name.as_deref(), Some("Paula"));
    }
}
