use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{AnalyticsSample, MoodLog, Profile, Routine, UserReport};

/// Whole-number percentage of planned hours that were completed. Zero when nothing was planned.
pub fn productivity_rate(planned_hours: f64, completed_hours: f64) -> i64 {
    if planned_hours <= 0.0 {
        return 0;
    }
    (100.0 * completed_hours / planned_hours).round().max(0.0) as i64
}

/// Activity summary for one patient, as shown to their psychiatrist
#[derive(Debug, Clone, Serialize)]
pub struct PatientDetail {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_routines: usize,
    pub completed_routines: usize,
    pub total_mood_logs: i64,
    pub recent_moods: Vec<MoodLog>,
    pub total_planned_hours: f64,
    pub total_completed_hours: f64,
    pub productivity_rate: i64,
    pub total_reports: usize,
    pub last_session_date: Option<NaiveDate>,
}

impl PatientDetail {
    /// `recent_moods` is expected newest first; `total_mood_logs` is the full count
    pub fn build(
        profile: &Profile,
        routines: &[Routine],
        total_mood_logs: i64,
        recent_moods: Vec<MoodLog>,
        samples: &[AnalyticsSample],
        reports: &[UserReport],
    ) -> Self {
        let total_planned_hours: f64 = samples.iter().map(|s| s.planned_hours).sum();
        let total_completed_hours: f64 = samples.iter().map(|s| s.completed_hours).sum();

        Self {
            id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            created_at: profile.created_at,
            total_routines: routines.len(),
            completed_routines: routines.iter().filter(|r| r.completed).count(),
            total_mood_logs,
            recent_moods,
            total_planned_hours,
            total_completed_hours,
            productivity_rate: productivity_rate(total_planned_hours, total_completed_hours),
            total_reports: reports.len(),
            last_session_date: reports.iter().map(|r| r.session_date).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ReportVisibility, Role};

    fn sample(planned: f64, completed: f64) -> AnalyticsSample {
        AnalyticsSample {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            planned_hours: planned,
            completed_hours: completed,
            created_at: Utc::now(),
        }
    }

    fn report_on(day: u32) -> UserReport {
        UserReport {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            psychiatrist_id: Uuid::new_v4(),
            title: "Follow-up".to_string(),
            content: "".to_string(),
            session_date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            diagnosis: None,
            recommendations: None,
            follow_up_date: None,
            visibility: ReportVisibility::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn productivity_is_zero_without_plan() {
        assert_eq!(productivity_rate(0.0, 0.0), 0);
        assert_eq!(productivity_rate(0.0, 12.5), 0);
    }

    #[test]
    fn productivity_rounds_to_whole_percent() {
        assert_eq!(productivity_rate(3.0, 2.0), 67);
        assert_eq!(productivity_rate(8.0, 10.0), 125);
    }

    #[test]
    fn detail_sums_hours_and_finds_last_session() {
        let profile = Profile {
            id: Uuid::nil(),
            email: "p@example.com".to_string(),
            full_name: Some("Pat".to_string()),
            role: Role::User,
            created_at: Utc::now(),
        };
        let samples = vec![sample(4.0, 3.0), sample(4.0, 1.0)];
        let reports = vec![report_on(3), report_on(17), report_on(9)];

        let detail = PatientDetail::build(&profile, &[], 0, vec![], &samples, &reports);
        assert_eq!(detail.total_planned_hours, 8.0);
        assert_eq!(detail.productivity_rate, 50);
        assert_eq!(detail.total_reports, 3);
        assert_eq!(detail.last_session_date, NaiveDate::from_ymd_opt(2025, 5, 17));

        let empty = PatientDetail::build(&profile, &[], 0, vec![], &[], &[]);
        assert_eq!(empty.productivity_rate, 0);
        assert_eq!(empty.last_session_date, None);
    }
}
