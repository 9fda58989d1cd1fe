use super::{gate, Session};
use crate::database::models::{ReportVisibility, UserReport};

/// Read policy applied on every report read path.
///
/// The patient and the author always see a report. A report shared with the care team is
/// also visible to psychiatrists assigned to the patient and to admins. `assigned` says
/// whether the caller holds an assignment for the report's patient.
pub fn can_read_report(session: &Session, report: &UserReport, assigned: bool) -> bool {
    let caller = session.user_id();
    if report.user_id == caller || report.psychiatrist_id == caller {
        return true;
    }
    match report.visibility {
        ReportVisibility::PatientAndAuthorOnly => false,
        ReportVisibility::SharedWithCareTeam => {
            gate::is_admin(session) || (assigned && gate::is_psychiatrist(session))
        }
    }
}

/// Only the authoring psychiatrist or an admin may edit or remove a report
pub fn can_mutate_report(session: &Session, report: &UserReport) -> bool {
    report.psychiatrist_id == session.user_id() || gate::is_admin(session)
}
