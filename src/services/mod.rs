//! Per-request operations. Each service is built from the shared [`AppState`](crate::state::AppState)
//! and the caller's [`Session`](crate::access::Session), gates on role, and announces view
//! invalidations after mutations.

pub mod analytics;
pub mod assignments;
pub mod invalidation;
pub mod library;
pub mod moods;
pub mod patients;
pub mod profiles;
pub mod reports;
pub mod routines;

pub use analytics::AnalyticsService;
pub use assignments::AssignmentService;
pub use invalidation::{ViewEvent, ViewInvalidator};
pub use library::LibraryService;
pub use moods::MoodService;
pub use patients::PatientService;
pub use profiles::{ProfileDirectory, ProfileService, WhoAmI};
pub use reports::ReportService;
pub use routines::RoutineService;

use crate::access::{AccessError, AccessResult};

/// Dashboard reads show an empty state instead of failing when the store hiccups.
/// Authorization failures still propagate.
pub(crate) fn degrade_store_errors<T: Default>(widget: &str, result: AccessResult<T>) -> AccessResult<T> {
    match result {
        Err(AccessError::Store(e)) => {
            tracing::warn!("Serving empty {} after store failure: {}", widget, e);
            Ok(T::default())
        }
        other => other,
    }
}
