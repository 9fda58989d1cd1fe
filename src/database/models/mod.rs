pub mod analytics;
pub mod assignment;
pub mod mood_log;
pub mod profile;
pub mod psychology_report;
pub mod routine;
pub mod user_report;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::types::Table;

pub use analytics::{AnalyticsSample, NewAnalyticsSample};
pub use assignment::Assignment;
pub use mood_log::{Mood, MoodLog, NewMoodLog};
pub use profile::{Profile, ProfileSummary, Role};
pub use psychology_report::PsychologyReport;
pub use routine::{NewRoutine, Routine, RoutinePatch};
pub use user_report::{HydratedReport, NewUserReport, ReportVisibility, UserReport, UserReportPatch};

/// A persisted row type bound to its table
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static Table;

    /// Order used when a listing does not ask for one
    const DEFAULT_ORDER: &'static str;
}

/// Entities with exactly one owning user
pub trait Owned: Entity {
    fn owner_id(&self) -> Uuid;
}

/// Deserializer for clearable patch fields. A missing field stays `None` (via `default`),
/// an explicit `null` becomes `Some(None)` and a value becomes `Some(Some(value))`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
