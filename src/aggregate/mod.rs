//! Derived summaries. Nothing here is persisted; every figure is recomputed from current rows.

pub mod patient;
pub mod platform;
pub mod weekly;

pub use patient::{productivity_rate, PatientDetail};
pub use platform::{
    mood_distribution, performance_by_week, role_counts, routine_stats, week_of_month, MoodCount,
    PlatformAnalytics, RoleCounts, RoutineStats, WeekPerformance, WeekRoutines,
};
pub use weekly::{weekly_progress, DayProgress};

/// Round to one decimal place for display
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
