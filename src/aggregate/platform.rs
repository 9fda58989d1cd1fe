use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::round1;
use crate::database::models::{AnalyticsSample, Mood, MoodLog, Profile, Role, Routine};

/// Week bucket within the month: days 1-7 are week 1, 8-14 week 2, and so on.
/// Restarts at 1 on the first of every month.
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() + 6) / 7
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRoutines {
    pub week: String,
    pub total: usize,
    pub completed: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineStats {
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
    pub weeks: Vec<WeekRoutines>,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(100.0 * part as f64 / whole as f64)
    }
}

/// Routine completion grouped by the week of month each routine was created in
pub fn routine_stats(routines: &[Routine]) -> RoutineStats {
    let mut buckets: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for routine in routines {
        let entry = buckets.entry(week_of_month(routine.created_at.date_naive())).or_default();
        entry.0 += 1;
        if routine.completed {
            entry.1 += 1;
        }
    }

    let total = routines.len();
    let completed = routines.iter().filter(|r| r.completed).count();

    RoutineStats {
        total,
        completed,
        completion_rate: percent(completed, total),
        weeks: buckets
            .into_iter()
            .map(|(week, (total, completed))| WeekRoutines {
                week: format!("Week {}", week),
                total,
                completed,
                rate: percent(completed, total),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodCount {
    pub mood: Mood,
    pub count: usize,
}

/// Mood label counts, most frequent first
pub fn mood_distribution(moods: &[MoodLog]) -> Vec<MoodCount> {
    let mut counts: BTreeMap<Mood, usize> = BTreeMap::new();
    for log in moods {
        *counts.entry(log.mood).or_default() += 1;
    }

    let mut out: Vec<MoodCount> = counts
        .into_iter()
        .map(|(mood, count)| MoodCount { mood, count })
        .collect();
    // stable sort keeps label order among ties
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekPerformance {
    /// "year/month/week", e.g. "2025/3/2" for the second week of March 2025
    pub week: String,
    pub planned: f64,
    pub completed: f64,
}

/// Average planned and completed hours per sample, bucketed by year, month and week of month
pub fn performance_by_week(samples: &[AnalyticsSample]) -> Vec<WeekPerformance> {
    let mut buckets: BTreeMap<(i32, u32, u32), (f64, f64, usize)> = BTreeMap::new();
    for sample in samples {
        let key = (sample.date.year(), sample.date.month(), week_of_month(sample.date));
        let entry = buckets.entry(key).or_default();
        entry.0 += sample.planned_hours;
        entry.1 += sample.completed_hours;
        entry.2 += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month, week), (planned, completed, count))| WeekPerformance {
            week: format!("{}/{}/{}", year, month, week),
            planned: round1(planned / count as f64),
            completed: round1(completed / count as f64),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub user: usize,
    pub psychiatrist: usize,
    pub admin: usize,
    pub total: usize,
}

pub fn role_counts(profiles: &[Profile]) -> RoleCounts {
    profiles.iter().fold(RoleCounts::default(), |mut acc, profile| {
        match profile.role {
            Role::User => acc.user += 1,
            Role::Psychiatrist => acc.psychiatrist += 1,
            Role::Admin => acc.admin += 1,
        }
        acc.total += 1;
        acc
    })
}

/// Everything the admin analytics page shows
#[derive(Debug, Clone, Serialize)]
pub struct PlatformAnalytics {
    pub routines: RoutineStats,
    pub total_mood_logs: usize,
    pub moods: Vec<MoodCount>,
    pub performance: Vec<WeekPerformance>,
}

impl PlatformAnalytics {
    pub fn build(routines: &[Routine], moods: &[MoodLog], samples: &[AnalyticsSample]) -> Self {
        Self {
            routines: routine_stats(routines),
            total_mood_logs: moods.len(),
            moods: mood_distribution(moods),
            performance: performance_by_week(samples),
        }
    }
}
