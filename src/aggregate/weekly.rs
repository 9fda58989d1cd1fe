use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::database::models::AnalyticsSample;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayProgress {
    pub date: NaiveDate,
    /// Short weekday name, "Mon" through "Sun"
    pub day: &'static str,
    pub planned: f64,
    pub completed: f64,
    pub recorded: bool,
}

fn short_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// One entry per day for the seven days ending on `today`, oldest first.
/// Days without a sample come back as zeros with `recorded == false`.
pub fn weekly_progress(samples: &[AnalyticsSample], today: NaiveDate) -> Vec<DayProgress> {
    let by_date: HashMap<NaiveDate, &AnalyticsSample> = samples.iter().map(|s| (s.date, s)).collect();

    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let sample = by_date.get(&date);
            DayProgress {
                date,
                day: short_name(date.weekday()),
                planned: sample.map(|s| s.planned_hours).unwrap_or(0.0),
                completed: sample.map(|s| s.completed_hours).unwrap_or(0.0),
                recorded: sample.is_some(),
            }
        })
        .collect()
}
