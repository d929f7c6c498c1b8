use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::history::{History, HistoryIndex};

const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Activity {
    pub recent_fights: usize,
    pub weeks_inactive: f64,
    pub rounds_alltime: usize,
    pub rounds_last_year: usize,
}

/// Workload and layoff for `fighter_id` going into row `as_of`.
pub fn activity(
    index: &HistoryIndex<'_>,
    fighter_id: &str,
    as_of: usize,
    recent: TimeDelta,
    last_year: TimeDelta,
) -> Activity {
    let Some(anchor) = index.anchor_date(as_of) else {
        return Activity::default();
    };
    let prior = index.prior_fights(fighter_id, as_of);
    let weeks_inactive = prior
        .last()
        .map(|prev| ((anchor - prev.date).num_days() / 7) as f64)
        .unwrap_or(0.0);
    Activity {
        recent_fights: prior.since(anchor - recent).len(),
        weeks_inactive,
        rounds_alltime: rounds_in(prior),
        rounds_last_year: rounds_in(prior.since(anchor - last_year)),
    }
}

pub fn rounds_in(fights: History<'_>) -> usize {
    fights.iter().map(|f| usize::from(f.outcome_round)).sum()
}

/// Date fields of the fight itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarFields {
    pub year: i32,
    pub day_sin: f64,
    pub day_cos: f64,
}

impl CalendarFields {
    pub fn of(date: NaiveDate) -> Self {
        let angle = 2.0 * PI * f64::from(date.ordinal()) / DAYS_PER_YEAR;
        Self {
            year: date.year(),
            day_sin: angle.sin(),
            day_cos: angle.cos(),
        }
    }
}
