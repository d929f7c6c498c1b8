use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::activity::{Activity, CalendarFields, activity, rounds_in};
use crate::catalog::FeatureCatalog;
use crate::error::Result;
use crate::features::{
    CALENDAR_FIELDS, CalendarField, FeatureKind, FeatureRow, FeatureSchema, FeatureTable,
    RatingField,
};
use crate::fight_table::{Corner, FightRecord, FightTable};
use crate::glicko::Glicko2Params;
use crate::history::HistoryIndex;
use crate::outcomes::StreakAndOutcomeTracker;
use crate::ratings::{RatingEngine, RatingRow};
use crate::stats::WindowedStatAggregator;

/// Computes one feature row from prior fights only.
pub struct Featurizer<'i, 't> {
    index: &'i HistoryIndex<'t>,
    stats: WindowedStatAggregator<'i, 't>,
    outcomes: StreakAndOutcomeTracker<'i, 't>,
    catalog: &'i FeatureCatalog,
}

impl<'i, 't> Featurizer<'i, 't> {
    pub fn new(index: &'i HistoryIndex<'t>, catalog: &'i FeatureCatalog) -> Self {
        Self {
            index,
            stats: WindowedStatAggregator::new(index),
            outcomes: StreakAndOutcomeTracker::new(index),
            catalog,
        }
    }

    pub fn corner_value(
        &self,
        kind: &FeatureKind,
        fight: &FightRecord,
        corner: Corner,
        rating: &RatingRow,
    ) -> f64 {
        let fighter = fight.fighter(corner);
        let opponent = fight.fighter(corner.opponent());
        let as_of = fight.index;
        match *kind {
            FeatureKind::Rating(field) => {
                let state = rating.get(corner);
                match field {
                    RatingField::Rating => state.rating,
                    RatingField::Deviation => state.deviation,
                    RatingField::Volatility => state.volatility,
                }
            }
            FeatureKind::Stat { spec, window } => self.stats.aggregate(&spec, fighter, as_of, window),
            FeatureKind::WinStreak(window) => {
                self.outcomes.streak(fighter, as_of, window).wins() as f64
            }
            FeatureKind::LossStreak(window) => {
                self.outcomes.streak(fighter, as_of, window).losses() as f64
            }
            FeatureKind::Wins(window) => self.outcomes.win_loss(fighter, as_of, window).wins as f64,
            FeatureKind::Losses(window) => {
                self.outcomes.win_loss(fighter, as_of, window).losses as f64
            }
            FeatureKind::HeadToHeadWins => {
                self.outcomes.head_to_head(fighter, opponent, as_of).wins as f64
            }
            FeatureKind::Record { kind, window } => match kind.query(fight) {
                Some(query) => self.outcomes.record(fighter, as_of, window, &query) as f64,
                None => 0.0,
            },
            FeatureKind::RecentFights => self.activity(fighter, as_of).recent_fights as f64,
            FeatureKind::WeeksInactive => self.activity(fighter, as_of).weeks_inactive,
            FeatureKind::RoundsFought(window) => {
                rounds_in(self.index.window(fighter, as_of, window)) as f64
            }
        }
    }

    fn activity(&self, fighter: &str, as_of: usize) -> Activity {
        activity(
            self.index,
            fighter,
            as_of,
            self.catalog.recent,
            self.catalog.last_year,
        )
    }

    /// Values in [`FeatureSchema`] column order.
    pub fn featurize(&self, fight: &FightRecord, rating: &RatingRow) -> FeatureRow {
        let calendar = CalendarFields::of(fight.date);
        let mut values = Vec::with_capacity(CALENDAR_FIELDS.len() + self.catalog.kinds.len() * 4);
        for field in CALENDAR_FIELDS {
            values.push(match field {
                CalendarField::Year => f64::from(calendar.year),
                CalendarField::DaySin => calendar.day_sin,
                CalendarField::DayCos => calendar.day_cos,
            });
        }
        for kind in &self.catalog.kinds {
            let a = self.corner_value(kind, fight, Corner::A, rating);
            let b = self.corner_value(kind, fight, Corner::B, rating);
            let diff_a = a - b;
            values.extend([a, b, diff_a, -diff_a]);
        }
        FeatureRow {
            index: fight.index,
            fight_id: fight.fight_id.clone(),
            values,
        }
    }
}

fn build_pool(threads: Option<usize>) -> Option<rayon::ThreadPool> {
    let threads = threads?;
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .ok()
}

fn with_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

/// Ratings in one forward pass, then every other family per row in parallel.
pub fn build_features(
    table: &FightTable,
    catalog: &FeatureCatalog,
    params: Glicko2Params,
    threads: Option<usize>,
) -> Result<FeatureTable> {
    let started = Instant::now();
    let ratings = RatingEngine::run(table, params)?;

    let index = HistoryIndex::build(table);
    debug!(fighters = index.fighter_count(), "history index built");
    let featurizer = Featurizer::new(&index, catalog);
    let schema = FeatureSchema::new(catalog.kinds.clone());

    let pool = build_pool(threads);
    let rows: Vec<FeatureRow> = with_pool(&pool, || {
        table
            .records()
            .par_iter()
            .zip(ratings.par_iter())
            .map(|(fight, rating)| featurizer.featurize(fight, rating))
            .collect()
    });

    info!(
        rows = rows.len(),
        columns = schema.len(),
        fighters = index.fighter_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "features computed"
    );
    Ok(FeatureTable::new(schema, rows))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::PipelineConfig;
    use crate::features::FeatureKey;
    use crate::history::Window;

    #[test]
    fn rows_align_with_the_fight_table() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        let table = FightTable::new(vec![
            FightRecord::new("a", d(1), "x", "y", Some("x"), "Decision", 3, "5:00"),
            FightRecord::new("b", d(2), "y", "z", Some("z"), "KO/TKO", 1, "0:45"),
            FightRecord::new("c", d(3), "x", "z", Some("x"), "Submission", 2, "4:10"),
        ])
        .unwrap();
        let config = PipelineConfig::default();
        let catalog = FeatureCatalog::standard(&config);
        let features =
            build_features(&table, &catalog, Glicko2Params::default(), Some(2)).unwrap();
        assert_eq!(features.len(), 3);
        let ids: Vec<&str> = features.rows().iter().map(|r| r.fight_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let wins = FeatureKey::value(Corner::A, FeatureKind::Wins(Window::AllTime));
        assert_eq!(features.value(2, &wins), Some(1.0));
        let streak = FeatureKey::value(Corner::B, FeatureKind::WinStreak(Window::AllTime));
        assert_eq!(features.value(2, &streak), Some(1.0));
    }
}
