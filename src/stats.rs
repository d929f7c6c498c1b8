//! Windowed rate and percentage statistics over prior fights.

use std::fmt;

use crate::fight_table::{Corner, Counter, FightRecord, RoundScope};
use crate::history::{History, HistoryIndex, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tally {
    Landed,
    Attempted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatKind {
    /// Summed tally over summed minutes in scope.
    PerMinute { counter: Counter, tally: Tally },
    /// Landed over attempted.
    Accuracy { counter: Counter },
    /// Landed of `counter` over landed of `per`.
    PerLanded { counter: Counter, per: Counter },
}

/// Whose counters are summed: the fighter's own, or the opponent's against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Perspective {
    Offense,
    Defense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatSpec {
    pub kind: StatKind,
    pub perspective: Perspective,
    pub scope: RoundScope,
}

impl StatSpec {
    pub fn landed_per_min(counter: Counter, scope: RoundScope) -> Self {
        Self {
            kind: StatKind::PerMinute {
                counter,
                tally: Tally::Landed,
            },
            perspective: Perspective::Offense,
            scope,
        }
    }

    pub fn attempted_per_min(counter: Counter, scope: RoundScope) -> Self {
        Self {
            kind: StatKind::PerMinute {
                counter,
                tally: Tally::Attempted,
            },
            perspective: Perspective::Offense,
            scope,
        }
    }

    pub fn accuracy(counter: Counter, scope: RoundScope) -> Self {
        Self {
            kind: StatKind::Accuracy { counter },
            perspective: Perspective::Offense,
            scope,
        }
    }

    pub fn per_landed(counter: Counter, per: Counter, scope: RoundScope) -> Self {
        Self {
            kind: StatKind::PerLanded { counter, per },
            perspective: Perspective::Offense,
            scope,
        }
    }

    pub fn defense(self) -> Self {
        Self {
            perspective: Perspective::Defense,
            ..self
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self.kind, StatKind::Accuracy { .. })
    }
}

impl fmt::Display for StatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let defense = self.perspective == Perspective::Defense;
        match self.kind {
            StatKind::PerMinute { counter, tally } => {
                let what = match (tally, defense) {
                    (Tally::Landed, false) => "landed",
                    (Tally::Attempted, false) => "att",
                    (Tally::Landed, true) => "absorbed",
                    (Tally::Attempted, true) => "received",
                };
                if counter.is_paired() {
                    write!(f, "{}_{what}_per_min", counter.key())?;
                } else if defense {
                    write!(f, "{}_against_per_min", counter.key())?;
                } else {
                    write!(f, "{}_per_min", counter.key())?;
                }
            }
            StatKind::Accuracy { counter } => {
                let suffix = if defense { "def" } else { "acc" };
                write!(f, "{}_{suffix}", counter.key())?;
            }
            StatKind::PerLanded { counter, per } => {
                write!(f, "{}_per_{}", counter.key(), per.key())?;
                if defense {
                    write!(f, "_against")?;
                }
            }
        }
        match self.scope {
            RoundScope::Round(r) => write!(f, "_r{r}"),
            RoundScope::Overall => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    numerator: f64,
    denominator: f64,
}

/// One stat for both corners of a fight plus the differential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatPair {
    pub a: f64,
    pub b: f64,
    pub diff_a: f64,
    pub diff_b: f64,
}

impl StatPair {
    pub fn from_values(a: f64, b: f64) -> Self {
        let diff_a = a - b;
        Self {
            a,
            b,
            diff_a,
            diff_b: -diff_a,
        }
    }

    pub fn value(&self, corner: Corner) -> f64 {
        match corner {
            Corner::A => self.a,
            Corner::B => self.b,
        }
    }

    pub fn diff(&self, corner: Corner) -> f64 {
        match corner {
            Corner::A => self.diff_a,
            Corner::B => self.diff_b,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindowedStatAggregator<'i, 't> {
    index: &'i HistoryIndex<'t>,
}

impl<'i, 't> WindowedStatAggregator<'i, 't> {
    pub fn new(index: &'i HistoryIndex<'t>) -> Self {
        Self { index }
    }

    pub fn aggregate(&self, spec: &StatSpec, fighter_id: &str, as_of: usize, window: Window) -> f64 {
        let history = self.index.window(fighter_id, as_of, window);
        aggregate_history(spec, fighter_id, history)
    }

    pub fn pair(&self, spec: &StatSpec, fight: &FightRecord, window: Window) -> StatPair {
        let a = self.aggregate(spec, &fight.fighter_a_id, fight.index, window);
        let b = self.aggregate(spec, &fight.fighter_b_id, fight.index, window);
        StatPair::from_values(a, b)
    }
}

/// Reduces an already-resolved history. Empty histories and zero denominators give 0.
pub fn aggregate_history(spec: &StatSpec, fighter_id: &str, history: History<'_>) -> f64 {
    let mut sums = Sums::default();
    for fight in history.iter() {
        let Some(own) = fight.corner_of(fighter_id) else {
            continue;
        };
        let side = match spec.perspective {
            Perspective::Offense => own,
            Perspective::Defense => own.opponent(),
        };
        let line = fight.scoped_stats(side, spec.scope);
        match spec.kind {
            StatKind::PerMinute { counter, tally } => {
                let value = line.get(counter);
                sums.numerator += f64::from(match tally {
                    Tally::Landed => value.landed,
                    Tally::Attempted => value.attempted,
                });
                sums.denominator += fight.minutes_in(spec.scope);
            }
            StatKind::Accuracy { counter } => {
                let value = line.get(counter);
                sums.numerator += f64::from(value.landed);
                sums.denominator += f64::from(value.attempted);
            }
            StatKind::PerLanded { counter, per } => {
                sums.numerator += f64::from(line.get(counter).landed);
                sums.denominator += f64::from(line.get(per).landed);
            }
        }
    }

    if sums.denominator <= 0.0 {
        return 0.0;
    }
    let ratio = sums.numerator / sums.denominator;
    match (spec.kind, spec.perspective) {
        (StatKind::Accuracy { .. }, Perspective::Defense) => 1.0 - ratio,
        _ => ratio,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::fight_table::{Attempts, FightTable, StatLine};

    fn bout(id: &str, day: u32, round: u8, clock: &str) -> FightRecord {
        FightRecord::new(
            id,
            NaiveDate::from_ymd_opt(2019, 3, day).unwrap(),
            "x",
            "y",
            Some("x"),
            "KO/TKO",
            round,
            clock,
        )
    }

    #[test]
    fn display_names_are_stable() {
        let spec = StatSpec::landed_per_min(Counter::SigStrikes, RoundScope::Round(1));
        assert_eq!(spec.to_string(), "sig_str_landed_per_min_r1");
        assert_eq!(spec.defense().to_string(), "sig_str_absorbed_per_min_r1");
        let acc = StatSpec::accuracy(Counter::Takedowns, RoundScope::Overall);
        assert_eq!(acc.defense().to_string(), "td_def");
        let kd = StatSpec::per_landed(Counter::Knockdowns, Counter::SigStrikes, RoundScope::Overall);
        assert_eq!(kd.to_string(), "kd_per_sig_str");
    }

    #[test]
    fn rate_sums_counts_over_summed_minutes() {
        let mut first = bout("1", 1, 2, "3:45");
        first.fighter_a_stats.total.sig_strikes = Attempts::new(35, 70);
        let mut second = bout("2", 2, 1, "1:15");
        second.fighter_a_stats.total.sig_strikes = Attempts::new(5, 5);
        let table = FightTable::new(vec![first, second, bout("3", 3, 1, "0:30")]).unwrap();
        let index = HistoryIndex::build(&table);
        let agg = WindowedStatAggregator::new(&index);
        let spec = StatSpec::landed_per_min(Counter::SigStrikes, RoundScope::Overall);
        let value = agg.aggregate(&spec, "x", 2, Window::AllTime);
        assert!((value - 40.0 / 10.0).abs() < 1e-12);
        let acc = agg.aggregate(&StatSpec::accuracy(Counter::SigStrikes, RoundScope::Overall), "x", 2, Window::AllTime);
        assert!((acc - 40.0 / 75.0).abs() < 1e-12);
    }

    #[test]
    fn defense_reads_the_opponent_side() {
        let mut fight = bout("1", 1, 3, "5:00");
        fight.fighter_b_stats.total.takedowns = Attempts::new(1, 4);
        let table = FightTable::new(vec![fight, bout("2", 2, 1, "1:00")]).unwrap();
        let index = HistoryIndex::build(&table);
        let agg = WindowedStatAggregator::new(&index);
        let def = StatSpec::accuracy(Counter::Takedowns, RoundScope::Overall).defense();
        assert!((agg.aggregate(&def, "x", 1, Window::AllTime) - 0.75).abs() < 1e-12);
        let offense = StatSpec::accuracy(Counter::Takedowns, RoundScope::Overall);
        assert!((agg.aggregate(&offense, "y", 1, Window::AllTime) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn unreached_rounds_contribute_nothing() {
        let mut fight = bout("1", 1, 1, "2:00");
        fight.fighter_a_stats.rounds = vec![StatLine {
            ground: Attempts::new(6, 8),
            ..Default::default()
        }];
        let table = FightTable::new(vec![fight, bout("2", 2, 1, "1:00")]).unwrap();
        let index = HistoryIndex::build(&table);
        let agg = WindowedStatAggregator::new(&index);
        let r1 = StatSpec::attempted_per_min(Counter::Ground, RoundScope::Round(1));
        let r2 = StatSpec::attempted_per_min(Counter::Ground, RoundScope::Round(2));
        assert!((agg.aggregate(&r1, "x", 1, Window::AllTime) - 4.0).abs() < 1e-12);
        assert_eq!(agg.aggregate(&r2, "x", 1, Window::AllTime), 0.0);
    }

    #[test]
    fn differential_is_exactly_negated() {
        let pair = StatPair::from_values(0.1 + 0.2, 0.3);
        assert_eq!(pair.diff_b, -pair.diff_a);
        assert_eq!(pair.diff(Corner::B), -pair.diff(Corner::A));
    }
}
