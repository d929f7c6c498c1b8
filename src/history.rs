use std::collections::HashMap;

use chrono::{NaiveDate, TimeDelta};

use crate::fight_table::{FightRecord, FightTable};

/// Selection policy over a fighter's prior fights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Window {
    AllTime,
    /// Most recent `n` prior fights. `Last(0)` is empty.
    Last(usize),
    /// Prior fights dated on or after the as-of fight's date minus the duration.
    LastDuration(TimeDelta),
}

impl Window {
    pub fn key(&self) -> String {
        match self {
            Window::AllTime => "alltime".to_string(),
            Window::Last(n) => format!("l{n}"),
            Window::LastDuration(d) => format!("{}d", d.num_days()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelector<'s> {
    pub fighter_id: &'s str,
    pub as_of: usize,
    pub window: Window,
}

impl<'s> WindowSelector<'s> {
    pub fn new(fighter_id: &'s str, as_of: usize, window: Window) -> Self {
        Self {
            fighter_id,
            as_of,
            window,
        }
    }
}

/// Ordered view over some of one fighter's prior fights.
#[derive(Debug, Clone, Copy)]
pub struct History<'a> {
    table: &'a FightTable,
    positions: &'a [usize],
}

impl<'a> History<'a> {
    fn empty(table: &'a FightTable) -> Self {
        Self {
            table,
            positions: &[],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn indices(&self) -> &'a [usize] {
        self.positions
    }

    pub fn iter(self) -> impl DoubleEndedIterator<Item = &'a FightRecord> + ExactSizeIterator + 'a {
        let table = self.table;
        self.positions.iter().map(move |&i| &table.records()[i])
    }

    pub fn last(&self) -> Option<&'a FightRecord> {
        self.positions.last().map(|&i| &self.table.records()[i])
    }

    /// Final `n` entries, or all of them when fewer exist.
    pub fn last_n(&self, n: usize) -> History<'a> {
        let start = self.positions.len().saturating_sub(n);
        History {
            table: self.table,
            positions: &self.positions[start..],
        }
    }

    /// Entries dated on or after `cutoff`.
    pub fn since(&self, cutoff: NaiveDate) -> History<'a> {
        let records = self.table.records();
        let start = self.positions.partition_point(|&i| records[i].date < cutoff);
        History {
            table: self.table,
            positions: &self.positions[start..],
        }
    }
}

/// Per-fighter row positions over a [`FightTable`]. Every query is bounded by
/// an as-of index and never yields that row or anything after it.
#[derive(Debug, Clone)]
pub struct HistoryIndex<'t> {
    table: &'t FightTable,
    by_fighter: HashMap<&'t str, Vec<usize>>,
}

impl<'t> HistoryIndex<'t> {
    pub fn build(table: &'t FightTable) -> Self {
        let mut by_fighter: HashMap<&'t str, Vec<usize>> = HashMap::new();
        for record in table.iter() {
            by_fighter
                .entry(record.fighter_a_id.as_str())
                .or_default()
                .push(record.index);
            by_fighter
                .entry(record.fighter_b_id.as_str())
                .or_default()
                .push(record.index);
        }
        Self { table, by_fighter }
    }

    pub fn table(&self) -> &'t FightTable {
        self.table
    }

    pub fn fighter_count(&self) -> usize {
        self.by_fighter.len()
    }

    pub fn fighters(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.by_fighter.keys().copied()
    }

    /// All fights of `fighter_id` with `index < as_of`, oldest first.
    pub fn prior_fights(&self, fighter_id: &str, as_of: usize) -> History<'_> {
        let Some(positions) = self.by_fighter.get(fighter_id) else {
            return History::empty(self.table);
        };
        let end = positions.partition_point(|&i| i < as_of);
        History {
            table: self.table,
            positions: &positions[..end],
        }
    }

    pub fn prior_fights_last_n(&self, fighter_id: &str, as_of: usize, n: usize) -> History<'_> {
        self.prior_fights(fighter_id, as_of).last_n(n)
    }

    pub fn prior_fights_since(
        &self,
        fighter_id: &str,
        as_of: usize,
        cutoff: NaiveDate,
    ) -> History<'_> {
        self.prior_fights(fighter_id, as_of).since(cutoff)
    }

    /// Date a trailing duration is measured back from: the as-of fight's own
    /// date, or the latest recorded date when `as_of` is past the end.
    pub fn anchor_date(&self, as_of: usize) -> Option<NaiveDate> {
        let records = self.table.records();
        records
            .get(as_of)
            .or_else(|| records.last())
            .map(|r| r.date)
    }

    pub fn resolve(&self, selector: &WindowSelector<'_>) -> History<'_> {
        let prior = self.prior_fights(selector.fighter_id, selector.as_of);
        match selector.window {
            Window::AllTime => prior,
            Window::Last(n) => prior.last_n(n),
            Window::LastDuration(span) => match self.anchor_date(selector.as_of) {
                Some(anchor) => prior.since(anchor - span),
                None => History::empty(self.table),
            },
        }
    }

    pub fn window(&self, fighter_id: &str, as_of: usize, window: Window) -> History<'_> {
        self.resolve(&WindowSelector::new(fighter_id, as_of, window))
    }

    /// Prior fights between exactly this pair, in either corner order.
    pub fn head_to_head(
        &self,
        fighter_id: &str,
        opponent_id: &str,
        as_of: usize,
    ) -> impl Iterator<Item = &FightRecord> + '_ {
        let opponent = opponent_id.to_string();
        self.prior_fights(fighter_id, as_of)
            .iter()
            .filter(move |r| r.involves(&opponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fight_table::FightRecord;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + TimeDelta::days(n)
    }

    fn table() -> FightTable {
        FightTable::new(vec![
            FightRecord::new("0", day(0), "x", "y", Some("x"), "Decision", 3, "5:00"),
            FightRecord::new("1", day(30), "z", "x", Some("z"), "KO/TKO", 1, "1:00"),
            FightRecord::new("2", day(60), "y", "z", None, "Decision", 3, "5:00"),
            FightRecord::new("3", day(400), "x", "w", Some("x"), "Submission", 2, "2:30"),
            FightRecord::new("4", day(420), "x", "y", Some("y"), "Decision", 3, "5:00"),
        ])
        .unwrap()
    }

    #[test]
    fn as_of_zero_is_empty() {
        let t = table();
        let idx = HistoryIndex::build(&t);
        assert!(idx.prior_fights("x", 0).is_empty());
    }

    #[test]
    fn matches_either_corner_and_excludes_as_of_row() {
        let t = table();
        let idx = HistoryIndex::build(&t);
        let prior: Vec<usize> = idx.prior_fights("x", 4).iter().map(|r| r.index).collect();
        assert_eq!(prior, vec![0, 1, 3]);
    }

    #[test]
    fn last_n_never_pads() {
        let t = table();
        let idx = HistoryIndex::build(&t);
        assert_eq!(idx.prior_fights_last_n("x", 4, 2).indices(), &[1, 3]);
        assert_eq!(idx.prior_fights_last_n("x", 4, 10).len(), 3);
        assert!(idx.prior_fights_last_n("x", 4, 0).is_empty());
    }

    #[test]
    fn duration_window_anchors_on_the_as_of_date() {
        let t = table();
        let idx = HistoryIndex::build(&t);
        let last_year = idx.window("x", 4, Window::LastDuration(TimeDelta::days(365)));
        assert_eq!(last_year.indices(), &[3]);
        let since = idx.prior_fights_since("x", 4, day(30));
        assert_eq!(since.indices(), &[1, 3]);
    }

    #[test]
    fn head_to_head_sees_both_orders() {
        let t = table();
        let idx = HistoryIndex::build(&t);
        let meetings: Vec<usize> = idx.head_to_head("y", "x", 5).map(|r| r.index).collect();
        assert_eq!(meetings, vec![0, 4]);
    }

    #[test]
    fn unknown_fighter_is_empty() {
        let t = table();
        let idx = HistoryIndex::build(&t);
        assert!(idx.prior_fights("nobody", 5).is_empty());
        assert_eq!(idx.fighter_count(), 4);
    }
}
