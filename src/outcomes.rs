//! Point-in-time win/loss streaks, head-to-head and conditioned records.

use crate::fight_table::{FightRecord, FightResult, MethodClass};
use crate::history::{History, HistoryIndex, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreakKind {
    Win,
    Loss,
}

/// Current run of identical results, most recent first. Empty history, or a
/// draw as the latest result, gives `kind: None, count: 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streak {
    pub kind: Option<StreakKind>,
    pub count: usize,
}

impl Streak {
    pub fn wins(&self) -> usize {
        if self.kind == Some(StreakKind::Win) {
            self.count
        } else {
            0
        }
    }

    pub fn losses(&self) -> usize {
        if self.kind == Some(StreakKind::Loss) {
            self.count
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadToHead {
    pub wins: usize,
    pub losses: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WinLoss {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Finish {
    Any,
    /// Method contains "decision", case-insensitive.
    Decision,
    /// Ended in this round by anything other than a decision.
    InRound(u8),
    Method(MethodClass),
}

impl Finish {
    fn matches(&self, fight: &FightRecord) -> bool {
        match *self {
            Finish::Any => true,
            Finish::Decision => fight.is_decision(),
            Finish::InRound(round) => !fight.is_decision() && fight.outcome_round == round,
            Finish::Method(class) => fight.method_class() == class,
        }
    }
}

/// Filter for a conditioned win or loss count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordQuery<'q> {
    pub result: FightResult,
    pub finish: Finish,
    pub division: Option<&'q str>,
    pub scheduled_rounds: Option<u8>,
    pub location: Option<&'q str>,
}

impl<'q> RecordQuery<'q> {
    pub fn new(result: FightResult) -> Self {
        Self {
            result,
            finish: Finish::Any,
            division: None,
            scheduled_rounds: None,
            location: None,
        }
    }

    pub fn finish(mut self, finish: Finish) -> Self {
        self.finish = finish;
        self
    }

    pub fn division(mut self, division: &'q str) -> Self {
        self.division = Some(division);
        self
    }

    pub fn scheduled_rounds(mut self, rounds: u8) -> Self {
        self.scheduled_rounds = Some(rounds);
        self
    }

    pub fn location(mut self, location: &'q str) -> Self {
        self.location = Some(location);
        self
    }

    fn matches(&self, fighter_id: &str, fight: &FightRecord) -> bool {
        fight.result_for(fighter_id) == Some(self.result)
            && self.finish.matches(fight)
            && self.division.is_none_or(|d| fight.division == d)
            && self
                .scheduled_rounds
                .is_none_or(|n| fight.scheduled_rounds() == Some(n))
            && self.location.is_none_or(|l| fight.location == l)
    }
}

pub fn current_streak(fighter_id: &str, history: History<'_>) -> Streak {
    let mut results = history.iter().rev().filter_map(|f| f.result_for(fighter_id));
    let kind = match results.next() {
        Some(FightResult::Win) => StreakKind::Win,
        Some(FightResult::Loss) => StreakKind::Loss,
        Some(FightResult::Draw) | None => return Streak::default(),
    };
    let expected = match kind {
        StreakKind::Win => FightResult::Win,
        StreakKind::Loss => FightResult::Loss,
    };
    let count = 1 + results.take_while(|r| *r == expected).count();
    Streak {
        kind: Some(kind),
        count,
    }
}

pub fn win_loss(fighter_id: &str, history: History<'_>) -> WinLoss {
    let mut out = WinLoss::default();
    for result in history.iter().filter_map(|f| f.result_for(fighter_id)) {
        match result {
            FightResult::Win => out.wins += 1,
            FightResult::Loss => out.losses += 1,
            FightResult::Draw => out.draws += 1,
        }
    }
    out
}

pub fn count_record(fighter_id: &str, history: History<'_>, query: &RecordQuery<'_>) -> usize {
    history
        .iter()
        .filter(|fight| query.matches(fighter_id, fight))
        .count()
}

#[derive(Debug, Clone, Copy)]
pub struct StreakAndOutcomeTracker<'i, 't> {
    index: &'i HistoryIndex<'t>,
}

impl<'i, 't> StreakAndOutcomeTracker<'i, 't> {
    pub fn new(index: &'i HistoryIndex<'t>) -> Self {
        Self { index }
    }

    pub fn streak(&self, fighter_id: &str, as_of: usize, window: Window) -> Streak {
        current_streak(fighter_id, self.index.window(fighter_id, as_of, window))
    }

    pub fn win_loss(&self, fighter_id: &str, as_of: usize, window: Window) -> WinLoss {
        win_loss(fighter_id, self.index.window(fighter_id, as_of, window))
    }

    /// Prior meetings of exactly this pair, counted by `winner_id`.
    pub fn head_to_head(&self, fighter_id: &str, opponent_id: &str, as_of: usize) -> HeadToHead {
        let mut out = HeadToHead::default();
        for fight in self.index.head_to_head(fighter_id, opponent_id, as_of) {
            match fight.winner_id.as_deref() {
                Some(w) if w == fighter_id => out.wins += 1,
                Some(w) if w == opponent_id => out.losses += 1,
                _ => {}
            }
        }
        out
    }

    pub fn record(
        &self,
        fighter_id: &str,
        as_of: usize,
        window: Window,
        query: &RecordQuery<'_>,
    ) -> usize {
        count_record(fighter_id, self.index.window(fighter_id, as_of, window), query)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::fight_table::FightTable;

    fn bout(day: u32, a: &str, b: &str, winner: Option<&str>, method: &str, round: u8) -> FightRecord {
        FightRecord::new(
            format!("f{day}"),
            NaiveDate::from_ymd_opt(2018, 5, day).unwrap(),
            a,
            b,
            winner,
            method,
            round,
            "2:00",
        )
    }

    #[test]
    fn draw_as_latest_result_resets_streak() {
        let table = FightTable::new(vec![
            bout(1, "x", "y", Some("x"), "KO/TKO", 1),
            bout(2, "x", "z", None, "Decision - Majority", 3),
            bout(3, "x", "w", Some("x"), "KO/TKO", 1),
        ])
        .unwrap();
        let index = HistoryIndex::build(&table);
        let tracker = StreakAndOutcomeTracker::new(&index);
        assert_eq!(tracker.streak("x", 2, Window::AllTime), Streak::default());
        let after = tracker.streak("x", 3, Window::AllTime);
        assert_eq!(after.kind, Some(StreakKind::Win));
        assert_eq!(after.count, 1);
    }

    #[test]
    fn streak_window_caps_the_count() {
        let table = FightTable::new(
            (1..=7)
                .map(|d| bout(d, "x", "y", Some("y"), "Submission", 2))
                .collect(),
        )
        .unwrap();
        let index = HistoryIndex::build(&table);
        let tracker = StreakAndOutcomeTracker::new(&index);
        assert_eq!(tracker.streak("x", 7, Window::Last(5)).losses(), 5);
        assert_eq!(tracker.streak("x", 7, Window::AllTime).losses(), 7);
        assert_eq!(tracker.streak("y", 7, Window::AllTime).wins(), 7);
    }

    #[test]
    fn conditioned_counts() {
        let mut fights = vec![
            bout(1, "x", "y", Some("x"), "KO/TKO", 1),
            bout(2, "x", "z", Some("x"), "Decision - Unanimous", 3),
            bout(3, "w", "x", Some("w"), "Submission", 2),
            bout(4, "x", "y", Some("x"), "KO/TKO", 2),
        ];
        fights[0].division = "Lightweight".into();
        fights[1].division = "Lightweight".into();
        fights[3].division = "Welterweight".into();
        for f in fights.iter_mut() {
            f.outcome_format = "3 Rnd (5-5-5)".into();
        }
        let table = FightTable::new(fights).unwrap();
        let index = HistoryIndex::build(&table);
        let tracker = StreakAndOutcomeTracker::new(&index);
        let r1_wins = RecordQuery::new(FightResult::Win).finish(Finish::InRound(1)).scheduled_rounds(3);
        assert_eq!(tracker.record("x", 4, Window::AllTime, &r1_wins), 1);
        let dec = RecordQuery::new(FightResult::Win).finish(Finish::Decision);
        assert_eq!(tracker.record("x", 4, Window::AllTime, &dec), 1);
        let ko_lw = RecordQuery::new(FightResult::Win)
            .finish(Finish::Method(MethodClass::KoTko))
            .division("Lightweight");
        assert_eq!(tracker.record("x", 4, Window::AllTime, &ko_lw), 1);
        let five_rd = RecordQuery::new(FightResult::Win).scheduled_rounds(5);
        assert_eq!(tracker.record("x", 4, Window::AllTime, &five_rd), 0);
        let sub_losses = RecordQuery::new(FightResult::Loss).finish(Finish::Method(MethodClass::Submission));
        assert_eq!(tracker.record("x", 4, Window::AllTime, &sub_losses), 1);
    }

    #[test]
    fn win_loss_counts_draws_apart() {
        let table = FightTable::new(vec![
            bout(1, "x", "y", Some("x"), "KO/TKO", 1),
            bout(2, "x", "y", None, "Decision - Split", 3),
            bout(3, "y", "x", Some("y"), "KO/TKO", 1),
        ])
        .unwrap();
        let index = HistoryIndex::build(&table);
        let tracker = StreakAndOutcomeTracker::new(&index);
        let wl = tracker.win_loss("x", 3, Window::AllTime);
        assert_eq!(wl, WinLoss { wins: 1, losses: 1, draws: 1 });
        let h2h = tracker.head_to_head("x", "y", 3);
        assert_eq!(h2h, HeadToHead { wins: 1, losses: 1 });
    }
}
