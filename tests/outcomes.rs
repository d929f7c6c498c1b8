use chrono::NaiveDate;

use fight_features::fight_table::{FightResult, MethodClass};
use fight_features::outcomes::{Finish, HeadToHead, RecordQuery, StreakAndOutcomeTracker, StreakKind};
use fight_features::{FightRecord, FightTable, HistoryIndex, Window};

fn bout(month: u32, a: &str, b: &str, winner: Option<&str>, method: &str, round: u8) -> FightRecord {
    FightRecord::new(
        format!("m{month}-{a}-{b}"),
        NaiveDate::from_ymd_opt(2019, month, 15).unwrap(),
        a,
        b,
        winner,
        method,
        round,
        "3:00",
    )
}

#[test]
fn loss_win_win_is_a_two_fight_win_streak() {
    let table = FightTable::new(vec![
        bout(1, "ivy", "jon", Some("jon"), "KO/TKO", 1),
        bout(3, "kim", "ivy", Some("ivy"), "Decision - Unanimous", 3),
        bout(5, "ivy", "leo", Some("ivy"), "Submission", 2),
        bout(7, "ivy", "max", Some("max"), "KO/TKO", 1),
    ])
    .unwrap();
    let index = HistoryIndex::build(&table);
    let tracker = StreakAndOutcomeTracker::new(&index);
    let streak = tracker.streak("ivy", 3, Window::AllTime);
    assert_eq!(streak.kind, Some(StreakKind::Win));
    assert_eq!(streak.count, 2);
    assert_eq!(tracker.streak("max", 3, Window::AllTime).count, 0);
    assert_eq!(tracker.streak("ivy", 4, Window::AllTime).losses(), 1);
}

#[test]
fn head_to_head_counts_each_side() {
    let table = FightTable::new(vec![
        bout(1, "ann", "bo", Some("ann"), "KO/TKO", 1),
        bout(2, "bo", "cy", Some("bo"), "KO/TKO", 1),
        bout(3, "bo", "ann", Some("bo"), "Decision - Split", 3),
        bout(4, "ann", "bo", Some("ann"), "Submission", 1),
        bout(5, "bo", "ann", None, "Decision - Draw", 3),
    ])
    .unwrap();
    let index = HistoryIndex::build(&table);
    let tracker = StreakAndOutcomeTracker::new(&index);
    assert_eq!(
        tracker.head_to_head("ann", "bo", 4),
        HeadToHead { wins: 2, losses: 1 }
    );
    assert_eq!(
        tracker.head_to_head("bo", "ann", 4),
        HeadToHead { wins: 1, losses: 2 }
    );
    assert_eq!(tracker.head_to_head("ann", "cy", 4), HeadToHead::default());
}

#[test]
fn decisions_match_case_insensitively() {
    let table = FightTable::new(vec![
        bout(1, "ann", "bo", Some("ann"), "DECISION - UNANIMOUS", 3),
        bout(2, "ann", "bo", Some("ann"), "decision - split", 3),
        bout(3, "ann", "bo", Some("ann"), "KO/TKO", 3),
        bout(4, "ann", "bo", Some("ann"), "KO/TKO", 1),
    ])
    .unwrap();
    let index = HistoryIndex::build(&table);
    let tracker = StreakAndOutcomeTracker::new(&index);
    let decisions = RecordQuery::new(FightResult::Win).finish(Finish::Decision);
    assert_eq!(tracker.record("ann", 4, Window::AllTime, &decisions), 2);
    let third_round_stoppage = RecordQuery::new(FightResult::Win).finish(Finish::InRound(3));
    assert_eq!(tracker.record("ann", 4, Window::AllTime, &third_round_stoppage), 1);
    let ko = RecordQuery::new(FightResult::Win).finish(Finish::Method(MethodClass::KoTko));
    assert_eq!(tracker.record("ann", 4, Window::AllTime, &ko), 1);
}

#[test]
fn last_year_window_drops_old_results() {
    let mut fights = vec![
        bout(1, "ann", "bo", Some("ann"), "KO/TKO", 1),
        bout(2, "ann", "cy", Some("ann"), "KO/TKO", 1),
    ];
    let mut later = bout(3, "ann", "di", Some("di"), "KO/TKO", 1);
    later.date = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
    fights.push(later);
    let table = FightTable::new(fights).unwrap();
    let index = HistoryIndex::build(&table);
    let tracker = StreakAndOutcomeTracker::new(&index);
    let last_year = Window::LastDuration(chrono::TimeDelta::days(365));
    let wins = RecordQuery::new(FightResult::Win);
    assert_eq!(tracker.record("ann", 2, Window::AllTime, &wins), 2);
    assert_eq!(tracker.record("ann", 2, last_year, &wins), 0);
    assert_eq!(tracker.win_loss("ann", 3, last_year).losses, 1);
}
