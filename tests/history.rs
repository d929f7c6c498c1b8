use chrono::{NaiveDate, TimeDelta};

use fight_features::synthetic::{SyntheticConfig, synthetic_table};
use fight_features::{FightRecord, FightTable, HistoryIndex, Window, WindowSelector};

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 4, 1).unwrap() + TimeDelta::days(n)
}

fn ladder() -> FightTable {
    FightTable::new(vec![
        FightRecord::new("0", day(0), "red", "blue", Some("red"), "KO/TKO", 1, "1:00"),
        FightRecord::new("1", day(10), "green", "red", Some("green"), "Decision", 3, "5:00"),
        FightRecord::new("2", day(10), "blue", "green", None, "Decision", 3, "5:00"),
        FightRecord::new("3", day(90), "blue", "red", Some("red"), "Submission", 2, "0:40"),
        FightRecord::new("4", day(200), "red", "gold", Some("gold"), "KO/TKO", 3, "4:59"),
    ])
    .unwrap()
}

#[test]
fn prior_fights_are_strictly_before_and_ordered() {
    let table = ladder();
    let index = HistoryIndex::build(&table);
    for as_of in 0..=table.len() {
        let prior = index.prior_fights("red", as_of);
        let rows: Vec<usize> = prior.iter().map(|f| f.index).collect();
        assert!(rows.iter().all(|&i| i < as_of));
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
        assert!(prior.iter().all(|f| f.involves("red")));
    }
    assert!(index.prior_fights("red", 0).is_empty());
}

#[test]
fn positional_corner_does_not_matter() {
    let table = ladder();
    let index = HistoryIndex::build(&table);
    let blue: Vec<usize> = index.prior_fights("blue", 5).iter().map(|f| f.index).collect();
    assert_eq!(blue, vec![0, 2, 3]);
}

#[test]
fn last_n_windows_never_exceed_n() {
    let table = synthetic_table(&SyntheticConfig {
        fighters: 12,
        fights: 300,
        seed: 99,
        ..SyntheticConfig::default()
    })
    .unwrap();
    let index = HistoryIndex::build(&table);
    for fight in table.iter().step_by(7) {
        for fighter in [&fight.fighter_a_id, &fight.fighter_b_id] {
            let all = index.prior_fights(fighter, fight.index).len();
            for n in [0usize, 1, 3, 5, 50] {
                let window = index.resolve(&WindowSelector::new(fighter, fight.index, Window::Last(n)));
                assert_eq!(window.len(), n.min(all));
            }
        }
    }
}

#[test]
fn trailing_duration_is_anchored_at_the_current_fight() {
    let table = ladder();
    let index = HistoryIndex::build(&table);
    let recent = index.window("red", 4, Window::LastDuration(TimeDelta::days(190)));
    let rows: Vec<usize> = recent.iter().map(|f| f.index).collect();
    assert_eq!(rows, vec![1, 3]);
    let since = index.prior_fights_since("red", 4, day(0));
    assert_eq!(since.len(), 3);
}

#[test]
fn head_to_head_only_sees_the_pair() {
    let table = ladder();
    let index = HistoryIndex::build(&table);
    let meetings: Vec<usize> = index.head_to_head("red", "blue", 5).map(|f| f.index).collect();
    assert_eq!(meetings, vec![0, 3]);
    assert_eq!(index.head_to_head("red", "blue", 3).count(), 1);
}
