use chrono::NaiveDate;

use fight_features::catalog::standard_stats;
use fight_features::fight_table::{Attempts, Corner, Counter, RoundScope, StatLine};
use fight_features::stats::{Perspective, StatKind};
use fight_features::synthetic::{SyntheticConfig, synthetic_table};
use fight_features::{FightRecord, FightTable, HistoryIndex, StatSpec, Window, WindowedStatAggregator};

fn on(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 10, day).unwrap()
}

fn two_round_stoppage() -> FightRecord {
    let mut fight = FightRecord::new("f1", on(1), "kai", "lou", Some("kai"), "KO/TKO", 2, "3:45");
    fight.outcome_format = "3 Rnd (5-5-5)".into();
    fight.fighter_a_stats.total.sig_strikes = Attempts::new(35, 60);
    fight.fighter_a_stats.rounds = vec![
        StatLine {
            sig_strikes: Attempts::new(20, 30),
            ..Default::default()
        },
        StatLine {
            sig_strikes: Attempts::new(15, 30),
            ..Default::default()
        },
    ];
    fight
}

fn followup() -> FightRecord {
    FightRecord::new("f2", on(20), "kai", "max", None, "Decision - Draw", 3, "5:00")
}

#[test]
fn round_time_follows_the_finish() {
    let fight = two_round_stoppage();
    let table = FightTable::new(vec![fight, followup()]).unwrap();
    let recorded = &table.records()[0];
    assert!((recorded.minutes_in(RoundScope::Overall) - 8.75).abs() < 1e-12);
    assert!((recorded.minutes_in(RoundScope::Round(1)) - 5.0).abs() < 1e-12);
    assert_eq!(recorded.minutes_in(RoundScope::Round(3)), 0.0);

    let index = HistoryIndex::build(&table);
    let agg = WindowedStatAggregator::new(&index);
    let overall = agg.aggregate(
        &StatSpec::landed_per_min(Counter::SigStrikes, RoundScope::Overall),
        "kai",
        1,
        Window::AllTime,
    );
    assert!((overall - 35.0 / 8.75).abs() < 1e-12);
    let r1 = agg.aggregate(
        &StatSpec::landed_per_min(Counter::SigStrikes, RoundScope::Round(1)),
        "kai",
        1,
        Window::AllTime,
    );
    assert!((r1 - 4.0).abs() < 1e-12);
    let r3 = agg.aggregate(
        &StatSpec::landed_per_min(Counter::SigStrikes, RoundScope::Round(3)),
        "kai",
        1,
        Window::AllTime,
    );
    assert_eq!(r3, 0.0);
}

#[test]
fn zero_attempts_give_zero_accuracy() {
    let table = FightTable::new(vec![
        FightRecord::new("f1", on(1), "kai", "lou", Some("lou"), "Submission", 1, "0:30"),
        followup(),
    ])
    .unwrap();
    let index = HistoryIndex::build(&table);
    let agg = WindowedStatAggregator::new(&index);
    let acc = StatSpec::accuracy(Counter::SigStrikes, RoundScope::Overall);
    let value = agg.aggregate(&acc, "kai", 1, Window::AllTime);
    assert_eq!(value, 0.0);
    assert_eq!(agg.aggregate(&acc.defense(), "kai", 1, Window::AllTime), 0.0);
}

#[test]
fn empty_window_is_zero_for_every_stat() {
    let table = FightTable::new(vec![two_round_stoppage(), followup()]).unwrap();
    let index = HistoryIndex::build(&table);
    let agg = WindowedStatAggregator::new(&index);
    for spec in standard_stats() {
        assert_eq!(agg.aggregate(spec, "max", 1, Window::AllTime), 0.0);
        assert_eq!(agg.aggregate(spec, "kai", 1, Window::Last(0)), 0.0);
        assert_eq!(agg.aggregate(spec, "kai", 0, Window::AllTime), 0.0);
    }
}

#[test]
fn defense_is_the_opponents_offense() {
    let table = FightTable::new(vec![two_round_stoppage(), followup()]).unwrap();
    let index = HistoryIndex::build(&table);
    let agg = WindowedStatAggregator::new(&index);
    let landed = StatSpec::landed_per_min(Counter::SigStrikes, RoundScope::Overall);
    let absorbed_by_lou = agg.aggregate(&landed.defense(), "lou", 1, Window::AllTime);
    let kai_output = agg.aggregate(&landed, "kai", 1, Window::AllTime);
    assert_eq!(absorbed_by_lou, kai_output);

    let acc = StatSpec::accuracy(Counter::SigStrikes, RoundScope::Overall);
    let lou_defense = agg.aggregate(&acc.defense(), "lou", 1, Window::AllTime);
    assert!((lou_defense - (1.0 - 35.0 / 60.0)).abs() < 1e-12);
}

#[test]
fn percentages_stay_in_unit_interval() {
    let table = synthetic_table(&SyntheticConfig {
        fights: 250,
        fighters: 20,
        seed: 3,
        ..SyntheticConfig::default()
    })
    .unwrap();
    let index = HistoryIndex::build(&table);
    let agg = WindowedStatAggregator::new(&index);
    let percentages: Vec<&StatSpec> = standard_stats()
        .iter()
        .filter(|s| matches!(s.kind, StatKind::Accuracy { .. }))
        .collect();
    assert!(percentages.iter().any(|s| s.perspective == Perspective::Defense));
    for fight in table.iter().skip(50).step_by(11) {
        for spec in &percentages {
            for window in [Window::Last(3), Window::AllTime] {
                let pair = agg.pair(spec, fight, window);
                for corner in Corner::BOTH {
                    let v = pair.value(corner);
                    assert!((0.0..=1.0).contains(&v), "{spec} {window:?} = {v}");
                }
                assert_eq!(pair.diff_b, -pair.diff_a);
            }
        }
    }
}
