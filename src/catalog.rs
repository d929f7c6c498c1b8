use chrono::TimeDelta;
use once_cell::sync::OnceCell;

use crate::config::{MAX_ROUNDS, PipelineConfig};
use crate::features::{FeatureKind, RatingField, RecordKind};
use crate::fight_table::{Counter, FightResult, MethodClass, RoundScope};
use crate::history::Window;
use crate::outcomes::Finish;
use crate::stats::StatSpec;

pub const WEIGHT_CLASSES: [&str; 9] = [
    "Flyweight",
    "Bantamweight",
    "Featherweight",
    "Lightweight",
    "Welterweight",
    "Middleweight",
    "Light Heavyweight",
    "Heavyweight",
    "Catchweight",
];

pub const STAT_WINDOWS: [Window; 3] = [Window::Last(3), Window::Last(5), Window::AllTime];
pub const FORM_WINDOWS: [Window; 2] = [Window::Last(5), Window::AllTime];

const REGIONS: [Counter; 5] = [
    Counter::Head,
    Counter::Body,
    Counter::Leg,
    Counter::Distance,
    Counter::Clinch,
];

static STANDARD_STATS: OnceCell<Vec<StatSpec>> = OnceCell::new();

/// Every windowed stat the standard catalog computes.
pub fn standard_stats() -> &'static [StatSpec] {
    STANDARD_STATS.get_or_init(build_standard_stats)
}

fn build_standard_stats() -> Vec<StatSpec> {
    let mut out = Vec::new();
    for scope in RoundScope::all() {
        for counter in [Counter::SigStrikes, Counter::Takedowns] {
            out.push(StatSpec::landed_per_min(counter, scope));
            out.push(StatSpec::accuracy(counter, scope));
            out.push(StatSpec::accuracy(counter, scope).defense());
            out.push(StatSpec::landed_per_min(counter, scope).defense());
        }
        out.push(StatSpec::attempted_per_min(Counter::Ground, scope));
        out.push(StatSpec::landed_per_min(Counter::Ground, scope));
        out.push(StatSpec::accuracy(Counter::Ground, scope));
        out.push(StatSpec::landed_per_min(Counter::Ground, scope).defense());
        out.push(StatSpec::attempted_per_min(Counter::Ground, scope).defense());
    }
    out.push(StatSpec::per_landed(
        Counter::Knockdowns,
        Counter::SigStrikes,
        RoundScope::Overall,
    ));
    for region in REGIONS {
        out.push(StatSpec::landed_per_min(region, RoundScope::Overall));
        out.push(StatSpec::accuracy(region, RoundScope::Overall));
    }
    for counter in [
        Counter::SubmissionAttempts,
        Counter::Reversals,
        Counter::ControlSeconds,
    ] {
        out.push(StatSpec::landed_per_min(counter, RoundScope::Overall));
    }
    out
}

/// Per-corner feature families computed for every fight.
#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    pub kinds: Vec<FeatureKind>,
    pub last_year: TimeDelta,
    pub recent: TimeDelta,
}

impl FeatureCatalog {
    pub fn standard(config: &PipelineConfig) -> Self {
        let last_year = Window::LastDuration(config.last_year());
        let mut kinds = vec![
            FeatureKind::Rating(RatingField::Rating),
            FeatureKind::Rating(RatingField::Deviation),
            FeatureKind::Rating(RatingField::Volatility),
        ];

        for window in STAT_WINDOWS {
            kinds.extend(
                standard_stats()
                    .iter()
                    .map(|spec| FeatureKind::Stat {
                        spec: *spec,
                        window,
                    }),
            );
        }

        for window in FORM_WINDOWS {
            kinds.push(FeatureKind::WinStreak(window));
            kinds.push(FeatureKind::LossStreak(window));
            kinds.push(FeatureKind::Wins(window));
            kinds.push(FeatureKind::Losses(window));
        }
        kinds.push(FeatureKind::HeadToHeadWins);

        for window in [Window::AllTime, last_year] {
            kinds.extend(
                round_format_records()
                    .into_iter()
                    .map(|kind| FeatureKind::Record { kind, window }),
            );
            kinds.extend(
                division_records()
                    .into_iter()
                    .map(|kind| FeatureKind::Record { kind, window }),
            );
        }
        for result in [FightResult::Win, FightResult::Loss] {
            kinds.push(FeatureKind::Record {
                kind: RecordKind {
                    at_location: true,
                    ..RecordKind::new(result)
                },
                window: Window::AllTime,
            });
        }

        kinds.push(FeatureKind::RecentFights);
        kinds.push(FeatureKind::WeeksInactive);
        kinds.push(FeatureKind::RoundsFought(Window::AllTime));
        kinds.push(FeatureKind::RoundsFought(last_year));

        Self {
            kinds,
            last_year: config.last_year(),
            recent: config.recent(),
        }
    }

    /// A catalog limited to the given kinds, sharing the default time spans.
    pub fn only(kinds: Vec<FeatureKind>, config: &PipelineConfig) -> Self {
        Self {
            kinds,
            last_year: config.last_year(),
            recent: config.recent(),
        }
    }
}

/// Result by finish within 3- and 5-round bouts.
fn round_format_records() -> Vec<RecordKind> {
    let mut out = Vec::new();
    for format in [3u8, MAX_ROUNDS] {
        for result in [FightResult::Win, FightResult::Loss] {
            let base = RecordKind {
                scheduled_rounds: Some(format),
                ..RecordKind::new(result)
            };
            out.push(base);
            out.push(RecordKind {
                finish: Finish::Decision,
                ..base
            });
            for round in 1..=format {
                out.push(RecordKind {
                    finish: Finish::InRound(round),
                    ..base
                });
            }
        }
    }
    out
}

/// Result by method within each weight class, plus across all classes.
fn division_records() -> Vec<RecordKind> {
    let finishes = [
        Finish::Any,
        Finish::Method(MethodClass::KoTko),
        Finish::Method(MethodClass::Submission),
        Finish::Decision,
    ];
    let divisions = WEIGHT_CLASSES.iter().copied().map(Some).chain([None]);
    let mut out = Vec::new();
    for division in divisions {
        for result in [FightResult::Win, FightResult::Loss] {
            for finish in finishes {
                out.push(RecordKind {
                    finish,
                    division,
                    ..RecordKind::new(result)
                });
            }
        }
    }
    out
}
