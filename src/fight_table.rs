use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{MAX_ROUNDS, ROUND_SECONDS};
use crate::error::{FeatureError, Result};

/// Positional side of a bout. "A" and "B" carry no meaning beyond column placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Corner {
    A,
    B,
}

impl Corner {
    pub const BOTH: [Corner; 2] = [Corner::A, Corner::B];

    pub fn opponent(self) -> Corner {
        match self {
            Corner::A => Corner::B,
            Corner::B => Corner::A,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Corner::A => "a",
            Corner::B => "b",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FightResult {
    Win,
    Loss,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MethodClass {
    KoTko,
    Submission,
    Decision,
    Other,
}

impl MethodClass {
    pub fn classify(method: &str) -> Self {
        let lower = method.to_ascii_lowercase();
        if lower.contains("decision") {
            MethodClass::Decision
        } else if lower.contains("submission") {
            MethodClass::Submission
        } else if lower.contains("ko") {
            MethodClass::KoTko
        } else {
            MethodClass::Other
        }
    }
}

/// Round scope a statistic or an elapsed time is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoundScope {
    Round(u8),
    Overall,
}

impl RoundScope {
    pub fn all() -> Vec<RoundScope> {
        let mut out: Vec<RoundScope> = (1..=MAX_ROUNDS).map(RoundScope::Round).collect();
        out.push(RoundScope::Overall);
        out
    }
}

/// Raw per-side counters. Unpaired counters report `landed == attempted == value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    Knockdowns,
    SigStrikes,
    TotalStrikes,
    Takedowns,
    SubmissionAttempts,
    Reversals,
    ControlSeconds,
    Head,
    Body,
    Leg,
    Distance,
    Clinch,
    Ground,
}

impl Counter {
    pub fn is_paired(self) -> bool {
        !matches!(
            self,
            Counter::Knockdowns
                | Counter::SubmissionAttempts
                | Counter::Reversals
                | Counter::ControlSeconds
        )
    }

    pub fn key(self) -> &'static str {
        match self {
            Counter::Knockdowns => "kd",
            Counter::SigStrikes => "sig_str",
            Counter::TotalStrikes => "total_str",
            Counter::Takedowns => "td",
            Counter::SubmissionAttempts => "sub_att",
            Counter::Reversals => "rev",
            Counter::ControlSeconds => "ctrl_secs",
            Counter::Head => "head",
            Counter::Body => "body",
            Counter::Leg => "leg",
            Counter::Distance => "distance",
            Counter::Clinch => "clinch",
            Counter::Ground => "ground",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempts {
    pub landed: u32,
    pub attempted: u32,
}

impl Attempts {
    pub fn new(landed: u32, attempted: u32) -> Self {
        Self { landed, attempted }
    }

    fn single(value: u32) -> Self {
        Self {
            landed: value,
            attempted: value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatLine {
    pub knockdowns: u32,
    pub sig_strikes: Attempts,
    pub total_strikes: Attempts,
    pub takedowns: Attempts,
    pub submission_attempts: u32,
    pub reversals: u32,
    pub control_secs: u32,
    pub head: Attempts,
    pub body: Attempts,
    pub leg: Attempts,
    pub distance: Attempts,
    pub clinch: Attempts,
    pub ground: Attempts,
}

impl StatLine {
    pub fn get(&self, counter: Counter) -> Attempts {
        match counter {
            Counter::Knockdowns => Attempts::single(self.knockdowns),
            Counter::SigStrikes => self.sig_strikes,
            Counter::TotalStrikes => self.total_strikes,
            Counter::Takedowns => self.takedowns,
            Counter::SubmissionAttempts => Attempts::single(self.submission_attempts),
            Counter::Reversals => Attempts::single(self.reversals),
            Counter::ControlSeconds => Attempts::single(self.control_secs),
            Counter::Head => self.head,
            Counter::Body => self.body,
            Counter::Leg => self.leg,
            Counter::Distance => self.distance,
            Counter::Clinch => self.clinch,
            Counter::Ground => self.ground,
        }
    }

    fn paired(&self) -> [(Counter, Attempts); 9] {
        [
            (Counter::SigStrikes, self.sig_strikes),
            (Counter::TotalStrikes, self.total_strikes),
            (Counter::Takedowns, self.takedowns),
            (Counter::Head, self.head),
            (Counter::Body, self.body),
            (Counter::Leg, self.leg),
            (Counter::Distance, self.distance),
            (Counter::Clinch, self.clinch),
            (Counter::Ground, self.ground),
        ]
    }
}

/// Totals plus per-round lines for one side; `rounds[0]` is round 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideStats {
    pub total: StatLine,
    pub rounds: Vec<StatLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightRecord {
    #[serde(default)]
    pub index: usize,
    pub fight_id: String,
    pub date: NaiveDate,
    pub fighter_a_id: String,
    pub fighter_b_id: String,
    #[serde(default)]
    pub winner_id: Option<String>,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub outcome_method: String,
    pub outcome_round: u8,
    /// Finish clock within the ending round, `M:SS`.
    pub outcome_time: String,
    #[serde(default)]
    pub outcome_format: String,
    #[serde(default)]
    pub fighter_a_stats: SideStats,
    #[serde(default)]
    pub fighter_b_stats: SideStats,
    #[serde(skip)]
    finish_secs: u32,
}

impl FightRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fight_id: impl Into<String>,
        date: NaiveDate,
        fighter_a_id: impl Into<String>,
        fighter_b_id: impl Into<String>,
        winner_id: Option<&str>,
        outcome_method: impl Into<String>,
        outcome_round: u8,
        outcome_time: impl Into<String>,
    ) -> Self {
        Self {
            index: 0,
            fight_id: fight_id.into(),
            date,
            fighter_a_id: fighter_a_id.into(),
            fighter_b_id: fighter_b_id.into(),
            winner_id: winner_id.map(str::to_string),
            division: String::new(),
            location: String::new(),
            outcome_method: outcome_method.into(),
            outcome_round,
            outcome_time: outcome_time.into(),
            outcome_format: String::new(),
            fighter_a_stats: SideStats::default(),
            fighter_b_stats: SideStats::default(),
            finish_secs: 0,
        }
    }

    pub fn fighter(&self, corner: Corner) -> &str {
        match corner {
            Corner::A => &self.fighter_a_id,
            Corner::B => &self.fighter_b_id,
        }
    }

    pub fn corner_of(&self, fighter_id: &str) -> Option<Corner> {
        if self.fighter_a_id == fighter_id {
            Some(Corner::A)
        } else if self.fighter_b_id == fighter_id {
            Some(Corner::B)
        } else {
            None
        }
    }

    pub fn involves(&self, fighter_id: &str) -> bool {
        self.corner_of(fighter_id).is_some()
    }

    pub fn stats(&self, corner: Corner) -> &SideStats {
        match corner {
            Corner::A => &self.fighter_a_stats,
            Corner::B => &self.fighter_b_stats,
        }
    }

    pub fn result_for(&self, fighter_id: &str) -> Option<FightResult> {
        let corner = self.corner_of(fighter_id)?;
        Some(self.result_for_corner(corner))
    }

    pub fn result_for_corner(&self, corner: Corner) -> FightResult {
        match self.winner_id.as_deref() {
            None => FightResult::Draw,
            Some(w) if w == self.fighter(corner) => FightResult::Win,
            Some(_) => FightResult::Loss,
        }
    }

    /// Glicko-2 match score for `corner`: 1 win, 0 loss, 0.5 draw or no contest.
    pub fn score(&self, corner: Corner) -> f64 {
        match self.result_for_corner(corner) {
            FightResult::Win => 1.0,
            FightResult::Loss => 0.0,
            FightResult::Draw => 0.5,
        }
    }

    pub fn finish_secs(&self) -> u32 {
        self.finish_secs
    }

    pub fn is_decision(&self) -> bool {
        self.outcome_method.to_ascii_lowercase().contains("decision")
    }

    pub fn method_class(&self) -> MethodClass {
        MethodClass::classify(&self.outcome_method)
    }

    pub fn scheduled_rounds(&self) -> Option<u8> {
        parse_scheduled_rounds(&self.outcome_format)
    }

    /// Minutes of fighting inside `scope`. Rounds after the ending round never happened.
    pub fn minutes_in(&self, scope: RoundScope) -> f64 {
        let full = ROUND_SECONDS as f64 / 60.0;
        let finish = self.finish_secs as f64 / 60.0;
        match scope {
            RoundScope::Overall => (self.outcome_round.saturating_sub(1)) as f64 * full + finish,
            RoundScope::Round(r) if r < self.outcome_round => full,
            RoundScope::Round(r) if r == self.outcome_round => finish,
            RoundScope::Round(_) => 0.0,
        }
    }

    pub fn scoped_stats(&self, corner: Corner, scope: RoundScope) -> StatLine {
        let side = self.stats(corner);
        match scope {
            RoundScope::Overall => side.total,
            RoundScope::Round(r) if r == 0 || r > self.outcome_round => StatLine::default(),
            RoundScope::Round(r) => side
                .rounds
                .get(usize::from(r) - 1)
                .copied()
                .unwrap_or_default(),
        }
    }

    fn validate(&mut self, row: usize) -> Result<()> {
        let a = self.fighter_a_id.trim().to_string();
        let b = self.fighter_b_id.trim();
        if a.is_empty() || b.is_empty() {
            return Err(FeatureError::malformed(row, &a, "empty fighter id"));
        }
        if a == b {
            return Err(FeatureError::malformed(row, &a, "fighter appears on both sides"));
        }
        if self.winner_id.as_deref().is_some_and(|w| w.trim().is_empty()) {
            self.winner_id = None;
        }
        if let Some(w) = self.winner_id.as_deref()
            && w != self.fighter_a_id
            && w != self.fighter_b_id
        {
            return Err(FeatureError::malformed(
                row,
                w,
                "winner is not a participant",
            ));
        }
        if self.outcome_round == 0 || self.outcome_round > MAX_ROUNDS {
            return Err(FeatureError::malformed(
                row,
                &a,
                format!("outcome round {} outside 1..={MAX_ROUNDS}", self.outcome_round),
            ));
        }
        let Some(secs) = parse_clock(&self.outcome_time) else {
            return Err(FeatureError::malformed(
                row,
                &a,
                format!("unparseable finish time {:?}", self.outcome_time),
            ));
        };
        if secs > ROUND_SECONDS {
            return Err(FeatureError::malformed(
                row,
                &a,
                format!("finish time {} exceeds round length", self.outcome_time),
            ));
        }
        self.finish_secs = secs;

        for corner in Corner::BOTH {
            let fighter = self.fighter(corner).to_string();
            let side = self.stats(corner);
            if side.rounds.len() > usize::from(MAX_ROUNDS) {
                return Err(FeatureError::malformed(
                    row,
                    &fighter,
                    format!("{} round lines recorded", side.rounds.len()),
                ));
            }
            for line in std::iter::once(&side.total).chain(side.rounds.iter()) {
                for (counter, value) in line.paired() {
                    if value.landed > value.attempted {
                        return Err(FeatureError::malformed(
                            row,
                            &fighter,
                            format!(
                                "{} landed {} exceeds attempted {}",
                                counter.key(),
                                value.landed,
                                value.attempted
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Chronologically ordered, validated fights. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct FightTable {
    records: Vec<FightRecord>,
}

impl FightTable {
    /// Stable-sorts by date, assigns indices, and rejects rows that break the input contract.
    pub fn new(mut records: Vec<FightRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.date);
        for (idx, record) in records.iter_mut().enumerate() {
            record.index = idx;
            record.validate(idx)?;
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[FightRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&FightRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FightRecord> {
        self.records.iter()
    }

    /// The first `len` rows as a table of their own.
    pub fn truncated(&self, len: usize) -> FightTable {
        let len = len.min(self.records.len());
        FightTable {
            records: self.records[..len].to_vec(),
        }
    }
}

pub fn parse_clock(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.split_once(':') {
        Some((m, s)) => {
            let minutes = m.trim().parse::<u32>().ok()?;
            let seconds = s.trim().parse::<u32>().ok()?;
            if seconds >= 60 {
                return None;
            }
            minutes.checked_mul(60)?.checked_add(seconds)
        }
        None => raw.parse::<u32>().ok(),
    }
}

/// "3 Rnd (5-5-5)" -> 3. Falls back to a leading integer.
pub fn parse_scheduled_rounds(format: &str) -> Option<u8> {
    if let (Some(open), Some(close)) = (format.find('('), format.rfind(')'))
        && open < close
    {
        let count = format[open + 1..close]
            .split('-')
            .filter(|part| part.trim().parse::<u32>().is_ok())
            .count();
        if count > 0 {
            return u8::try_from(count).ok();
        }
    }
    format
        .split(|ch: char| !ch.is_ascii_digit())
        .find(|s| !s.is_empty())
        .and_then(|s| s.parse::<u8>().ok())
        .filter(|n| *n > 0)
}
