//! Seeded fight histories for property tests and benchmarks.

use chrono::{NaiveDate, TimeDelta};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::WEIGHT_CLASSES;
use crate::config::{MAX_ROUNDS, ROUND_SECONDS};
use crate::error::Result;
use crate::fight_table::{Attempts, FightRecord, FightTable, SideStats, StatLine};

const LOCATIONS: [&str; 5] = [
    "Las Vegas, Nevada, USA",
    "Abu Dhabi, Abu Dhabi, United Arab Emirates",
    "London, England, United Kingdom",
    "Sydney, New South Wales, Australia",
    "Newark, New Jersey, USA",
];

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub fighters: usize,
    pub fights: usize,
    pub seed: u64,
    pub start: NaiveDate,
    pub draw_rate: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            fighters: 60,
            fights: 400,
            seed: 7,
            start: NaiveDate::from_ymd_opt(2015, 1, 3).unwrap_or(NaiveDate::MIN),
            draw_rate: 0.02,
        }
    }
}

pub fn generate(cfg: &SyntheticConfig) -> Vec<FightRecord> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let fighters: Vec<String> = (0..cfg.fighters.max(2)).map(|i| format!("fighter-{i:04}")).collect();
    let mut date = cfg.start;
    let mut out = Vec::with_capacity(cfg.fights);

    for n in 0..cfg.fights {
        if rng.gen_bool(0.3) {
            date += TimeDelta::days(rng.gen_range(1..=14));
        }
        let mut pair = fighters.choose_multiple(&mut rng, 2);
        let (Some(a), Some(b)) = (pair.next(), pair.next()) else {
            continue;
        };

        let scheduled: u8 = if rng.gen_bool(0.15) { MAX_ROUNDS } else { 3 };
        let (method, round, secs) = match rng.gen_range(0..10) {
            0..=4 => ("Decision - Unanimous", scheduled, ROUND_SECONDS),
            5 => ("Decision - Split", scheduled, ROUND_SECONDS),
            6 | 7 => (
                "KO/TKO",
                rng.gen_range(1..=scheduled),
                rng.gen_range(5..=ROUND_SECONDS),
            ),
            _ => (
                "Submission",
                rng.gen_range(1..=scheduled),
                rng.gen_range(5..=ROUND_SECONDS),
            ),
        };
        let winner = if method.starts_with("Decision") && rng.gen_bool(cfg.draw_rate) {
            None
        } else if rng.gen_bool(0.5) {
            Some(a.as_str())
        } else {
            Some(b.as_str())
        };

        let mut record = FightRecord::new(
            format!("bout-{n:06}"),
            date,
            a.as_str(),
            b.as_str(),
            winner,
            method,
            round,
            format!("{}:{:02}", secs / 60, secs % 60),
        );
        record.division = WEIGHT_CLASSES
            .choose(&mut rng)
            .map(|d| d.to_string())
            .unwrap_or_default();
        record.location = LOCATIONS
            .choose(&mut rng)
            .map(|l| l.to_string())
            .unwrap_or_default();
        record.outcome_format = if scheduled == MAX_ROUNDS {
            "5 Rnd (5-5-5-5-5)".to_string()
        } else {
            "3 Rnd (5-5-5)".to_string()
        };
        record.fighter_a_stats = side_stats(&mut rng, round);
        record.fighter_b_stats = side_stats(&mut rng, round);
        out.push(record);
    }
    out
}

pub fn synthetic_table(cfg: &SyntheticConfig) -> Result<FightTable> {
    FightTable::new(generate(cfg))
}

fn side_stats(rng: &mut impl Rng, rounds: u8) -> SideStats {
    let mut side = SideStats::default();
    for _ in 0..rounds {
        let line = round_line(rng);
        accumulate(&mut side.total, &line);
        side.rounds.push(line);
    }
    side
}

fn attempts(rng: &mut impl Rng, max_attempted: u32) -> Attempts {
    let attempted = rng.gen_range(0..=max_attempted);
    Attempts::new(rng.gen_range(0..=attempted), attempted)
}

fn round_line(rng: &mut impl Rng) -> StatLine {
    let head = attempts(rng, 30);
    let body = attempts(rng, 12);
    let leg = attempts(rng, 10);
    let sig = Attempts::new(
        head.landed + body.landed + leg.landed,
        head.attempted + body.attempted + leg.attempted,
    );
    let ground = attempts(rng, sig.attempted / 3);
    let clinch = attempts(rng, (sig.attempted - ground.attempted) / 3);
    let distance = Attempts::new(
        sig.landed.saturating_sub(ground.landed + clinch.landed),
        sig.attempted - ground.attempted - clinch.attempted,
    );
    StatLine {
        knockdowns: u32::from(rng.gen_bool(0.05)),
        sig_strikes: sig,
        total_strikes: Attempts::new(sig.landed + rng.gen_range(0..8), sig.attempted + rng.gen_range(8..16)),
        takedowns: attempts(rng, 4),
        submission_attempts: rng.gen_range(0..=1),
        reversals: u32::from(rng.gen_bool(0.05)),
        control_secs: rng.gen_range(0..=ROUND_SECONDS / 2),
        head,
        body,
        leg,
        distance: Attempts::new(distance.landed.min(distance.attempted), distance.attempted),
        clinch,
        ground,
    }
}

fn accumulate(total: &mut StatLine, line: &StatLine) {
    fn add(into: &mut Attempts, from: Attempts) {
        into.landed += from.landed;
        into.attempted += from.attempted;
    }
    total.knockdowns += line.knockdowns;
    add(&mut total.sig_strikes, line.sig_strikes);
    add(&mut total.total_strikes, line.total_strikes);
    add(&mut total.takedowns, line.takedowns);
    total.submission_attempts += line.submission_attempts;
    total.reversals += line.reversals;
    total.control_secs += line.control_secs;
    add(&mut total.head, line.head);
    add(&mut total.body, line.body);
    add(&mut total.leg, line.leg);
    add(&mut total.distance, line.distance);
    add(&mut total.clinch, line.clinch);
    add(&mut total.ground, line.ground);
}
