use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{FeatureError, Result};
use crate::fight_table::{Corner, FightRecord, FightTable};
use crate::glicko::{Glicko2Params, RatingState, rate_single};

/// Pre-fight rating triples for both corners of one fight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRow {
    pub index: usize,
    pub fighter_a: RatingState,
    pub fighter_b: RatingState,
}

impl RatingRow {
    pub fn get(&self, corner: Corner) -> RatingState {
        match corner {
            Corner::A => self.fighter_a,
            Corner::B => self.fighter_b,
        }
    }
}

/// Walk-forward Glicko-2 state. Holds each fighter's latest post-fight
/// triple and accepts fights strictly in table order.
#[derive(Debug, Clone, Default)]
pub struct RatingEngine {
    params: Glicko2Params,
    latest: HashMap<String, RatingState>,
    next_index: usize,
}

impl RatingEngine {
    pub fn new(params: Glicko2Params) -> Self {
        Self {
            params,
            latest: HashMap::new(),
            next_index: 0,
        }
    }

    pub fn params(&self) -> &Glicko2Params {
        &self.params
    }

    /// Rating a fighter would carry into their next fight.
    pub fn current(&self, fighter_id: &str) -> RatingState {
        self.latest
            .get(fighter_id)
            .copied()
            .unwrap_or(RatingState::DEFAULT)
    }

    pub fn fighters_rated(&self) -> usize {
        self.latest.len()
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Returns the pre-fight triples and stores the post-fight ones.
    pub fn record(&mut self, fight: &FightRecord) -> Result<RatingRow> {
        if fight.index != self.next_index {
            return Err(FeatureError::Causality {
                row: fight.index,
                expected: self.next_index,
            });
        }
        let row = fight.index;
        let pre_a = self.current(&fight.fighter_a_id);
        let pre_b = self.current(&fight.fighter_b_id);
        check_state(row, &fight.fighter_a_id, &pre_a)?;
        check_state(row, &fight.fighter_b_id, &pre_b)?;

        let post_a = self.rate(fight, Corner::A, pre_a, pre_b)?;
        let post_b = self.rate(fight, Corner::B, pre_b, pre_a)?;

        self.latest.insert(fight.fighter_a_id.clone(), post_a);
        self.latest.insert(fight.fighter_b_id.clone(), post_b);
        self.next_index += 1;

        Ok(RatingRow {
            index: row,
            fighter_a: pre_a,
            fighter_b: pre_b,
        })
    }

    fn rate(
        &self,
        fight: &FightRecord,
        corner: Corner,
        player: RatingState,
        opponent: RatingState,
    ) -> Result<RatingState> {
        let fighter_id = fight.fighter(corner);
        let post = rate_single(player, opponent, fight.score(corner), &self.params).map_err(
            |err| FeatureError::NonConvergence {
                row: fight.index,
                fighter_id: fighter_id.to_string(),
                iterations: err.iterations,
            },
        )?;
        check_state(fight.index, fighter_id, &post)?;
        Ok(post)
    }

    /// One forward pass over the whole table.
    pub fn run(table: &FightTable, params: Glicko2Params) -> Result<Vec<RatingRow>> {
        let started = Instant::now();
        let mut engine = RatingEngine::new(params);
        let mut rows = Vec::with_capacity(table.len());
        for fight in table.iter() {
            let row = engine.record(fight)?;
            if fight.index % 5_000 == 0 {
                debug!(row = fight.index, fighters = engine.fighters_rated(), "rating pass");
            }
            rows.push(row);
        }
        info!(
            rows = rows.len(),
            fighters = engine.fighters_rated(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ratings computed"
        );
        Ok(rows)
    }
}

fn check_state(row: usize, fighter_id: &str, state: &RatingState) -> Result<()> {
    match state.check() {
        None => Ok(()),
        Some(reason) => Err(FeatureError::InvalidRating {
            row,
            fighter_id: fighter_id.to_string(),
            reason: reason.to_string(),
        }),
    }
}
