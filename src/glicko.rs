//! Single-game Glicko-2 update. One fight is one rating period with one opponent.

use std::f64::consts::{LN_10, PI};

use thiserror::Error;

/// Display-scale factor, `400 / ln 10`.
pub const GLICKO_SCALE: f64 = 400.0 / LN_10;
pub const RATING_INIT: f64 = 1500.0;
pub const DEVIATION_INIT: f64 = 350.0;
pub const VOLATILITY_INIT: f64 = 0.06;
pub const TAU: f64 = 0.5;
pub const EPSILON: f64 = 1e-6;
pub const MAX_ITERATIONS: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glicko2Params {
    pub tau: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl Default for Glicko2Params {
    fn default() -> Self {
        Self {
            tau: TAU,
            epsilon: EPSILON,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingState {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl RatingState {
    pub const DEFAULT: RatingState = RatingState {
        rating: RATING_INIT,
        deviation: DEVIATION_INIT,
        volatility: VOLATILITY_INIT,
    };

    /// Returns the violated precondition, if any.
    pub fn check(&self) -> Option<&'static str> {
        if !self.rating.is_finite() {
            Some("rating is not finite")
        } else if !self.deviation.is_finite() || self.deviation <= 0.0 {
            Some("deviation must be finite and positive")
        } else if !self.volatility.is_finite() || self.volatility <= 0.0 {
            Some("volatility must be finite and positive")
        } else {
            None
        }
    }

    fn mu(&self) -> f64 {
        (self.rating - RATING_INIT) / GLICKO_SCALE
    }

    fn phi(&self) -> f64 {
        self.deviation / GLICKO_SCALE
    }
}

impl Default for RatingState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("volatility root-find did not converge after {iterations} iterations")]
pub struct VolatilityDiverged {
    pub iterations: usize,
}

fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

fn expected(mu: f64, mu_opp: f64, g_opp: f64) -> f64 {
    1.0 / (1.0 + (-g_opp * (mu - mu_opp)).exp())
}

/// Expected score of `player` against `opponent` on the display scale.
pub fn expected_score(player: RatingState, opponent: RatingState) -> f64 {
    expected(player.mu(), opponent.mu(), g(opponent.phi()))
}

/// Post-game state of `player` after scoring `score` (1 win, 0 loss, 0.5 draw)
/// against `opponent`. Both inputs are pre-game states.
pub fn rate_single(
    player: RatingState,
    opponent: RatingState,
    score: f64,
    params: &Glicko2Params,
) -> Result<RatingState, VolatilityDiverged> {
    let mu = player.mu();
    let phi = player.phi();
    let g_opp = g(opponent.phi());
    let e = expected(mu, opponent.mu(), g_opp);
    let v = 1.0 / (g_opp * g_opp * e * (1.0 - e));
    let delta = v * g_opp * (score - e);

    let sigma = new_volatility(phi, player.volatility, v, delta, params)?;

    let phi_star = (phi * phi + sigma * sigma).sqrt();
    let phi_new = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
    let mu_new = mu + phi_new * phi_new * g_opp * (score - e);

    Ok(RatingState {
        rating: GLICKO_SCALE * mu_new + RATING_INIT,
        deviation: GLICKO_SCALE * phi_new,
        volatility: sigma,
    })
}

/// Illinois regula falsi on `ln σ²`.
fn new_volatility(
    phi: f64,
    sigma: f64,
    v: f64,
    delta: f64,
    params: &Glicko2Params,
) -> Result<f64, VolatilityDiverged> {
    let a = (sigma * sigma).ln();
    let tau = params.tau;
    let phi_sq = phi * phi;
    let delta_sq = delta * delta;
    let f = |x: f64| {
        let ex = x.exp();
        let denom = phi_sq + v + ex;
        ex * (delta_sq - phi_sq - v - ex) / (2.0 * denom * denom) - (x - a) / (tau * tau)
    };

    let mut iterations = 0usize;
    let mut lo = a;
    let mut hi = if delta_sq > phi_sq + v {
        (delta_sq - phi_sq - v).ln()
    } else {
        let mut k = 1.0;
        while f(a - k * tau) < 0.0 {
            iterations += 1;
            if iterations >= params.max_iterations {
                return Err(VolatilityDiverged { iterations });
            }
            k += 1.0;
        }
        a - k * tau
    };

    let mut f_lo = f(lo);
    let mut f_hi = f(hi);
    while !((hi - lo).abs() <= params.epsilon) {
        iterations += 1;
        if iterations >= params.max_iterations {
            return Err(VolatilityDiverged { iterations });
        }
        let c = lo + (lo - hi) * f_lo / (f_hi - f_lo);
        if !c.is_finite() {
            return Err(VolatilityDiverged { iterations });
        }
        let f_c = f(c);
        if f_c * f_hi <= 0.0 {
            lo = hi;
            f_lo = f_hi;
        } else {
            f_lo /= 2.0;
        }
        hi = c;
        f_hi = f_c;
    }

    let sigma_new = (lo / 2.0).exp();
    if sigma_new.is_finite() {
        Ok(sigma_new)
    } else {
        Err(VolatilityDiverged { iterations })
    }
}
