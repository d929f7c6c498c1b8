use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("causality violation at row {row}: expected row {expected} next")]
    Causality { row: usize, expected: usize },

    #[error(
        "glicko-2 volatility did not converge at row {row} for fighter {fighter_id} after {iterations} iterations"
    )]
    NonConvergence {
        row: usize,
        fighter_id: String,
        iterations: usize,
    },

    #[error("invalid rating state at row {row} for fighter {fighter_id}: {reason}")]
    InvalidRating {
        row: usize,
        fighter_id: String,
        reason: String,
    },

    #[error("malformed input at row {row} (fighter {fighter_id}): {reason}")]
    MalformedInput {
        row: usize,
        fighter_id: String,
        reason: String,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeatureError {
    pub fn malformed(row: usize, fighter_id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            row,
            fighter_id: fighter_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Row index the error refers to, when it refers to one.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Causality { row, .. }
            | Self::NonConvergence { row, .. }
            | Self::InvalidRating { row, .. }
            | Self::MalformedInput { row, .. } => Some(*row),
            Self::Database(_) | Self::Json(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeatureError>;
