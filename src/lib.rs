pub mod activity;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod fight_table;
pub mod glicko;
pub mod history;
pub mod outcomes;
pub mod pipeline;
pub mod ratings;
pub mod stats;
pub mod store;
pub mod synthetic;

pub use error::{FeatureError, Result};
pub use fight_table::{FightRecord, FightTable};
pub use history::{HistoryIndex, Window, WindowSelector};
pub use ratings::{RatingEngine, RatingRow};
pub use stats::{StatSpec, WindowedStatAggregator};
