use std::env;
use std::path::PathBuf;

use chrono::TimeDelta;

pub const ROUND_SECONDS: u32 = 300;
pub const MAX_ROUNDS: u8 = 5;

pub const DEFAULT_LAST_YEAR_DAYS: i64 = 365;
pub const DEFAULT_RECENT_DAYS: i64 = 182;
pub const DEFAULT_DB_FILE: &str = "fights.sqlite";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub db_path: PathBuf,
    pub export_path: Option<PathBuf>,
    pub log_level: String,
    /// Worker threads for the per-row feature pass; `None` uses rayon's global pool.
    pub threads: Option<usize>,
    pub last_year_days: i64,
    pub recent_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            export_path: None,
            log_level: "info".to_string(),
            threads: None,
            last_year_days: DEFAULT_LAST_YEAR_DAYS,
            recent_days: DEFAULT_RECENT_DAYS,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("FIGHTS_DB_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            export_path: env::var("FEATURE_EXPORT_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            threads: env::var("FEATURE_THREADS")
                .ok()
                .and_then(|val| val.parse::<usize>().ok())
                .map(|n| n.clamp(1, 64)),
            last_year_days: env::var("FEATURE_LAST_YEAR_DAYS")
                .ok()
                .and_then(|val| val.parse::<i64>().ok())
                .unwrap_or(DEFAULT_LAST_YEAR_DAYS)
                .clamp(1, 3650),
            recent_days: env::var("FEATURE_RECENT_DAYS")
                .ok()
                .and_then(|val| val.parse::<i64>().ok())
                .unwrap_or(DEFAULT_RECENT_DAYS)
                .clamp(1, 3650),
        }
    }

    pub fn last_year(&self) -> TimeDelta {
        TimeDelta::days(self.last_year_days)
    }

    pub fn recent(&self) -> TimeDelta {
        TimeDelta::days(self.recent_days)
    }
}
