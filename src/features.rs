use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::fight_table::{Corner, FightRecord, FightResult, MethodClass};
use crate::history::Window;
use crate::outcomes::{Finish, RecordQuery};
use crate::stats::StatSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatingField {
    Rating,
    Deviation,
    Volatility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CalendarField {
    Year,
    DaySin,
    DayCos,
}

/// Win or loss count restricted by finish, division, format or venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKind {
    pub result: FightResult,
    pub finish: Finish,
    pub division: Option<&'static str>,
    pub scheduled_rounds: Option<u8>,
    /// Only fights held where the current fight is held.
    pub at_location: bool,
}

impl RecordKind {
    pub fn new(result: FightResult) -> Self {
        Self {
            result,
            finish: Finish::Any,
            division: None,
            scheduled_rounds: None,
            at_location: false,
        }
    }

    /// `None` when the venue filter applies but the current fight has no location.
    pub fn query<'q>(&self, current: &'q FightRecord) -> Option<RecordQuery<'q>> {
        let mut query = RecordQuery::new(self.result).finish(self.finish);
        if let Some(division) = self.division {
            query = query.division(division);
        }
        if let Some(rounds) = self.scheduled_rounds {
            query = query.scheduled_rounds(rounds);
        }
        if self.at_location {
            if current.location.trim().is_empty() {
                return None;
            }
            query = query.location(&current.location);
        }
        Some(query)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.result {
            FightResult::Win => write!(f, "wins")?,
            FightResult::Loss => write!(f, "losses")?,
            FightResult::Draw => write!(f, "draws")?,
        }
        if let Some(rounds) = self.scheduled_rounds {
            write!(f, "_{rounds}rd")?;
        }
        match self.finish {
            Finish::Any => {}
            Finish::Decision | Finish::Method(MethodClass::Decision) => write!(f, "_dec")?,
            Finish::InRound(r) => write!(f, "_r{r}")?,
            Finish::Method(MethodClass::KoTko) => write!(f, "_ko")?,
            Finish::Method(MethodClass::Submission) => write!(f, "_sub")?,
            Finish::Method(MethodClass::Other) => write!(f, "_other")?,
        }
        if let Some(division) = self.division {
            write!(f, "_{}", slug(division))?;
        }
        if self.at_location {
            write!(f, "_at_location")?;
        }
        Ok(())
    }
}

/// A per-corner feature family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKind {
    Rating(RatingField),
    Stat { spec: StatSpec, window: Window },
    WinStreak(Window),
    LossStreak(Window),
    Wins(Window),
    Losses(Window),
    HeadToHeadWins,
    Record { kind: RecordKind, window: Window },
    RecentFights,
    WeeksInactive,
    RoundsFought(Window),
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Rating(RatingField::Rating) => write!(f, "glicko_rating"),
            FeatureKind::Rating(RatingField::Deviation) => write!(f, "glicko_deviation"),
            FeatureKind::Rating(RatingField::Volatility) => write!(f, "glicko_volatility"),
            FeatureKind::Stat { spec, window } => write!(f, "{spec}_{}", window.key()),
            FeatureKind::WinStreak(window) => write!(f, "win_streak_{}", window.key()),
            FeatureKind::LossStreak(window) => write!(f, "loss_streak_{}", window.key()),
            FeatureKind::Wins(window) => write!(f, "wins_{}", window.key()),
            FeatureKind::Losses(window) => write!(f, "losses_{}", window.key()),
            FeatureKind::HeadToHeadWins => write!(f, "h2h_wins"),
            FeatureKind::Record { kind, window } => write!(f, "rec_{kind}_{}", window.key()),
            FeatureKind::RecentFights => write!(f, "recent_fights"),
            FeatureKind::WeeksInactive => write!(f, "weeks_inactive"),
            FeatureKind::RoundsFought(window) => write!(f, "rounds_fought_{}", window.key()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKey {
    Fight(CalendarField),
    Corner {
        corner: Corner,
        kind: FeatureKind,
        differential: bool,
    },
}

impl FeatureKey {
    pub fn value(corner: Corner, kind: FeatureKind) -> Self {
        FeatureKey::Corner {
            corner,
            kind,
            differential: false,
        }
    }

    pub fn diff(corner: Corner, kind: FeatureKind) -> Self {
        FeatureKey::Corner {
            corner,
            kind,
            differential: true,
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKey::Fight(CalendarField::Year) => write!(f, "fight_year"),
            FeatureKey::Fight(CalendarField::DaySin) => write!(f, "fight_day_sin"),
            FeatureKey::Fight(CalendarField::DayCos) => write!(f, "fight_day_cos"),
            FeatureKey::Corner {
                corner,
                kind,
                differential,
            } => {
                write!(f, "{}_{kind}", corner.label())?;
                if *differential {
                    write!(f, "_diff")?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered columns. Per-corner kinds expand to `a`, `b`, `a_diff`, `b_diff`.
#[derive(Debug, Clone, Default)]
pub struct FeatureSchema {
    keys: Vec<FeatureKey>,
    positions: HashMap<FeatureKey, usize>,
    kinds: Vec<FeatureKind>,
}

pub const CALENDAR_FIELDS: [CalendarField; 3] =
    [CalendarField::Year, CalendarField::DaySin, CalendarField::DayCos];

impl FeatureSchema {
    pub fn new(kinds: Vec<FeatureKind>) -> Self {
        let mut keys: Vec<FeatureKey> = CALENDAR_FIELDS.iter().map(|c| FeatureKey::Fight(*c)).collect();
        for kind in &kinds {
            keys.push(FeatureKey::value(Corner::A, *kind));
            keys.push(FeatureKey::value(Corner::B, *kind));
            keys.push(FeatureKey::diff(Corner::A, *kind));
            keys.push(FeatureKey::diff(Corner::B, *kind));
        }
        let positions = keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
        Self {
            keys,
            positions,
            kinds,
        }
    }

    pub fn keys(&self) -> &[FeatureKey] {
        &self.keys
    }

    pub fn kinds(&self) -> &[FeatureKind] {
        &self.kinds
    }

    pub fn position(&self, key: &FeatureKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.keys.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub index: usize,
    pub fight_id: String,
    pub values: Vec<f64>,
}

/// Output aligned row-for-row with the fight table.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    schema: FeatureSchema,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(schema: FeatureSchema, rows: Vec<FeatureRow>) -> Self {
        Self { schema, rows }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, key: &FeatureKey) -> Option<f64> {
        let col = self.schema.position(key)?;
        self.rows.get(row)?.values.get(col).copied()
    }

    /// Named map of one row, for JSON storage.
    pub fn named_row(&self, row: usize) -> Option<serde_json::Map<String, serde_json::Value>> {
        let row = self.rows.get(row)?;
        Some(
            self.schema
                .keys()
                .iter()
                .zip(row.values.iter())
                .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
                .collect(),
        )
    }
}

pub fn slug(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fight_table::{Counter, RoundScope};

    #[test]
    fn column_names_are_self_describing() {
        let spec = StatSpec::landed_per_min(Counter::SigStrikes, RoundScope::Round(1));
        let key = FeatureKey::diff(
            Corner::A,
            FeatureKind::Stat {
                spec,
                window: Window::Last(3),
            },
        );
        assert_eq!(key.to_string(), "a_sig_str_landed_per_min_r1_l3_diff");

        let rec = RecordKind {
            finish: Finish::Method(MethodClass::KoTko),
            division: Some("Light Heavyweight"),
            ..RecordKind::new(FightResult::Win)
        };
        let key = FeatureKey::value(
            Corner::B,
            FeatureKind::Record {
                kind: rec,
                window: Window::AllTime,
            },
        );
        assert_eq!(key.to_string(), "b_rec_wins_ko_light_heavyweight_alltime");
    }

    #[test]
    fn schema_expands_each_kind_to_four_columns() {
        let schema = FeatureSchema::new(vec![FeatureKind::HeadToHeadWins, FeatureKind::WeeksInactive]);
        assert_eq!(schema.len(), 3 + 8);
        let names = schema.column_names();
        assert_eq!(&names[3..7], &["a_h2h_wins", "b_h2h_wins", "a_h2h_wins_diff", "b_h2h_wins_diff"]);
        assert_eq!(
            schema.position(&FeatureKey::diff(Corner::B, FeatureKind::WeeksInactive)),
            Some(10)
        );
    }
}
