//! Journal domain types: user identifiers, 0–10 levels, the enumerated
//! answers of the daily form, and the per-day `AnkleRecord`.

use crate::AnkleError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Registered user identifier. Trimmed, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> Result<Self, AnkleError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AnkleError::Validation("identifier must not be empty".into()));
        }
        Ok(UserId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = AnkleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Slider value in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, AnkleError> {
        if !(0..=i64::from(Self::MAX)).contains(&value) {
            return Err(AnkleError::Validation(format!(
                "level {value} out of range 0-{}",
                Self::MAX
            )));
        }
        Ok(Level(value as u8))
    }

    /// Saturating constructor for values known at compile time.
    pub const fn clamp(value: u8) -> Self {
        if value > Self::MAX { Level(Self::MAX) } else { Level(value) }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Level {
    type Error = AnkleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Level::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of textual answers. Parsing ignores case, `-`, `_` and spaces,
/// so `coldPack`, `cold_pack` and `cold-pack` name the same value.
pub trait Choice: Sized + Copy + 'static {
    const KIND: &'static str;
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse_choice(input: &str) -> Result<Self, AnkleError> {
        let wanted = fold(input);
        Self::ALL
            .iter()
            .copied()
            .find(|c| fold(c.as_str()) == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                AnkleError::Validation(format!(
                    "{}: unknown value {:?} (expected one of {})",
                    Self::KIND,
                    input.trim(),
                    names.join(", ")
                ))
            })
    }
}

fn fold(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! text_choice {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = AnkleError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as Choice>::parse_choice(s)
            }
        }
    };
}

/// Yes/no answer shown as `none` / `occurred`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Occurrence {
    #[default]
    #[serde(rename = "none")]
    Absent,
    Occurred,
}

impl Occurrence {
    pub fn occurred(self) -> bool {
        self == Occurrence::Occurred
    }
}

impl Choice for Occurrence {
    const KIND: &'static str = "occurrence";
    const ALL: &'static [Self] = &[Occurrence::Absent, Occurrence::Occurred];

    fn as_str(self) -> &'static str {
        match self {
            Occurrence::Absent => "none",
            Occurrence::Occurred => "occurred",
        }
    }
}
text_choice!(Occurrence);

/// Care taken for the ankle that day. Declaration order is the storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManagementAction {
    Taping,
    Brace,
    ColdPack,
    HeatPack,
    Stretching,
    Massage,
}

impl Choice for ManagementAction {
    const KIND: &'static str = "management";
    const ALL: &'static [Self] = &[
        ManagementAction::Taping,
        ManagementAction::Brace,
        ManagementAction::ColdPack,
        ManagementAction::HeatPack,
        ManagementAction::Stretching,
        ManagementAction::Massage,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ManagementAction::Taping => "taping",
            ManagementAction::Brace => "brace",
            ManagementAction::ColdPack => "cold-pack",
            ManagementAction::HeatPack => "heat-pack",
            ManagementAction::Stretching => "stretching",
            ManagementAction::Massage => "massage",
        }
    }
}
text_choice!(ManagementAction);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Footwear {
    #[default]
    Sneakers,
    DressShoes,
    Sandals,
    Barefoot,
    Boots,
}

impl Choice for Footwear {
    const KIND: &'static str = "footwear";
    const ALL: &'static [Self] = &[
        Footwear::Sneakers,
        Footwear::DressShoes,
        Footwear::Sandals,
        Footwear::Barefoot,
        Footwear::Boots,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Footwear::Sneakers => "sneakers",
            Footwear::DressShoes => "dress-shoes",
            Footwear::Sandals => "sandals",
            Footwear::Barefoot => "barefoot",
            Footwear::Boots => "boots",
        }
    }
}
text_choice!(Footwear);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Surface {
    #[default]
    Flat,
    Stairs,
    Slope,
    Uneven,
    Slippery,
}

impl Choice for Surface {
    const KIND: &'static str = "surface";
    const ALL: &'static [Self] = &[
        Surface::Flat,
        Surface::Stairs,
        Surface::Slope,
        Surface::Uneven,
        Surface::Slippery,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Surface::Flat => "flat",
            Surface::Stairs => "stairs",
            Surface::Slope => "slope",
            Surface::Uneven => "uneven",
            Surface::Slippery => "slippery",
        }
    }
}
text_choice!(Surface);

/// Set of management actions, persisted as `"taping, cold-pack"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Management(BTreeSet<ManagementAction>);

impl Management {
    pub const SEPARATOR: &'static str = ", ";

    pub fn parse_list(text: &str) -> Result<Self, AnkleError> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ManagementAction::parse_choice)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Management)
    }

    pub fn to_text(&self) -> String {
        self.0
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ManagementAction> for Management {
    fn from_iter<I: IntoIterator<Item = ManagementAction>>(iter: I) -> Self {
        Management(iter.into_iter().collect())
    }
}

impl TryFrom<String> for Management {
    type Error = AnkleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Management::parse_list(&value)
    }
}

impl From<Management> for String {
    fn from(m: Management) -> Self {
        m.to_text()
    }
}

impl fmt::Display for Management {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// One day of the journal. Unique per (user, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnkleRecord {
    pub date: NaiveDate,
    pub instability: Level,
    pub pain: Level,
    pub activity: Level,
    pub sprain: Occurrence,
    pub balance: Occurrence,
    #[serde(default)]
    pub management: Management,
    pub footwear: Footwear,
    pub surface: Surface,
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(text: &str) -> Result<NaiveDate, AnkleError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| AnkleError::Validation(format!("invalid date: {text} (expected YYYY-MM-DD)")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_trims_and_rejects_empty() {
        assert_eq!(UserId::parse("  alice ").unwrap().as_str(), "alice");
        assert!(matches!(UserId::parse("   "), Err(AnkleError::Validation(_))));
        assert!(UserId::parse("").is_err());
    }

    #[test]
    fn level_bounds() {
        assert_eq!(Level::new(0).unwrap().get(), 0);
        assert_eq!(Level::new(10).unwrap().get(), 10);
        assert!(Level::new(11).is_err());
        assert!(Level::new(-1).is_err());
        assert_eq!(Level::clamp(40).get(), 10);
    }

    #[test]
    fn choices_parse_loosely() {
        assert_eq!("coldPack".parse::<ManagementAction>().unwrap(), ManagementAction::ColdPack);
        assert_eq!("cold_pack".parse::<ManagementAction>().unwrap(), ManagementAction::ColdPack);
        assert_eq!("Dress Shoes".parse::<Footwear>().unwrap(), Footwear::DressShoes);
        assert_eq!("none".parse::<Occurrence>().unwrap(), Occurrence::Absent);
        assert!("mud".parse::<Surface>().is_err());
    }

    #[test]
    fn management_is_ordered_and_deduplicated() {
        let m = Management::parse_list("massage, taping,  coldPack, taping").unwrap();
        assert_eq!(m.to_text(), "taping, cold-pack, massage");
        assert!(Management::parse_list("").unwrap().is_empty());
        assert!(Management::parse_list("taping, yoga").is_err());
    }

    #[test]
    fn record_json_shape() {
        let record = AnkleRecord {
            date: parse_date("2026-03-01").unwrap(),
            instability: Level::new(7).unwrap(),
            pain: Level::new(8).unwrap(),
            activity: Level::new(3).unwrap(),
            sprain: Occurrence::Occurred,
            balance: Occurrence::Absent,
            management: Management::parse_list("taping, cold-pack").unwrap(),
            footwear: Footwear::DressShoes,
            surface: Surface::Flat,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2026-03-01");
        assert_eq!(json["pain"], 8);
        assert_eq!(json["sprain"], "occurred");
        assert_eq!(json["balance"], "none");
        assert_eq!(json["management"], "taping, cold-pack");
        assert_eq!(json["footwear"], "dress-shoes");

        let back: AnkleRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_json_rejects_out_of_range_level() {
        let json = serde_json::json!({
            "date": "2026-03-01", "instability": 12, "pain": 1, "activity": 1,
            "sprain": "none", "balance": "none", "management": "",
            "footwear": "boots", "surface": "slope"
        });
        assert!(serde_json::from_value::<AnkleRecord>(json).is_err());
    }
}
