use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A player as described by the caller. Never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub name: String,
    /// Free-form position label, e.g. "QB", "RB", "WR", "TE"
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub years_exp: Option<u32>,
    #[serde(default)]
    pub team_abbr: Option<String>,
}

/// Coarse position groups the models branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionGroup {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Kicker,
    Other,
}

impl PositionGroup {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "qb" | "quarterback" => PositionGroup::Quarterback,
            "rb" | "hb" | "fb" | "running back" | "runningback" | "halfback" | "fullback" => {
                PositionGroup::RunningBack
            }
            "wr" | "wide receiver" | "receiver" => PositionGroup::WideReceiver,
            "te" | "tight end" => PositionGroup::TightEnd,
            "k" | "p" | "kicker" | "punter" => PositionGroup::Kicker,
            _ => PositionGroup::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionGroup::Quarterback => "QB",
            PositionGroup::RunningBack => "RB",
            PositionGroup::WideReceiver => "WR",
            PositionGroup::TightEnd => "TE",
            PositionGroup::Kicker => "K",
            PositionGroup::Other => "OTHER",
        }
    }
}

impl PlayerProfile {
    pub fn position_group(&self) -> PositionGroup {
        PositionGroup::from_label(&self.position)
    }

    pub fn is_quarterback(&self) -> bool {
        self.position_group() == PositionGroup::Quarterback
    }
}

/// One quarterback season of passing aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QbSeason {
    pub season: i32,
    pub games: u32,
    pub attempts: u32,
    pub completions: u32,
    pub passing_yards: f64,
    pub passing_tds: f64,
    pub interceptions: f64,
}

/// One rushing/receiving season for any ball carrier or pass catcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillSeason {
    pub season: i32,
    pub games: u32,
    pub rushing_attempts: u32,
    pub rushing_yards: f64,
    pub rushing_tds: f64,
    pub targets: u32,
    pub receptions: f64,
    pub receiving_yards: f64,
    pub receiving_tds: f64,
}

impl SkillSeason {
    pub fn scrimmage_yards(&self) -> f64 {
        self.rushing_yards + self.receiving_yards
    }

    pub fn total_tds(&self) -> f64 {
        self.rushing_tds + self.receiving_tds
    }

    pub fn touches(&self) -> f64 {
        self.rushing_attempts as f64 + self.receptions
    }
}

/// Per-player record as stored in a dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSeasons<S> {
    pub player_name: String,
    pub position: Option<String>,
    pub seasons: Vec<S>,
}

impl<S> Default for PlayerSeasons<S> {
    fn default() -> Self {
        PlayerSeasons {
            player_name: String::new(),
            position: None,
            seasons: Vec::new(),
        }
    }
}

/// A historical season-statistics dataset keyed by normalized player name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeasonDataset<S> {
    /// Most recent season present in the file; 0 when unknown.
    pub latest_season: i32,
    pub players: HashMap<String, PlayerSeasons<S>>,
}

impl<S> Default for SeasonDataset<S> {
    fn default() -> Self {
        SeasonDataset {
            latest_season: 0,
            players: HashMap::new(),
        }
    }
}

impl<S> SeasonDataset<S> {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Look up a player by display name, tolerating case, punctuation and suffixes.
    pub fn player(&self, name: &str) -> Option<&PlayerSeasons<S>> {
        self.players.get(&normalize_player_name(name))
    }
}

pub type QbDataset = SeasonDataset<QbSeason>;
pub type SkillDataset = SeasonDataset<SkillSeason>;

const NAME_SUFFIXES: [&str; 5] = ["jr", "sr", "ii", "iii", "iv"];

/// Canonical dataset key for a player name: "Patrick Mahomes II" -> "patrick mahomes".
pub fn normalize_player_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            '.' | '\'' | '\u{2019}' => None,
            c if c.is_alphanumeric() => Some(c),
            _ => Some(' '),
        })
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let keep = tokens
        .iter()
        .rposition(|t| !NAME_SUFFIXES.contains(t))
        .map(|i| i + 1)
        .unwrap_or(0);
    tokens[..keep].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_name_normalization_strips_suffixes_and_punctuation() {
        assert_eq!(normalize_player_name("Patrick Mahomes II"), "patrick mahomes");
        assert_eq!(normalize_player_name("Ja'Marr Chase"), "jamarr chase");
        assert_eq!(normalize_player_name("  Odell  Beckham Jr. "), "odell beckham");
        assert_eq!(normalize_player_name("C.J. Stroud"), "cj stroud");
    }

    #[test]
    fn position_labels_map_to_groups() {
        assert_eq!(PositionGroup::from_label("qb"), PositionGroup::Quarterback);
        assert_eq!(PositionGroup::from_label("Running Back"), PositionGroup::RunningBack);
        assert_eq!(PositionGroup::from_label("WR"), PositionGroup::WideReceiver);
        assert_eq!(PositionGroup::from_label("LB"), PositionGroup::Other);
    }

    #[test]
    fn dataset_deserializes_with_missing_fields() {
        let raw = r#"{
            "latestSeason": 2024,
            "players": {
                "sample passer": {
                    "playerName": "Sample Passer",
                    "seasons": [{"season": 2024, "games": 17, "passingTds": 30}]
                }
            }
        }"#;
        let ds: QbDataset = serde_json::from_str(raw).expect("valid dataset");
        let p = ds.player("Sample Passer").expect("player present");
        assert_eq!(p.seasons[0].attempts, 0);
        assert_eq!(p.seasons[0].passing_tds, 30.0);
    }
}
