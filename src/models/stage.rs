//! Stage result payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Leader's jersey awarded after a stage.
///
/// Keys are matched case-insensitively; English names are accepted as
/// aliases. Any other key is kept as [`Jersey::Other`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Jersey {
    /// General classification
    Geel,
    /// Points classification
    Groen,
    /// Mountains classification
    Bolletjes,
    /// Youth classification
    Wit,
    /// Any other jersey, scored like the youth jersey
    Other(String),
}

impl Jersey {
    /// Bonus points added to the holder's stage slot.
    ///
    /// Fixed values, unlike the placement tables in the scoring config.
    pub fn bonus(&self) -> u32 {
        match self {
            Jersey::Geel => 10,
            Jersey::Groen | Jersey::Bolletjes => 5,
            Jersey::Wit | Jersey::Other(_) => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Jersey::Geel => "geel",
            Jersey::Groen => "groen",
            Jersey::Bolletjes => "bolletjes",
            Jersey::Wit => "wit",
            Jersey::Other(key) => key,
        }
    }
}

impl From<String> for Jersey {
    fn from(key: String) -> Self {
        let key = key.trim().to_lowercase();
        match key.as_str() {
            "geel" | "yellow" => Jersey::Geel,
            "groen" | "green" => Jersey::Groen,
            "bolletjes" | "polka" => Jersey::Bolletjes,
            "wit" | "white" => Jersey::Wit,
            _ => Jersey::Other(key),
        }
    }
}

impl From<Jersey> for String {
    fn from(jersey: Jersey) -> Self {
        match jersey {
            Jersey::Other(key) => key,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Jersey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finisher in a stage's scoring positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placing {
    /// Finishing position (1 = winner)
    pub position: u32,

    pub rider: String,

    /// Points for this placing. Filled from the scoring table when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

impl Placing {
    pub fn new(position: u32, rider: impl Into<String>, points: u32) -> Self {
        Self {
            position,
            rider: rider.into(),
            points: Some(points),
        }
    }

    /// Placing without explicit points.
    pub fn unscored(position: u32, rider: impl Into<String>) -> Self {
        Self {
            position,
            rider: rider.into(),
            points: None,
        }
    }
}

/// Holder of a jersey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JerseyHolder {
    pub rider: String,
}

/// Results for one stage: scoring placings, jersey holders and dropouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage number, 1-21, or 22 for the final classification
    pub stage: u32,

    #[serde(default)]
    pub top10: Vec<Placing>,

    #[serde(default)]
    pub jerseys: BTreeMap<Jersey, JerseyHolder>,

    #[serde(default)]
    pub dropouts: Vec<String>,
}

impl StageResult {
    pub fn new(stage: u32) -> Self {
        Self {
            stage,
            top10: Vec::new(),
            jerseys: BTreeMap::new(),
            dropouts: Vec::new(),
        }
    }

    /// Builder method to add a placing.
    pub fn with_placing(mut self, position: u32, rider: &str, points: u32) -> Self {
        self.top10.push(Placing::new(position, rider, points));
        self
    }

    /// Builder method to award a jersey.
    pub fn with_jersey(mut self, jersey: Jersey, rider: &str) -> Self {
        self.jerseys.insert(
            jersey,
            JerseyHolder {
                rider: rider.to_string(),
            },
        );
        self
    }

    /// Builder method to add a dropout.
    pub fn with_dropout(mut self, rider: &str) -> Self {
        self.dropouts.push(rider.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jersey_bonus_values() {
        assert_eq!(Jersey::Geel.bonus(), 10);
        assert_eq!(Jersey::Groen.bonus(), 5);
        assert_eq!(Jersey::Bolletjes.bonus(), 5);
        assert_eq!(Jersey::Wit.bonus(), 3);
    }

    #[test]
    fn test_jersey_accepts_english_aliases() {
        let j: Jersey = serde_json::from_str("\"yellow\"").unwrap();
        assert_eq!(j, Jersey::Geel);
        let j: Jersey = serde_json::from_str("\"polka\"").unwrap();
        assert_eq!(j, Jersey::Bolletjes);
        let j: Jersey = serde_json::from_str("\"Groen\"").unwrap();
        assert_eq!(j, Jersey::Groen);
        assert_eq!(serde_json::to_string(&Jersey::Wit).unwrap(), "\"wit\"");
    }

    #[test]
    fn test_unknown_jersey_kept_and_scored_as_white() {
        let result: StageResult =
            serde_json::from_str(r#"{"stage": 1, "jerseys": {"rood": {"rider": "X"}}}"#).unwrap();

        let rood = Jersey::Other("rood".to_string());
        assert_eq!(result.jerseys[&rood].rider, "X");
        assert_eq!(rood.bonus(), 3);
        assert_eq!(rood.to_string(), "rood");

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"rood\""));
        let back: StageResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_stage_result_parses_full_payload() {
        let json = r#"{
            "stage": 4,
            "top10": [
                {"position": 1, "rider": "Jasper Philipsen", "points": 30},
                {"position": 2, "rider": "Biniam Girmay"}
            ],
            "jerseys": {
                "geel": {"rider": "Tadej Pogačar"},
                "green": {"rider": "Biniam Girmay"}
            },
            "dropouts": ["Fabio Jakobsen"]
        }"#;

        let result: StageResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.stage, 4);
        assert_eq!(result.top10.len(), 2);
        assert_eq!(result.top10[1].points, None);
        assert_eq!(result.jerseys[&Jersey::Groen].rider, "Biniam Girmay");
        assert_eq!(result.dropouts, vec!["Fabio Jakobsen"]);
    }

    #[test]
    fn test_stage_result_optional_sections_default_empty() {
        let result: StageResult = serde_json::from_str(r#"{"stage": 1}"#).unwrap();
        assert!(result.top10.is_empty());
        assert!(result.jerseys.is_empty());
        assert!(result.dropouts.is_empty());
    }
}
