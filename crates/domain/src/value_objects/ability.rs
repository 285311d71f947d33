//! The six ability scores and their modifiers.

use serde::{Deserialize, Serialize};

/// One of the six core ability codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "STR")]
    Str,
    #[serde(rename = "DEX")]
    Dex,
    #[serde(rename = "CON")]
    Con,
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "WIS")]
    Wis,
    #[serde(rename = "CHA")]
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// The three-letter code used in persisted data and display.
    pub fn code(&self) -> &'static str {
        match self {
            Ability::Str => "STR",
            Ability::Dex => "DEX",
            Ability::Con => "CON",
            Ability::Int => "INT",
            Ability::Wis => "WIS",
            Ability::Cha => "CHA",
        }
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Ability modifier: `floor((score - 10) / 2)`.
///
/// Uses euclidean division so negative differences round toward negative
/// infinity (score 9 is -1, not 0).
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// The six raw ability scores, domain `[1, 30]` after derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScores {
    #[serde(rename = "STR")]
    pub strength: i32,
    #[serde(rename = "DEX")]
    pub dexterity: i32,
    #[serde(rename = "CON")]
    pub constitution: i32,
    #[serde(rename = "INT")]
    pub intelligence: i32,
    #[serde(rename = "WIS")]
    pub wisdom: i32,
    #[serde(rename = "CHA")]
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        match ability {
            Ability::Str => self.strength = score,
            Ability::Dex => self.dexterity = score,
            Ability::Con => self.constitution = score,
            Ability::Int => self.intelligence = score,
            Ability::Wis => self.wisdom = score,
            Ability::Cha => self.charisma = score,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }
}

/// Saving-throw proficiency flags, one per ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveProficiencies {
    #[serde(rename = "STR")]
    pub strength: bool,
    #[serde(rename = "DEX")]
    pub dexterity: bool,
    #[serde(rename = "CON")]
    pub constitution: bool,
    #[serde(rename = "INT")]
    pub intelligence: bool,
    #[serde(rename = "WIS")]
    pub wisdom: bool,
    #[serde(rename = "CHA")]
    pub charisma: bool,
}

impl SaveProficiencies {
    pub fn get(&self, ability: Ability) -> bool {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, proficient: bool) {
        match ability {
            Ability::Str => self.strength = proficient,
            Ability::Dex => self.dexterity = proficient,
            Ability::Con => self.constitution = proficient,
            Ability::Int => self.intelligence = proficient,
            Ability::Wis => self.wisdom = proficient,
            Ability::Cha => self.charisma = proficient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_rounds_toward_negative_infinity() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(12), 1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(30), 10);
    }

    #[test]
    fn ability_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Ability::Cha).unwrap(), "\"CHA\"");
    }

    #[test]
    fn scores_round_trip_with_codes_as_keys() {
        let scores = AbilityScores {
            charisma: 16,
            ..Default::default()
        };
        let json = serde_json::to_string(&scores).unwrap();
        assert!(json.contains("\"CHA\":16"));
        let back: AbilityScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scores);
    }

    #[test]
    fn partial_scores_fill_defaults() {
        let scores: AbilityScores = serde_json::from_str(r#"{"CON":14}"#).unwrap();
        assert_eq!(scores.constitution, 14);
        assert_eq!(scores.strength, 10);
    }
}
