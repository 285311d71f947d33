//! The eighteen skills and their governing abilities.

use serde::{Deserialize, Serialize};

use super::Ability;

/// A skill id. Serialized in camelCase to match the persisted record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    /// The ability score this skill rolls against.
    pub fn ability(&self) -> Ability {
        match self {
            Skill::Athletics => Ability::Str,
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Ability::Dex,
            Skill::Arcana | Skill::History | Skill::Investigation | Skill::Nature
            | Skill::Religion => Ability::Int,
            Skill::AnimalHandling
            | Skill::Insight
            | Skill::Medicine
            | Skill::Perception
            | Skill::Survival => Ability::Wis,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => {
                Ability::Cha
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Skill::Acrobatics => "Acrobatics",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Arcana => "Arcana",
            Skill::Athletics => "Athletics",
            Skill::Deception => "Deception",
            Skill::History => "History",
            Skill::Insight => "Insight",
            Skill::Intimidation => "Intimidation",
            Skill::Investigation => "Investigation",
            Skill::Medicine => "Medicine",
            Skill::Nature => "Nature",
            Skill::Perception => "Perception",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
            Skill::Religion => "Religion",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Survival => "Survival",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_ids_are_camel_case() {
        assert_eq!(
            serde_json::to_string(&Skill::SleightOfHand).unwrap(),
            "\"sleightOfHand\""
        );
        assert_eq!(
            serde_json::to_string(&Skill::AnimalHandling).unwrap(),
            "\"animalHandling\""
        );
    }

    #[test]
    fn governing_abilities_match_the_sheet() {
        assert_eq!(Skill::Athletics.ability(), Ability::Str);
        assert_eq!(Skill::Stealth.ability(), Ability::Dex);
        assert_eq!(Skill::Perception.ability(), Ability::Wis);
        assert_eq!(Skill::Persuasion.ability(), Ability::Cha);
        assert_eq!(Skill::Arcana.ability(), Ability::Int);
    }
}
