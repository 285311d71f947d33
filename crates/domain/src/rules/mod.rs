//! Static rule tables.
//!
//! Everything data-shaped lives here: class progressions, subclasses,
//! backgrounds, races, feats, and the spell catalog. Tables load once at
//! startup ([`RuleTables::load_json`] fails fast on malformed data) or come
//! from the built-in SRD dataset ([`default_tables`]).

mod warlock;

pub use warlock::default_tables;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::error::DomainError;
use crate::value_objects::{clamp_int, Ability, DieSize, Skill};

/// Level-banded proficiency bonus: +2 at 1, +3 at 5, +4 at 9, +5 at 13,
/// +6 at 17.
pub fn proficiency_bonus(level: u8) -> i32 {
    match clamp_int(level as i32, 1, 20) {
        17.. => 6,
        13.. => 5,
        9.. => 4,
        5.. => 3,
        _ => 2,
    }
}

/// The full rule dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleTables {
    pub classes: BTreeMap<String, ClassTable>,
    pub subclasses: BTreeMap<String, Vec<Subclass>>,
    pub backgrounds: Vec<Background>,
    pub races: Vec<Race>,
    pub feats: Vec<FeatDef>,
    pub spells: Vec<SpellDef>,
}

impl RuleTables {
    /// Parses a dataset from JSON, rejecting structurally invalid data
    /// up front rather than discovering it mid-level-up.
    pub fn load_json(json: &str) -> Result<Self, DomainError> {
        let tables: RuleTables = serde_json::from_str(json)
            .map_err(|e| DomainError::rule_data(e.to_string()))?;
        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> Result<(), DomainError> {
        for (name, class) in &self.classes {
            if name.trim().is_empty() {
                return Err(DomainError::rule_data("class with empty name"));
            }
            for table in [&class.spells_known, &class.cantrips_known] {
                if !table.is_empty() && table.len() != 21 {
                    return Err(DomainError::rule_data(format!(
                        "class {name}: per-level tables must cover levels 0-20"
                    )));
                }
            }
            if let Some(pact) = &class.pact {
                if pact.slot_level.len() != 21
                    || pact.slots.len() != 21
                    || pact.invocations_known.len() != 21
                {
                    return Err(DomainError::rule_data(format!(
                        "class {name}: pact tables must cover levels 0-20"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassTable> {
        self.classes.get(name.trim())
    }

    pub fn subclasses_for(&self, class_name: &str) -> &[Subclass] {
        self.subclasses
            .get(class_name.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn subclass(&self, class_name: &str, subclass_name: &str) -> Option<&Subclass> {
        self.subclasses_for(class_name)
            .iter()
            .find(|s| s.name == subclass_name.trim())
    }

    pub fn background(&self, id: &str) -> Option<&Background> {
        self.backgrounds.iter().find(|b| b.id == id)
    }

    pub fn race(&self, id: &str) -> Option<&Race> {
        self.races.iter().find(|r| r.id == id)
    }

    pub fn feat(&self, id: &str) -> Option<&FeatDef> {
        self.feats.iter().find(|f| f.id == id)
    }

    pub fn spell(&self, id: &str) -> Option<&SpellDef> {
        self.spells.iter().find(|s| s.id == id)
    }

    pub fn hit_die_for_class(&self, class_name: &str) -> Option<DieSize> {
        self.class(class_name).map(|c| c.hit_die)
    }
}

/// One class's full progression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassTable {
    #[serde(default = "default_hit_die")]
    pub hit_die: DieSize,
    pub saves: Vec<Ability>,
    pub spell_ability: Option<Ability>,
    /// Class levels at which an ASI-or-feat pick is earned.
    pub asi_levels: Vec<u8>,
    /// Indexed by class level 0-20; empty for non-casters.
    pub spells_known: Vec<u8>,
    pub cantrips_known: Vec<u8>,
    pub pact: Option<PactProgression>,
    /// Class level -> spell level unlocked (Mystic Arcanum style).
    pub mystic_arcanum: BTreeMap<u8, u8>,
    /// Per-class-level feature grants and choice points.
    pub levels: BTreeMap<u8, LevelEntry>,
    /// Spell level -> spell ids learnable by this class.
    pub spell_list_by_level: BTreeMap<u8, Vec<String>>,
}

fn default_hit_die() -> DieSize {
    DieSize::D8
}

impl ClassTable {
    pub fn has_asi_at(&self, class_level: u8) -> bool {
        self.asi_levels.contains(&class_level)
    }

    pub fn spells_known_at(&self, class_level: u8) -> u8 {
        per_level(&self.spells_known, class_level)
    }

    pub fn cantrips_known_at(&self, class_level: u8) -> u8 {
        per_level(&self.cantrips_known, class_level)
    }
}

fn per_level(table: &[u8], class_level: u8) -> u8 {
    let lv = clamp_int(class_level as i32, 0, 20) as usize;
    table.get(lv).copied().unwrap_or(0)
}

/// Pact Magic: slots are few, high, and all the same level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PactProgression {
    pub slot_level: Vec<u8>,
    pub slots: Vec<u8>,
    pub invocations_known: Vec<u8>,
}

impl PactProgression {
    pub fn slot_level_at(&self, class_level: u8) -> u8 {
        per_level(&self.slot_level, class_level)
    }

    pub fn slots_at(&self, class_level: u8) -> u8 {
        per_level(&self.slots, class_level)
    }

    pub fn invocations_at(&self, class_level: u8) -> u8 {
        per_level(&self.invocations_known, class_level)
    }
}

/// Grants and choice points introduced at one class level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelEntry {
    pub grants: Vec<FeatureGrant>,
    pub choices: Vec<ChoiceDef>,
}

/// A feature granted automatically at a class level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureGrant {
    pub id: String,
    pub name: String,
    pub text: String,
    pub effects: Vec<Effect>,
}

/// A choice point: pick `choose` of `options`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceDef {
    pub id: String,
    pub name: String,
    pub prompt: String,
    #[serde(default = "default_choose")]
    pub choose: u8,
    pub options: Vec<ChoiceOption>,
}

fn default_choose() -> u8 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceOption {
    pub id: String,
    pub name: String,
    pub text: String,
    pub effects: Vec<Effect>,
}

/// A subclass, with optional spell rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subclass {
    pub name: String,
    pub spell_rules: Option<SpellRules>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpellRules {
    /// Class level -> spell ids that are always prepared from then on.
    pub always_prepared_by_level: BTreeMap<u8, Vec<String>>,
    /// Borrow another class's spell list (e.g. subclass casting).
    pub spell_source_class: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Background {
    pub id: String,
    pub name: String,
    pub skills: Vec<Skill>,
    pub tools: Vec<String>,
    pub languages: Vec<String>,
    pub feature: Option<BackgroundFeature>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundFeature {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Race {
    pub id: String,
    pub name: String,
    pub ability_bonuses: BTreeMap<Ability, i32>,
    pub speed: Option<i32>,
    pub skills: Vec<Skill>,
    pub tools: Vec<String>,
    pub languages: Vec<String>,
    pub traits: Vec<RacialTrait>,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RacialTrait {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatDef {
    pub id: String,
    pub name: String,
    pub requirements_text: String,
    /// Human-readable rule lines; becomes the feat's display text.
    pub effects_text: Vec<String>,
}

impl FeatDef {
    pub fn display_text(&self) -> String {
        self.effects_text.join("\n")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpellDef {
    pub id: String,
    pub name: String,
    pub level: u8,
    pub school: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_bonus_bands() {
        assert_eq!(proficiency_bonus(1), 2);
        assert_eq!(proficiency_bonus(4), 2);
        assert_eq!(proficiency_bonus(5), 3);
        assert_eq!(proficiency_bonus(8), 3);
        assert_eq!(proficiency_bonus(9), 4);
        assert_eq!(proficiency_bonus(12), 4);
        assert_eq!(proficiency_bonus(13), 5);
        assert_eq!(proficiency_bonus(16), 5);
        assert_eq!(proficiency_bonus(17), 6);
        assert_eq!(proficiency_bonus(20), 6);
    }

    #[test]
    fn default_tables_pass_validation() {
        let t = default_tables();
        assert!(t.validate().is_ok());
        assert!(t.class("Warlock").is_some());
    }

    #[test]
    fn load_json_rejects_short_pact_tables() {
        let json = r#"{
            "classes": {
                "Warlock": { "pact": { "slotLevel": [0,1], "slots": [0,1], "invocationsKnown": [0,0] } }
            }
        }"#;
        let err = RuleTables::load_json(json).unwrap_err();
        assert!(matches!(err, DomainError::RuleData(_)));
    }

    #[test]
    fn load_json_round_trips_default_dataset() {
        let t = default_tables();
        let json = serde_json::to_string(&t).unwrap();
        let back = RuleTables::load_json(&json).unwrap();
        assert_eq!(back.classes.len(), t.classes.len());
        assert_eq!(back.spells.len(), t.spells.len());
    }
}
