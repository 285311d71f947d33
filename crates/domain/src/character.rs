//! The character record aggregate.
//!
//! Single-writer: the owning context holds exactly one current record and
//! every mutation is a pure function that takes a record and returns the next
//! one. Derived numbers (bonuses, passives) are computed on demand and never
//! stored, except where the build log needs them for exact undo.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::level_up::LevelUpLogEntry;
use crate::rules;
use crate::value_objects::{
    clamp_int, Ability, AbilityScores, DieSize, ProficiencyRank, ResetRule, SaveProficiencies,
    Skill, SourceTag,
};

/// Current persisted shape version.
pub const RECORD_VERSION: u32 = 7;

/// Well-known key the record is persisted under.
pub const CHAR_STORAGE_KEY: &str = "dnd_character_state_v1";

/// The root aggregate. All fields are public: the invariants live in
/// [`crate::derive::derive`], which every load and save round-trips through,
/// not in accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterRecord {
    pub version: u32,
    pub id: String,
    pub name: String,
    pub race: String,
    pub race_id: String,
    /// Ability bonuses applied by the current race, kept so re-selecting a
    /// race can subtract them exactly before adding the new ones.
    pub race_bonuses_applied: BTreeMap<Ability, i32>,
    pub alignment: String,
    pub inspiration_points: i32,
    pub multiclass: bool,
    pub abilities: AbilityScores,
    pub saves: SaveProficiencies,
    pub skills: BTreeMap<Skill, ProficiencyRank>,
    pub background_id: String,
    pub background_name: String,
    pub prof_sources: ProfSources,
    pub tool_proficiencies: Vec<SourcedValue>,
    pub language_proficiencies: Vec<SourcedValue>,
    pub proficiency_misc: i32,
    pub perception_misc: i32,
    pub combat: CombatStats,
    /// Total character level, recomputed on every derive.
    pub level: u8,
    #[serde(default = "ClassBlock::default_primary")]
    pub primary: ClassBlock,
    /// Present for shape compatibility; pinned inert (multiclass disabled).
    pub secondary: ClassBlock,
    pub features: Vec<Feature>,
    pub picks: Vec<Pick>,
    pub feats: Vec<OwnedFeat>,
    pub class_choices: BTreeMap<String, Vec<String>>,
    pub rest: RestState,
    pub resources: Resources,
    pub spells: SpellState,
    pub build: BuildState,
    pub notes: String,
    pub details: Details,
}

impl Default for CharacterRecord {
    fn default() -> Self {
        let skills = Skill::ALL
            .iter()
            .map(|s| (*s, ProficiencyRank::Untrained))
            .collect();
        Self {
            version: RECORD_VERSION,
            id: new_character_id(),
            name: String::new(),
            race: String::new(),
            race_id: String::new(),
            race_bonuses_applied: BTreeMap::new(),
            alignment: String::new(),
            inspiration_points: 0,
            multiclass: false,
            abilities: AbilityScores::default(),
            saves: SaveProficiencies::default(),
            skills,
            background_id: String::new(),
            background_name: String::new(),
            prof_sources: ProfSources::default(),
            tool_proficiencies: Vec::new(),
            language_proficiencies: Vec::new(),
            proficiency_misc: 0,
            perception_misc: 0,
            combat: CombatStats::default(),
            level: 1,
            primary: ClassBlock::default_primary(),
            secondary: ClassBlock::default(),
            features: Vec::new(),
            picks: Vec::new(),
            feats: Vec::new(),
            class_choices: BTreeMap::new(),
            rest: RestState::default(),
            resources: Resources::default(),
            spells: SpellState::default(),
            build: BuildState::default(),
            notes: String::new(),
            details: Details::default(),
        }
    }
}

impl CharacterRecord {
    /// Total character level: the primary class level (secondary is inert),
    /// floored at 1 and capped at 20.
    pub fn total_level(&self) -> u8 {
        let p = clamp_int(self.primary.class_level as i32, 0, 20);
        clamp_int(p.max(1), 1, 20) as u8
    }

    /// Level-banded proficiency bonus for the current total level.
    pub fn proficiency_bonus(&self) -> i32 {
        rules::proficiency_bonus(self.level)
    }

    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    pub fn save_bonus(&self, ability: Ability) -> i32 {
        let base = self.ability_modifier(ability);
        let prof = if self.saves.get(ability) {
            self.proficiency_bonus()
        } else {
            0
        };
        base + prof
    }

    pub fn skill_rank(&self, skill: Skill) -> ProficiencyRank {
        self.skills.get(&skill).copied().unwrap_or_default()
    }

    pub fn skill_bonus(&self, skill: Skill) -> i32 {
        let base = self.ability_modifier(skill.ability());
        let pb = self.proficiency_bonus();
        let add = match self.skill_rank(skill) {
            ProficiencyRank::Untrained => 0,
            ProficiencyRank::Proficient => pb,
            ProficiencyRank::Expertise => pb * 2,
        };
        base + add
    }

    pub fn passive_perception(&self) -> i32 {
        10 + self.skill_bonus(Skill::Perception) + clamp_int(self.perception_misc, -50, 50)
    }

    pub fn initiative(&self) -> i32 {
        self.ability_modifier(Ability::Dex) + clamp_int(self.combat.initiative_misc, -99, 99)
    }

    /// Feature existence by idempotency key.
    pub fn has_feature_key(&self, key: &str) -> bool {
        self.features.iter().any(|f| f.key == key)
    }

    /// Adds a feature if (and only if) its key is not already present.
    pub fn add_feature(&mut self, feature: Feature) {
        if !self.has_feature_key(&feature.key) {
            self.features.push(feature);
        }
    }

    /// Whether the character owns a feat, via the feats list or a pick.
    pub fn has_feat(&self, feat_id: &str) -> bool {
        let id = feat_id.trim();
        if id.is_empty() {
            return false;
        }
        self.feats.iter().any(|f| f.id == id)
            || self.picks.iter().any(|p| match p {
                Pick::Feat { feat_id, .. } => feat_id == id,
                _ => false,
            })
    }
}

fn new_character_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Appends `{value, source}` if the value is not already present
/// (case-sensitive exact match).
pub fn add_sourced_unique(list: &mut Vec<SourcedValue>, value: &str, source: SourceTag) {
    if value.is_empty() {
        return;
    }
    if !list.iter().any(|x| x.value == value) {
        list.push(SourcedValue {
            value: value.to_string(),
            source,
        });
    }
}

/// A `{value, source}` proficiency entry (tools, languages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedValue {
    pub value: String,
    pub source: SourceTag,
}

/// Origin tags for display and source-scoped removal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfSources {
    pub skills: BTreeMap<Skill, SourceTag>,
    pub tools: BTreeMap<String, SourceTag>,
    pub languages: BTreeMap<String, SourceTag>,
}

/// Combat block. Each field is independently clamped on derive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CombatStats {
    pub hp_max: i32,
    pub hp_now: i32,
    pub hp_temp: i32,
    pub ac_base: i32,
    pub ac_bonus_extra: i32,
    pub weapon_dice: String,
    pub speed: i32,
    pub initiative_misc: i32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            hp_max: 10,
            hp_now: 10,
            hp_temp: 0,
            ac_base: 10,
            ac_bonus_extra: 0,
            weapon_dice: String::new(),
            speed: 30,
            initiative_misc: 0,
        }
    }
}

/// One class block (name, level, subclass, casting modifier).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassBlock {
    pub class_name: String,
    pub class_level: u8,
    pub subclass: String,
    pub spell_mod: i32,
}

impl ClassBlock {
    pub fn default_primary() -> Self {
        Self {
            class_level: 1,
            ..Self::default()
        }
    }
}

/// A granted feature. `key` is the idempotency token: a feature with a given
/// key exists at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub key: String,
    pub source: SourceTag,
    pub name: String,
    #[serde(default)]
    pub text: String,
    /// Set when the feature was created by a level-up transaction; undo
    /// removes exactly the features whose grant id matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_id: Option<String>,
}

/// An ASI or feat acquisition, tagged with the transaction that granted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Pick {
    #[serde(rename_all = "camelCase")]
    Asi {
        name: String,
        #[serde(default)]
        text: String,
        delta: BTreeMap<Ability, i32>,
        grant_id: String,
        granted_at: GrantOrigin,
    },
    #[serde(rename_all = "camelCase")]
    Feat {
        feat_id: String,
        name: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        requirements_text: String,
        grant_id: String,
        granted_at: GrantOrigin,
    },
}

impl Pick {
    pub fn grant_id(&self) -> &str {
        match self {
            Pick::Asi { grant_id, .. } | Pick::Feat { grant_id, .. } => grant_id,
        }
    }
}

/// Where in the progression a pick was earned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrantOrigin {
    pub which: String,
    pub class_name: String,
    pub level: u8,
}

/// An owned feat entry (denormalized from picks for quick lookup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedFeat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub requirements_text: String,
    #[serde(default)]
    pub text: String,
    pub source: SourceTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_id: Option<String>,
}

/// Hit-die pool for one die size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HitDicePool {
    pub max: i32,
    pub remaining: i32,
}

/// Rest bookkeeping. `hit_dice` is `None` until first initialized by a rest
/// or a level-up, at which point it becomes a per-die-size pool map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestState {
    pub prepared_unlock: i32,
    pub hit_dice: Option<BTreeMap<DieSize, HitDicePool>>,
}

/// Expendable pools: slot usage plus named custom resources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resources {
    pub spell_slots_used: BTreeMap<u8, i32>,
    pub pact_slots_used: i32,
    pub custom: Vec<CustomResource>,
}

/// A named expendable pool (invocation uses, arcanum casts, inspiration dice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResource {
    pub name: String,
    #[serde(default)]
    pub cur: i32,
    #[serde(default)]
    pub max: i32,
    #[serde(default)]
    pub reset: ResetRule,
    /// The selection that created the pool. Automatic maintenance only
    /// touches pools it owns; hand-added pools have no source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceTag>,
}

/// Spell bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpellState {
    pub known: Vec<String>,
    pub known_by_block: KnownByBlock,
    pub prepared: Vec<String>,
    pub pending_learn: i32,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnownByBlock {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

/// Build history: the append-only level-up log and its redo stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildState {
    pub locked: bool,
    pub log: Vec<LevelUpLogEntry>,
    pub redo: Vec<LevelUpLogEntry>,
}

impl Default for BuildState {
    fn default() -> Self {
        Self {
            locked: true,
            log: Vec::new(),
            redo: Vec::new(),
        }
    }
}

/// Freeform roleplay fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Details {
    pub appearance: String,
    pub backstory: String,
    pub allies: String,
    pub treasure: String,
}
