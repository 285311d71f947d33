//! The level-up transaction.
//!
//! A [`LevelUpWizard`] walks the player through the steps a new level
//! requires, validating each before the next becomes reachable. Nothing
//! touches the record until [`LevelUpWizard::commit`], which applies the
//! whole level atomically and appends a log entry with everything needed
//! for [`undo_last_level_up`] to reverse it exactly.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribution::strip_source;
use crate::character::{CharacterRecord, Feature, GrantOrigin, HitDicePool, OwnedFeat, Pick};
use crate::class_features::{self, choice_key, sync_class_features};
use crate::derive::derive;
use crate::error::DomainError;
use crate::rules::RuleTables;
use crate::value_objects::{clamp_int, Ability, DieSize, SourceTag};

/// Feat id with bespoke hit point handling on level-up.
pub const TOUGH_FEAT_ID: &str = "feat_tough";

/// Wizard steps, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Choose,
    Subclass,
    Choices,
    Hp,
    Asi,
    Spells,
    Summary,
}

/// The player's ASI split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsiSelection {
    /// +2 to one ability.
    Plus2(Ability),
    /// +1 to each of two different abilities.
    OnePlusOne(Ability, Ability),
}

impl AsiSelection {
    fn delta(&self) -> BTreeMap<Ability, i32> {
        let mut delta = BTreeMap::new();
        match self {
            AsiSelection::Plus2(a) => {
                delta.insert(*a, 2);
            }
            AsiSelection::OnePlusOne(a, b) => {
                delta.insert(*a, 1);
                delta.insert(*b, 1);
            }
        }
        delta
    }
}

/// What the ASI step resolved to, as recorded in the build log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AsiFeatChoice {
    #[serde(rename_all = "camelCase")]
    Asi { delta: BTreeMap<Ability, i32> },
    #[serde(rename_all = "camelCase")]
    Feat { feat_id: String },
}

/// The player's pending ASI-step input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsiFeatInput {
    Asi(AsiSelection),
    Feat(String),
}

/// How many spells the new level lets the character learn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellLearnPlan {
    pub cantrips_to_choose: u8,
    pub spells_to_choose: u8,
    pub auto_cantrip_ids: Vec<String>,
    pub can_replace_spell: bool,
}

/// One known spell swapped for another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellReplacement {
    pub from: String,
    pub to: String,
}

/// Spell bookkeeping for one committed level, sufficient for exact undo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpellLogRecord {
    pub learned: Vec<String>,
    pub unlearned: Vec<String>,
    pub auto_cantrip_ids: Vec<String>,
    pub learn_cantrip_ids: Vec<String>,
    pub learn_spell_ids: Vec<String>,
    pub replaced: Option<SpellReplacement>,
}

/// HP roll outcome for one committed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpRecord {
    pub die: DieSize,
    pub roll: i32,
    /// Total maximum HP gained, Tough bonus included.
    pub gain: i32,
}

/// One committed level-up, as stored in `build.log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpLogEntry {
    pub id: String,
    pub at: DateTime<Utc>,
    pub class_name: String,
    #[serde(default)]
    pub subclass_name: String,
    pub from_level: u8,
    pub to_level: u8,
    pub hp: HpRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asi_feat: Option<AsiFeatChoice>,
    #[serde(default)]
    pub spells: SpellLogRecord,
}

/// Interactive level-up state. Build one with [`LevelUpWizard::begin`],
/// feed selections through the setters, advance with [`next`], and apply
/// with [`commit`].
///
/// [`next`]: LevelUpWizard::next
/// [`commit`]: LevelUpWizard::commit
#[derive(Debug, Clone)]
pub struct LevelUpWizard {
    pub id: String,
    steps: Vec<Step>,
    cursor: usize,
    class_name: String,
    hit_die: DieSize,
    from_level: u8,
    to_level: u8,
    /// Subclass carried in from the record, or chosen in the wizard.
    subclass_name: String,
    subclass_options: Vec<String>,
    class_choices: BTreeMap<String, Vec<String>>,
    hp_roll: i32,
    base_hp_gain: i32,
    asi_feat: Option<AsiFeatInput>,
    spell_plan: SpellLearnPlan,
    learn_cantrip_ids: Vec<String>,
    learn_spell_ids: Vec<String>,
    replacement: Option<SpellReplacement>,
}

impl LevelUpWizard {
    /// Starts a level-up for the record's primary class. Fails when there
    /// is no class to level or the character is already at the cap.
    pub fn begin(record: &CharacterRecord, tables: &RuleTables) -> Result<Self, DomainError> {
        let class_name = record.primary.class_name.trim().to_string();
        if class_name.is_empty() {
            return Err(DomainError::validation("Missing class."));
        }
        let Some(class) = tables.class(&class_name) else {
            return Err(DomainError::rule_data(format!("unknown class {class_name}")));
        };

        let from_level = clamp_int(record.primary.class_level as i32, 0, 20) as u8;
        let to_level = from_level + 1;
        if record.total_level() >= 20 || to_level > 20 {
            return Err(DomainError::validation("You are already level 20."));
        }

        let subclass_name = record.primary.subclass.trim().to_string();
        let subclass_options: Vec<String> = tables
            .subclasses_for(&class_name)
            .iter()
            .map(|s| s.name.clone())
            .collect();

        let spell_plan = build_spell_learn_plan(tables, &class_name, from_level, to_level);

        let mut steps = vec![Step::Choose];
        if !subclass_options.is_empty() && subclass_name.is_empty() {
            steps.push(Step::Subclass);
        }
        steps.push(Step::Choices);
        steps.push(Step::Hp);
        if class.has_asi_at(to_level) {
            steps.push(Step::Asi);
        }
        let has_spells_step = spell_plan.cantrips_to_choose > 0
            || spell_plan.spells_to_choose > 0
            || (spell_plan.can_replace_spell && !record.spells.known.is_empty())
            || !spell_plan.auto_cantrip_ids.is_empty();
        if has_spells_step {
            steps.push(Step::Spells);
        }
        steps.push(Step::Summary);

        Ok(Self {
            id: format!("lvlup:{}", Uuid::new_v4().simple()),
            steps,
            cursor: 0,
            class_name,
            hit_die: class.hit_die,
            from_level,
            to_level,
            subclass_name,
            subclass_options,
            class_choices: BTreeMap::new(),
            hp_roll: 0,
            base_hp_gain: 0,
            asi_feat: None,
            spell_plan,
            learn_cantrip_ids: Vec::new(),
            learn_spell_ids: Vec::new(),
            replacement: None,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step(&self) -> Step {
        self.steps[self.cursor]
    }

    pub fn to_level(&self) -> u8 {
        self.to_level
    }

    pub fn spell_plan(&self) -> &SpellLearnPlan {
        &self.spell_plan
    }

    pub fn subclass_options(&self) -> &[String] {
        &self.subclass_options
    }

    pub fn set_subclass(&mut self, name: impl Into<String>) {
        self.subclass_name = name.into().trim().to_string();
    }

    /// Records a choice-point selection for the new level. Keys come from
    /// [`pending_choices`](Self::pending_choices).
    pub fn set_choice(&mut self, choice_key: &str, option_ids: Vec<String>) {
        let mut seen = BTreeSet::new();
        let cleaned = option_ids
            .into_iter()
            .filter(|id| !id.is_empty())
            .filter(|id| seen.insert(id.clone()))
            .collect();
        self.class_choices.insert(choice_key.to_string(), cleaned);
    }

    pub fn set_hp_roll(&mut self, roll: i32) {
        self.hp_roll = roll;
    }

    pub fn set_asi(&mut self, selection: AsiSelection) {
        self.asi_feat = Some(AsiFeatInput::Asi(selection));
    }

    pub fn set_feat(&mut self, feat_id: impl Into<String>) {
        self.asi_feat = Some(AsiFeatInput::Feat(feat_id.into().trim().to_string()));
    }

    pub fn set_learned_cantrips(&mut self, ids: Vec<String>) {
        self.learn_cantrip_ids = ids;
    }

    pub fn set_learned_spells(&mut self, ids: Vec<String>) {
        self.learn_spell_ids = ids;
    }

    pub fn set_replacement(&mut self, replacement: Option<SpellReplacement>) {
        self.replacement = replacement;
    }

    /// Choice points introduced at the new class level.
    pub fn pending_choices<'t>(
        &self,
        tables: &'t RuleTables,
    ) -> Vec<(&'t crate::rules::ChoiceDef, String)> {
        let Some(class) = tables.class(&self.class_name) else {
            return Vec::new();
        };
        class
            .levels
            .get(&self.to_level)
            .map(|entry| {
                entry
                    .choices
                    .iter()
                    .map(|c| (c, choice_key(&self.class_name, self.to_level, &c.id)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validates the current step against the record and advances.
    pub fn next(
        &mut self,
        record: &CharacterRecord,
        tables: &RuleTables,
    ) -> Result<(), DomainError> {
        self.validate_step(self.current_step(), record, tables)?;
        if self.cursor + 1 < self.steps.len() {
            self.cursor += 1;
        }
        Ok(())
    }

    /// Moves back one step without validation.
    pub fn back(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn validate_step(
        &mut self,
        step: Step,
        record: &CharacterRecord,
        tables: &RuleTables,
    ) -> Result<(), DomainError> {
        match step {
            Step::Choose => {
                if record.total_level() >= 20 {
                    return Err(DomainError::validation("You are already level 20."));
                }
                Ok(())
            }
            Step::Subclass => {
                if !self.subclass_options.is_empty() && self.subclass_name.is_empty() {
                    return Err(DomainError::validation("Choose a subclass."));
                }
                Ok(())
            }
            Step::Choices => {
                for (choice, key) in self.pending_choices(tables) {
                    let need = clamp_int(choice.choose as i32, 1, 20) as usize;
                    let picked = self
                        .class_choices
                        .get(&key)
                        .map(Vec::len)
                        .unwrap_or(0);
                    if picked != need {
                        return Err(DomainError::validation(format!(
                            "Complete: {} (choose {}).",
                            choice.name, need
                        )));
                    }
                }
                Ok(())
            }
            Step::Hp => {
                let faces = self.hit_die.faces();
                if self.hp_roll < 1 || self.hp_roll > faces {
                    return Err(DomainError::validation(format!(
                        "Enter your HP roll (1-{faces})."
                    )));
                }
                let con = record.abilities.modifier(Ability::Con);
                self.base_hp_gain = (self.hp_roll + con).max(1);
                Ok(())
            }
            Step::Asi => match &self.asi_feat {
                None => Err(DomainError::validation("Choose ASI or feat.")),
                Some(AsiFeatInput::Asi(selection)) => {
                    if let AsiSelection::OnePlusOne(a, b) = selection {
                        if a == b {
                            return Err(DomainError::validation(
                                "Ability A and B must be different.",
                            ));
                        }
                    }
                    for (ability, amount) in selection.delta() {
                        let cur = clamp_int(record.abilities.get(ability), 0, 30);
                        if cur + amount > 20 {
                            return Err(DomainError::validation(format!(
                                "{} would exceed 20. Choose a different ASI split.",
                                ability.code()
                            )));
                        }
                    }
                    Ok(())
                }
                Some(AsiFeatInput::Feat(feat_id)) => {
                    if feat_id.is_empty() {
                        return Err(DomainError::validation("Pick a feat."));
                    }
                    if record.has_feat(feat_id) {
                        return Err(DomainError::validation("You already have that feat."));
                    }
                    Ok(())
                }
            },
            Step::Spells => {
                let need_cantrips = self.spell_plan.cantrips_to_choose as usize;
                let need_spells = self.spell_plan.spells_to_choose as usize;
                if self.learn_cantrip_ids.len() != need_cantrips {
                    return Err(DomainError::validation(format!(
                        "Choose exactly {} cantrip{}.",
                        need_cantrips,
                        if need_cantrips == 1 { "" } else { "s" }
                    )));
                }
                if self.learn_spell_ids.len() != need_spells {
                    return Err(DomainError::validation(format!(
                        "Choose exactly {} spell{}.",
                        need_spells,
                        if need_spells == 1 { "" } else { "s" }
                    )));
                }
                if let Some(rep) = &self.replacement {
                    if rep.from.is_empty() || rep.to.is_empty() {
                        return Err(DomainError::validation(
                            "Select both the spell to replace and the new spell.",
                        ));
                    }
                    if rep.from == rep.to {
                        return Err(DomainError::validation(
                            "Replacement spell must be different.",
                        ));
                    }
                    if !record.spells.known.contains(&rep.from) {
                        return Err(DomainError::validation(
                            "You can only replace a spell you already know.",
                        ));
                    }
                    if record.spells.known.contains(&rep.to) {
                        return Err(DomainError::validation(
                            "You already know the replacement spell.",
                        ));
                    }
                    let picked_this_level = self
                        .learn_cantrip_ids
                        .iter()
                        .chain(self.learn_spell_ids.iter())
                        .chain(self.spell_plan.auto_cantrip_ids.iter());
                    for id in picked_this_level {
                        if *id == rep.to {
                            return Err(DomainError::validation(
                                "Do not pick the replacement spell as a learned spell in the same level.",
                            ));
                        }
                    }
                }
                Ok(())
            }
            Step::Summary => Ok(()),
        }
    }

    /// Validates every step, then applies the whole level atomically and
    /// appends the log entry undo will replay in reverse.
    pub fn commit(
        &self,
        record: CharacterRecord,
        tables: &RuleTables,
    ) -> Result<CharacterRecord, DomainError> {
        let mut wiz = self.clone();
        for step in wiz.steps.clone() {
            wiz.validate_step(step, &record, tables)?;
        }

        let had_tough = record.has_feat(TOUGH_FEAT_ID);
        let mut record = record;
        record.build.redo.clear();

        record.primary.class_level =
            clamp_int(record.primary.class_level as i32 + 1, 0, 20) as u8;
        record.level = record.total_level();

        if !wiz.subclass_name.is_empty() && record.primary.subclass.trim().is_empty() {
            record.primary.subclass = wiz.subclass_name.clone();
        }

        for (key, picked) in &wiz.class_choices {
            record.class_choices.insert(key.clone(), picked.clone());
        }

        // HP
        let prev_hp_max = clamp_int(record.combat.hp_max, 0, 9999);
        let prev_hp_now = clamp_int(record.combat.hp_now, 0, 9999);
        let base_gain = clamp_int(wiz.base_hp_gain, 1, 99);
        let gaining_tough_now = matches!(
            &wiz.asi_feat,
            Some(AsiFeatInput::Feat(id)) if id == TOUGH_FEAT_ID
        );
        let tough = tough_bonus(had_tough, gaining_tough_now, record.level);
        let hp_gain = clamp_int(base_gain + tough, 1, 999);
        record.combat.hp_max = clamp_int(prev_hp_max + hp_gain, 1, 9999);
        // Characters at full health stay at full health.
        let bump = if prev_hp_now >= prev_hp_max { hp_gain } else { 0 };
        record.combat.hp_now = clamp_int(prev_hp_now + bump, 0, record.combat.hp_max);

        adjust_hit_dice(&mut record, wiz.hit_die, 1);

        // ASI / feat
        let grant_id = wiz.id.clone();
        let origin = GrantOrigin {
            which: "primary".into(),
            class_name: record.primary.class_name.clone(),
            level: record.primary.class_level,
        };
        let logged_asi_feat = match &wiz.asi_feat {
            Some(AsiFeatInput::Asi(selection)) => {
                let delta = selection.delta();
                for (ability, amount) in &delta {
                    let cur = record.abilities.get(*ability);
                    record.abilities.set(*ability, clamp_int(cur + amount, 1, 30));
                }
                let name = format!(
                    "ASI ({} {}): {}",
                    record.primary.class_name,
                    record.primary.class_level,
                    delta
                        .iter()
                        .map(|(a, v)| format!("{} +{}", a.code(), v))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                record.picks.push(Pick::Asi {
                    name: name.clone(),
                    text: name,
                    delta: delta.clone(),
                    grant_id: grant_id.clone(),
                    granted_at: origin,
                });
                Some(AsiFeatChoice::Asi { delta })
            }
            Some(AsiFeatInput::Feat(feat_id)) => {
                let def = tables.feat(feat_id);
                let name = def.map(|f| f.name.clone()).unwrap_or_else(|| feat_id.clone());
                let text = def.map(|f| f.display_text()).unwrap_or_default();
                let requirements = def
                    .map(|f| f.requirements_text.clone())
                    .unwrap_or_default();
                record.picks.push(Pick::Feat {
                    feat_id: feat_id.clone(),
                    name: name.clone(),
                    text: text.clone(),
                    requirements_text: requirements.clone(),
                    grant_id: grant_id.clone(),
                    granted_at: origin,
                });
                if !record.feats.iter().any(|f| &f.id == feat_id) {
                    record.feats.push(OwnedFeat {
                        id: feat_id.clone(),
                        name: name.clone(),
                        requirements_text: requirements,
                        text: text.clone(),
                        source: SourceTag::Feat,
                        grant_id: Some(grant_id.clone()),
                    });
                }
                record.features.push(Feature {
                    key: format!("feat:{feat_id}:{grant_id}"),
                    source: SourceTag::Feat,
                    name,
                    text,
                    grant_id: Some(grant_id.clone()),
                });
                Some(AsiFeatChoice::Feat {
                    feat_id: feat_id.clone(),
                })
            }
            None => None,
        };

        // Spells
        let mut learned = Vec::new();
        let mut unlearned = Vec::new();
        if wiz.steps.contains(&Step::Spells) {
            let known = &mut record.spells.known;
            let mut add_known = |known: &mut Vec<String>, id: &str| {
                if !id.is_empty() && !known.iter().any(|k| k == id) {
                    known.push(id.to_string());
                    learned.push(id.to_string());
                }
            };
            for id in &wiz.spell_plan.auto_cantrip_ids {
                add_known(known, id);
            }
            for id in &wiz.learn_cantrip_ids {
                add_known(known, id);
            }
            for id in &wiz.learn_spell_ids {
                add_known(known, id);
            }
            if let Some(rep) = &wiz.replacement {
                if let Some(idx) = known.iter().position(|k| k == &rep.from) {
                    known.remove(idx);
                    unlearned.push(rep.from.clone());
                }
                add_known(known, &rep.to);
            }
        }

        record.build.log.push(LevelUpLogEntry {
            id: wiz.id.clone(),
            at: Utc::now(),
            class_name: record.primary.class_name.clone(),
            subclass_name: record.primary.subclass.clone(),
            from_level: wiz.from_level,
            to_level: wiz.to_level,
            hp: HpRecord {
                die: wiz.hit_die,
                roll: wiz.hp_roll,
                gain: hp_gain,
            },
            asi_feat: logged_asi_feat,
            spells: SpellLogRecord {
                learned,
                unlearned,
                auto_cantrip_ids: wiz.spell_plan.auto_cantrip_ids.clone(),
                learn_cantrip_ids: wiz.learn_cantrip_ids.clone(),
                learn_spell_ids: wiz.learn_spell_ids.clone(),
                replaced: wiz.replacement.clone(),
            },
        });

        // Rebuild class-derived grants at the new level.
        let record = strip_source(record, SourceTag::ClassPrimary);
        let record = sync_class_features(record, tables);
        Ok(derive(record, tables))
    }
}

/// Reverses the most recent level-up exactly, moving its log entry onto
/// the redo stack.
pub fn undo_last_level_up(
    record: CharacterRecord,
    tables: &RuleTables,
) -> Result<CharacterRecord, DomainError> {
    let mut record = record;
    let Some(entry) = record.build.log.pop() else {
        return Err(DomainError::NothingToUndo);
    };
    record.build.redo.push(entry.clone());

    record.primary.class_level =
        clamp_int(record.primary.class_level as i32 - 1, 0, 20) as u8;
    record.level = record.total_level();

    // HP rollback: subtract exactly what the entry granted.
    record.combat.hp_max = clamp_int(record.combat.hp_max - entry.hp.gain.max(0), 1, 9999);
    record.combat.hp_now = clamp_int(record.combat.hp_now, 0, record.combat.hp_max);

    adjust_hit_dice(&mut record, entry.hp.die, -1);

    if let Some(AsiFeatChoice::Asi { delta }) = &entry.asi_feat {
        for (ability, amount) in delta {
            let cur = record.abilities.get(*ability);
            record.abilities.set(*ability, clamp_int(cur - amount, 1, 30));
        }
    }
    record.picks.retain(|p| p.grant_id() != entry.id);
    record
        .features
        .retain(|f| f.grant_id.as_deref() != Some(entry.id.as_str()));
    record
        .feats
        .retain(|f| f.grant_id.as_deref() != Some(entry.id.as_str()));

    // Spells: reverse the replacement first, then forget what was learned.
    if let Some(rep) = &entry.spells.replaced {
        if let Some(idx) = record.spells.known.iter().position(|k| k == &rep.to) {
            record.spells.known.remove(idx);
        }
        if !rep.from.is_empty() && !record.spells.known.contains(&rep.from) {
            record.spells.known.push(rep.from.clone());
        }
    }
    for id in &entry.spells.learned {
        if let Some(idx) = record.spells.known.iter().position(|k| k == id) {
            record.spells.known.remove(idx);
        }
    }

    // Drop choices made above the new class level.
    let class_name = record.primary.class_name.trim().to_string();
    let new_level = record.primary.class_level;
    record.class_choices.retain(|key, _| {
        match class_features::parse_choice_key_level(key, &class_name) {
            Some(level) => level <= new_level,
            None => true,
        }
    });

    let record = strip_source(record, SourceTag::ClassPrimary);
    let record = sync_class_features(record, tables);
    Ok(derive(record, tables))
}

/// Tough (PHB 2014): gaining the feat raises maximum HP by twice the new
/// total level; every level afterwards adds 2 more.
pub fn tough_bonus(had_tough: bool, gaining_tough_now: bool, new_total_level: u8) -> i32 {
    if gaining_tough_now && !had_tough {
        return 2 * clamp_int(new_total_level as i32, 1, 20);
    }
    if had_tough {
        return 2;
    }
    0
}

fn build_spell_learn_plan(
    tables: &RuleTables,
    class_name: &str,
    from_level: u8,
    to_level: u8,
) -> SpellLearnPlan {
    let mut plan = SpellLearnPlan::default();
    let Some(class) = tables.class(class_name) else {
        return plan;
    };
    if class.spells_known.is_empty() {
        return plan;
    }
    let known_from = class.spells_known_at(from_level) as i32;
    let known_to = class.spells_known_at(to_level) as i32;
    let cantrips_from = class.cantrips_known_at(from_level) as i32;
    let cantrips_to = class.cantrips_known_at(to_level) as i32;

    plan.spells_to_choose = (known_to - known_from).max(0) as u8;
    plan.cantrips_to_choose = (cantrips_to - cantrips_from).max(0) as u8;
    plan.can_replace_spell = true;
    plan
}

/// Adds or removes one hit die of the given size, keeping `remaining` in
/// step so an undo returns the exact pre-level pools.
fn adjust_hit_dice(record: &mut CharacterRecord, die: DieSize, delta: i32) {
    let pools = record.rest.hit_dice.get_or_insert_with(BTreeMap::new);
    let pool = pools.entry(die).or_insert(HitDicePool { max: 0, remaining: 0 });
    pool.max = clamp_int(pool.max + delta, 0, 20);
    pool.remaining = clamp_int(pool.remaining, 0, pool.max);
    pool.remaining = clamp_int(pool.remaining + delta, 0, pool.max);
    if pool.max <= 0 {
        pools.remove(&die);
    }
    if pools.is_empty() {
        record.rest.hit_dice = None;
    }
}
