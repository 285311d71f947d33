//! Data-driven effects.
//!
//! Rule tables describe what a feature, background, or racial trait does as a
//! list of [`Effect`] values; [`apply_effects`] interprets them against a
//! record. Effects are designed to be re-applied safely: proficiencies only
//! upgrade from untrained, resource pools are ensured rather than stacked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::character::{add_sourced_unique, CharacterRecord, CustomResource};
use crate::value_objects::{clamp_int, Ability, ProficiencyRank, ResetRule, Skill, SourceTag};

/// One mechanical consequence of a selection. The set is closed: unknown
/// effect types in rule data are a load-time error, not a runtime skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    /// Grants a skill at the given rank if the character is untrained, and
    /// attributes it to `source` (or the context source).
    #[serde(rename_all = "camelCase")]
    SkillProficiency {
        skill_id: Skill,
        #[serde(default = "default_rank_level")]
        level: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<SourceTag>,
    },
    /// Marks a saving throw proficient.
    #[serde(rename_all = "camelCase")]
    SavingThrowProficiency { ability: Ability },
    /// Adds a tool proficiency if not already present.
    #[serde(rename_all = "camelCase")]
    ToolProficiency {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<SourceTag>,
    },
    /// Adds a language if not already present.
    #[serde(rename_all = "camelCase")]
    LanguageProficiency {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<SourceTag>,
    },
    /// Raises an ability score, bounded by the effect's own cap.
    #[serde(rename_all = "camelCase")]
    AbilityIncrease {
        ability: Ability,
        amount: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i32>,
    },
    /// Immediate healing (or damage, when negative).
    #[serde(rename_all = "camelCase")]
    HpNowAdd { amount: i32 },
    /// Ensures a named resource pool exists with the right size for the
    /// current level, creating or resizing as needed.
    #[serde(rename_all = "camelCase")]
    ResourceEnsure {
        name: String,
        #[serde(default)]
        reset: ResetRule,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_by_level: Option<BTreeMap<u8, i32>>,
        /// When true (the default), a created or grown pool is topped up.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<bool>,
    },
}

fn default_rank_level() -> u8 {
    1
}

/// Who is applying the effects and at what progression point. The level
/// fields feed `maxByLevel` resolution.
#[derive(Debug, Clone, Default)]
pub struct EffectContext {
    pub source: Option<SourceTag>,
    pub class_name: Option<String>,
    pub class_level: Option<u8>,
    pub grant_level: Option<u8>,
}

impl EffectContext {
    pub fn for_source(source: SourceTag) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    fn effective_level(&self) -> u8 {
        self.class_level.or(self.grant_level).unwrap_or(0)
    }
}

/// Applies a list of effects. Pure: returns the next record.
pub fn apply_effects(
    mut record: CharacterRecord,
    effects: &[Effect],
    ctx: &EffectContext,
) -> CharacterRecord {
    for effect in effects {
        apply_one(&mut record, effect, ctx);
    }
    record
}

fn apply_one(record: &mut CharacterRecord, effect: &Effect, ctx: &EffectContext) {
    match effect {
        Effect::SkillProficiency {
            skill_id,
            level,
            source,
        } => {
            let rank = ProficiencyRank::from(clamp_int(*level as i32, 1, 2) as u8);
            let current = record.skill_rank(*skill_id);
            // Only ever upgrades; attribution is recorded with the upgrade.
            if rank > current {
                record.skills.insert(*skill_id, rank);
                if let Some(tag) = source.or(ctx.source) {
                    record.prof_sources.skills.insert(*skill_id, tag);
                }
            }
        }
        Effect::SavingThrowProficiency { ability } => {
            record.saves.set(*ability, true);
        }
        Effect::ToolProficiency { value, source } => {
            let tag = source.or(ctx.source).unwrap_or(SourceTag::Custom);
            add_sourced_unique(&mut record.tool_proficiencies, value, tag);
            if !value.is_empty() {
                record.prof_sources.tools.insert(value.clone(), tag);
            }
        }
        Effect::LanguageProficiency { value, source } => {
            let tag = source.or(ctx.source).unwrap_or(SourceTag::Custom);
            add_sourced_unique(&mut record.language_proficiencies, value, tag);
            if !value.is_empty() {
                record.prof_sources.languages.insert(value.clone(), tag);
            }
        }
        Effect::AbilityIncrease {
            ability,
            amount,
            min,
            max,
        } => {
            let amount = clamp_int(*amount, -10, 10);
            // ASI-style cap at 20 by default; rule data may raise it to 30.
            let hi = clamp_int(max.unwrap_or(20), 1, 30);
            let lo = clamp_int(min.unwrap_or(1), 1, hi);
            let current = record.abilities.get(*ability);
            record
                .abilities
                .set(*ability, clamp_int(current + amount, lo, hi));
        }
        Effect::HpNowAdd { amount } => {
            let amount = clamp_int(*amount, -9999, 9999);
            record.combat.hp_now =
                clamp_int(record.combat.hp_now + amount, 0, record.combat.hp_max);
        }
        Effect::ResourceEnsure {
            name,
            reset,
            max,
            max_by_level,
            fill,
        } => {
            ensure_resource(record, name, *reset, *max, max_by_level.as_ref(), *fill, ctx);
        }
    }
}

/// `maxByLevel` resolution: exact level first, then the nearest threshold at
/// or below. No threshold at or below means the pool does not exist yet.
fn resolve_max_by_level(table: &BTreeMap<u8, i32>, level: u8) -> Option<i32> {
    table.range(..=level).next_back().map(|(_, v)| *v)
}

fn ensure_resource(
    record: &mut CharacterRecord,
    name: &str,
    reset: ResetRule,
    max: Option<i32>,
    max_by_level: Option<&BTreeMap<u8, i32>>,
    fill: Option<bool>,
    ctx: &EffectContext,
) {
    let name = name.trim();
    if name.is_empty() {
        return;
    }
    let level = clamp_int(ctx.effective_level() as i32, 0, 20) as u8;
    let target_max = max_by_level
        .and_then(|table| resolve_max_by_level(table, level))
        .or(max);
    let target_max = match target_max {
        Some(v) => clamp_int(v, 0, 9999),
        None => return,
    };
    let fill = fill.unwrap_or(true);

    if let Some(existing) = record
        .resources
        .custom
        .iter_mut()
        .find(|r| r.name.trim() == name)
    {
        // A pool another source owns is left alone rather than resized out
        // from under it.
        if let (Some(theirs), Some(ours)) = (existing.source, ctx.source) {
            if theirs != ours {
                return;
            }
        }
        existing.reset = reset;
        existing.max = target_max;
        existing.cur = clamp_int(existing.cur, 0, target_max);
        if fill {
            existing.cur = target_max;
        }
        if existing.source.is_none() {
            existing.source = ctx.source;
        }
    } else {
        record.resources.custom.push(CustomResource {
            name: name.to_string(),
            cur: if fill { target_max } else { 0 },
            max: target_max,
            reset,
            source: ctx.source,
        });
    }
}
