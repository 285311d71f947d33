//! Class feature grants and choice points.
//!
//! Grants apply once, keyed by a stable feature key; scaling resources
//! (`resourceEnsure` effects) are refreshed on every sync so their maxima
//! track the current class level. Choices live in `class_choices` as
//! `choice key -> selected option ids` and materialize as features once
//! fulfilled.

use std::collections::BTreeSet;

use crate::character::{CharacterRecord, Feature};
use crate::effects::{apply_effects, Effect, EffectContext};
use crate::rules::{ChoiceOption, RuleTables};
use crate::value_objects::{clamp_int, SourceTag};

/// Stable key for an automatic grant.
pub fn grant_key(class_name: &str, level: u8, grant_id: &str) -> String {
    format!("class:primary:{class_name}:L{level}:{grant_id}")
}

/// Stable key for a choice point.
pub fn choice_key(class_name: &str, level: u8, choice_id: &str) -> String {
    format!("class:primary:{class_name}:L{level}:choice:{choice_id}")
}

/// Stable key for one selected option of a choice.
pub fn choice_feature_key(choice_key: &str, option_id: &str) -> String {
    format!("choice:{choice_key}:{option_id}")
}

/// Parses the class level out of a choice key for this class, used when a
/// level-down must discard choices made above the new level.
pub fn parse_choice_key_level(key: &str, class_name: &str) -> Option<u8> {
    let rest = key.strip_prefix("class:primary:")?;
    let rest = rest.strip_prefix(class_name)?;
    let rest = rest.strip_prefix(":L")?;
    let (level, rest) = rest.split_once(':')?;
    rest.strip_prefix("choice:")?;
    level.parse().ok()
}

/// Reconciles class-derived features against the current class and level.
/// Missing grants and fulfilled choices are applied; already-present ones
/// only have their scaling resources refreshed.
pub fn sync_class_features(mut record: CharacterRecord, tables: &RuleTables) -> CharacterRecord {
    let class_name = record.primary.class_name.trim().to_string();
    let class_level = clamp_int(record.primary.class_level as i32, 0, 20) as u8;
    if class_name.is_empty() || class_level == 0 {
        return record;
    }
    let Some(class) = tables.class(&class_name) else {
        return record;
    };

    for lv in 1..=class_level {
        let Some(entry) = class.levels.get(&lv) else {
            continue;
        };

        for g in &entry.grants {
            let key = grant_key(&class_name, lv, &g.id);
            let ctx = class_ctx(&class_name, class_level, lv);
            if !record.has_feature_key(&key) {
                record.add_feature(Feature {
                    key,
                    source: SourceTag::ClassPrimary,
                    name: g.name.clone(),
                    text: g.text.clone(),
                    grant_id: None,
                });
                record = apply_effects(record, &g.effects, &ctx);
            } else {
                record = refresh_resources(record, &g.effects, &ctx);
            }
        }

        for choice in &entry.choices {
            let ckey = choice_key(&class_name, lv, &choice.id);
            let choose = clamp_int(choice.choose as i32, 1, 20) as usize;
            let selected = normalized_selection(record.class_choices.get(&ckey));
            if selected.len() < choose {
                continue; // pending
            }
            for option_id in selected.iter().take(choose) {
                let fkey = choice_feature_key(&ckey, option_id);
                let opt = choice.options.iter().find(|o| &o.id == option_id);
                let ctx = class_ctx(&class_name, class_level, lv);
                if !record.has_feature_key(&fkey) {
                    record.add_feature(Feature {
                        key: fkey,
                        source: SourceTag::ClassPrimary,
                        name: format!("{}: {}", choice.name, option_name(opt, option_id)),
                        text: opt.map(|o| o.text.clone()).unwrap_or_default(),
                        grant_id: None,
                    });
                    if let Some(opt) = opt {
                        record = apply_effects(record, &opt.effects, &ctx);
                    }
                } else if let Some(opt) = opt {
                    record = refresh_resources(record, &opt.effects, &ctx);
                }
            }
        }
    }

    record
}

/// A choice point as presented to the player.
#[derive(Debug, Clone)]
pub struct ClassChoiceView {
    pub choice_key: String,
    pub class_name: String,
    pub level: u8,
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub choose: u8,
    pub options: Vec<ChoiceOption>,
    pub selected: Vec<String>,
    pub fulfilled: bool,
}

/// All choice points unlocked at the current class level, with selection
/// status.
pub fn list_class_choices(record: &CharacterRecord, tables: &RuleTables) -> Vec<ClassChoiceView> {
    let mut out = Vec::new();
    let class_name = record.primary.class_name.trim();
    let class_level = clamp_int(record.primary.class_level as i32, 0, 20) as u8;
    if class_name.is_empty() || class_level == 0 {
        return out;
    }
    let Some(class) = tables.class(class_name) else {
        return out;
    };

    for lv in 1..=class_level {
        let Some(entry) = class.levels.get(&lv) else {
            continue;
        };
        for choice in &entry.choices {
            let key = choice_key(class_name, lv, &choice.id);
            let choose = clamp_int(choice.choose as i32, 1, 20) as u8;
            let selected = normalized_selection(record.class_choices.get(&key));
            let fulfilled = selected.len() >= choose as usize;
            out.push(ClassChoiceView {
                choice_key: key,
                class_name: class_name.to_string(),
                level: lv,
                id: choice.id.clone(),
                name: choice.name.clone(),
                prompt: choice.prompt.clone(),
                choose,
                options: choice.options.clone(),
                selected,
                fulfilled,
            });
        }
    }

    out
}

/// Records a selection for a choice key, deduplicated and order-preserving.
pub fn set_class_choice(
    mut record: CharacterRecord,
    choice_key: &str,
    option_ids: &[String],
) -> CharacterRecord {
    let mut seen = BTreeSet::new();
    let cleaned: Vec<String> = option_ids
        .iter()
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect();
    record.class_choices.insert(choice_key.to_string(), cleaned);
    record
}

fn class_ctx(class_name: &str, class_level: u8, grant_level: u8) -> EffectContext {
    EffectContext {
        source: Some(SourceTag::ClassPrimary),
        class_name: Some(class_name.to_string()),
        class_level: Some(class_level),
        grant_level: Some(grant_level),
    }
}

fn refresh_resources(
    record: CharacterRecord,
    effects: &[Effect],
    ctx: &EffectContext,
) -> CharacterRecord {
    let resources: Vec<Effect> = effects
        .iter()
        .filter(|e| matches!(e, Effect::ResourceEnsure { .. }))
        .cloned()
        .collect();
    if resources.is_empty() {
        record
    } else {
        apply_effects(record, &resources, ctx)
    }
}

fn normalized_selection(value: Option<&Vec<String>>) -> Vec<String> {
    value
        .map(|v| v.iter().filter(|s| !s.is_empty()).cloned().collect())
        .unwrap_or_default()
}

fn option_name(opt: Option<&ChoiceOption>, option_id: &str) -> String {
    opt.map(|o| o.name.clone())
        .unwrap_or_else(|| option_id.to_string())
}
