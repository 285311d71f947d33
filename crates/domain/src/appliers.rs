//! Background and race application.
//!
//! Both follow the same shape: strip what the previous selection granted
//! (the caller strips backgrounds; race application reverses its own ability
//! bonuses first), then apply the new selection's grants with attribution.

use crate::attribution::strip_source;
use crate::character::{add_sourced_unique, CharacterRecord, Feature};
use crate::effects::{apply_effects, EffectContext};
use crate::rules::{Background, Race};
use crate::value_objects::{clamp_int, ProficiencyRank, SourceTag};

/// Applies a background. Callers strip `SourceTag::Background` first when
/// switching; passing `None` just clears the selection fields.
pub fn apply_background(
    mut record: CharacterRecord,
    background: Option<&Background>,
) -> CharacterRecord {
    let Some(bg) = background else {
        record.background_id = String::new();
        record.background_name = String::new();
        return record;
    };
    record.background_id = bg.id.clone();
    record.background_name = bg.name.clone();

    for skill in &bg.skills {
        if !record.skill_rank(*skill).is_trained() {
            record.skills.insert(*skill, ProficiencyRank::Proficient);
        }
        record
            .prof_sources
            .skills
            .insert(*skill, SourceTag::Background);
    }

    for tool in &bg.tools {
        add_sourced_unique(&mut record.tool_proficiencies, tool, SourceTag::Background);
    }
    for lang in &bg.languages {
        add_sourced_unique(
            &mut record.language_proficiencies,
            lang,
            SourceTag::Background,
        );
    }

    if let Some(feature) = &bg.feature {
        if !feature.name.is_empty() || !feature.text.is_empty() {
            record.add_feature(Feature {
                key: format!("bg:{}", if bg.id.is_empty() { &bg.name } else { &bg.id }),
                source: SourceTag::Background,
                name: feature.name.clone(),
                text: feature.text.clone(),
                grant_id: None,
            });
        }
    }

    record
}

/// Applies a race: reverses the previous race's ability bonuses, strips all
/// race-sourced grants, then applies the new race's bonuses, speed,
/// proficiencies, traits, and structured effects. `None` deselects.
pub fn apply_race(mut record: CharacterRecord, race: Option<&Race>) -> CharacterRecord {
    // Reverse previously applied ability bonuses exactly.
    let applied = std::mem::take(&mut record.race_bonuses_applied);
    for (ability, amount) in applied {
        let amount = clamp_int(amount, -10, 10);
        let cur = record.abilities.get(ability);
        record.abilities.set(ability, clamp_int(cur - amount, 1, 30));
    }

    record = strip_source(record, SourceTag::Race);

    let Some(race) = race else {
        record.race_id = String::new();
        record.race = String::new();
        return record;
    };
    record.race_id = race.id.clone();
    record.race = race.name.clone();

    for (ability, amount) in &race.ability_bonuses {
        let amount = clamp_int(*amount, -10, 10);
        let cur = record.abilities.get(*ability);
        record.abilities.set(*ability, clamp_int(cur + amount, 1, 30));
        *record.race_bonuses_applied.entry(*ability).or_insert(0) += amount;
    }

    if let Some(speed) = race.speed {
        record.combat.speed = clamp_int(speed, 0, 999);
    }

    for skill in &race.skills {
        if !record.skill_rank(*skill).is_trained() {
            record.skills.insert(*skill, ProficiencyRank::Proficient);
        }
        record.prof_sources.skills.insert(*skill, SourceTag::Race);
    }

    for tool in &race.tools {
        add_sourced_unique(&mut record.tool_proficiencies, tool, SourceTag::Race);
    }
    for lang in &race.languages {
        add_sourced_unique(&mut record.language_proficiencies, lang, SourceTag::Race);
    }

    for tr in &race.traits {
        if tr.name.is_empty() && tr.text.is_empty() {
            continue;
        }
        record.add_feature(Feature {
            key: format!(
                "race:{}:{}",
                if race.id.is_empty() { &race.name } else { &race.id },
                tr.name
            ),
            source: SourceTag::Race,
            name: tr.name.clone(),
            text: tr.text.clone(),
            grant_id: None,
        });
    }

    if !race.effects.is_empty() {
        record = apply_effects(
            record,
            &race.effects,
            &EffectContext::for_source(SourceTag::Race),
        );
    }

    record
}
