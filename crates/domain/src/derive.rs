//! The normalization pass.
//!
//! Every record entering or leaving the system passes through [`derive`]:
//! after load, before save, and after every mutation. It recomputes total
//! level, clamps every numeric field into its legal range, deduplicates
//! keyed collections, and backfills structure that older persisted shapes
//! lacked. Running it twice produces the same record as running it once.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::character::{CharacterRecord, RECORD_VERSION};
use crate::rules::RuleTables;
use crate::spellcasting;
use crate::value_objects::clamp_int;

/// Normalizes a record. Never fails: out-of-range values clamp, unknown
/// entries drop, missing structure is rebuilt from what survives.
pub fn derive(mut record: CharacterRecord, tables: &RuleTables) -> CharacterRecord {
    record.version = RECORD_VERSION;
    if record.id.trim().is_empty() {
        record.id = Uuid::new_v4().simple().to_string();
    }

    // Ability scores and headline numbers.
    record.abilities.strength = clamp_int(record.abilities.strength, 1, 30);
    record.abilities.dexterity = clamp_int(record.abilities.dexterity, 1, 30);
    record.abilities.constitution = clamp_int(record.abilities.constitution, 1, 30);
    record.abilities.intelligence = clamp_int(record.abilities.intelligence, 1, 30);
    record.abilities.wisdom = clamp_int(record.abilities.wisdom, 1, 30);
    record.abilities.charisma = clamp_int(record.abilities.charisma, 1, 30);
    record.inspiration_points = clamp_int(record.inspiration_points, 0, 99);

    record.combat.hp_max = clamp_int(record.combat.hp_max, 0, 9999);
    record.combat.hp_now = clamp_int(record.combat.hp_now, 0, record.combat.hp_max);
    record.combat.hp_temp = clamp_int(record.combat.hp_temp, 0, 9999);
    record.combat.ac_base = clamp_int(record.combat.ac_base, 0, 99);
    record.combat.ac_bonus_extra = clamp_int(record.combat.ac_bonus_extra, -20, 20);
    record.combat.speed = clamp_int(record.combat.speed, 0, 999);
    record.combat.initiative_misc = clamp_int(record.combat.initiative_misc, -99, 99);
    record.proficiency_misc = clamp_int(record.proficiency_misc, -10, 10);
    record.perception_misc = clamp_int(record.perception_misc, -50, 50);

    // Multiclass is disabled: the secondary block stays present in the
    // persisted shape but is pinned inert.
    record.multiclass = false;
    record.secondary.class_level = 0;

    record.primary.class_level = clamp_int(record.primary.class_level as i32, 0, 20) as u8;
    record.level = record.total_level();

    dedup_features(&mut record);
    dedup_sourced(&mut record);
    backfill_known_by_block(&mut record);
    clamp_resources(&mut record, tables);
    clamp_hit_dice(&mut record);

    record.spells.pending_learn = clamp_int(record.spells.pending_learn, 0, 99);
    record.rest.prepared_unlock = clamp_int(record.rest.prepared_unlock, 0, 99);

    record
}

/// First occurrence of each feature key wins.
fn dedup_features(record: &mut CharacterRecord) {
    let mut seen = BTreeSet::new();
    record
        .features
        .retain(|f| !f.key.is_empty() && seen.insert(f.key.clone()));
}

/// Tool/language entries are unique by value; empty values drop.
fn dedup_sourced(record: &mut CharacterRecord) {
    for list in [
        &mut record.tool_proficiencies,
        &mut record.language_proficiencies,
    ] {
        let mut seen = BTreeSet::new();
        list.retain(|x| !x.value.is_empty() && seen.insert(x.value.clone()));
    }
}

/// Older shapes stored one flat known-spell list. If the per-block split is
/// missing, everything known belongs to the primary block. The flat list
/// stays a deduplicated superset of the blocks.
fn backfill_known_by_block(record: &mut CharacterRecord) {
    let split_total =
        record.spells.known_by_block.primary.len() + record.spells.known_by_block.secondary.len();
    if split_total == 0 && !record.spells.known.is_empty() {
        record.spells.known_by_block.primary = record.spells.known.clone();
    }
    let mut union: Vec<String> = Vec::new();
    let mut seen = BTreeSet::new();
    for id in record
        .spells
        .known
        .iter()
        .chain(record.spells.known_by_block.primary.iter())
        .chain(record.spells.known_by_block.secondary.iter())
    {
        if !id.is_empty() && seen.insert(id.clone()) {
            union.push(id.clone());
        }
    }
    record.spells.known = union;
}

/// Slot usage can never exceed the maxima the rule tables grant at the
/// current level; stale usage from a higher level clamps down.
fn clamp_resources(record: &mut CharacterRecord, tables: &RuleTables) {
    let view = spellcasting::spell_slots(record, tables);

    let pact_max = view.pact_magic.as_ref().map(|p| p.slots).unwrap_or(0);
    record.resources.pact_slots_used = clamp_int(record.resources.pact_slots_used, 0, pact_max);

    let used = std::mem::take(&mut record.resources.spell_slots_used);
    record.resources.spell_slots_used = used
        .into_iter()
        .filter(|(lv, _)| (1..=9).contains(lv))
        .map(|(lv, n)| {
            let max = view
                .spellcasting_slots
                .get(&lv)
                .copied()
                .unwrap_or(0);
            (lv, clamp_int(n, 0, max))
        })
        .collect();

    for res in &mut record.resources.custom {
        res.max = clamp_int(res.max, 0, 999);
        res.cur = clamp_int(res.cur, 0, res.max);
    }
    record.resources.custom.retain(|r| !r.name.is_empty());
}

/// Pools clamp remaining into [0, max]; a pool with no dice left to have
/// is dropped entirely, and an all-empty map collapses back to "never
/// initialized".
fn clamp_hit_dice(record: &mut CharacterRecord) {
    if let Some(pools) = record.rest.hit_dice.as_mut() {
        pools.retain(|_, p| p.max > 0);
        for p in pools.values_mut() {
            p.max = clamp_int(p.max, 0, 20);
            p.remaining = clamp_int(p.remaining, 0, p.max);
        }
        if pools.is_empty() {
            record.rest.hit_dice = None;
        }
    }
}
