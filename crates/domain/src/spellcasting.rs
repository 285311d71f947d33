//! Spell slot and known-spell arithmetic.
//!
//! Pact Magic gives few, high slots that are all the same level; regular
//! spellcasting slots stay empty for a pure pact caster but the view keeps
//! both shapes so slot clamping is uniform.

use std::collections::BTreeMap;

use crate::character::CharacterRecord;
use crate::rules::{RuleTables, SpellDef};
use crate::value_objects::clamp_int;

/// Slot availability for the current record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellSlotsView {
    pub effective_spellcaster_level: u8,
    /// Slot level -> slot count from shared spellcasting progression.
    pub spellcasting_slots: BTreeMap<u8, i32>,
    pub pact_magic: Option<PactMagicView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PactMagicView {
    pub slots: i32,
    pub slot_level: u8,
    /// Spell levels unlocked as arcana, ascending.
    pub arcanum: Vec<u8>,
}

/// Computes slot availability from the class tables.
pub fn spell_slots(record: &CharacterRecord, tables: &RuleTables) -> SpellSlotsView {
    let class_level = clamp_int(record.primary.class_level as i32, 0, 20) as u8;
    let Some(class) = tables.class(record.primary.class_name.trim()) else {
        return SpellSlotsView::default();
    };

    let pact_magic = class.pact.as_ref().and_then(|pact| {
        let slots = pact.slots_at(class_level) as i32;
        if slots == 0 {
            return None;
        }
        let arcanum = class
            .mystic_arcanum
            .iter()
            .filter(|(need, _)| class_level >= **need)
            .map(|(_, spell_level)| *spell_level)
            .collect();
        Some(PactMagicView {
            slots,
            slot_level: pact.slot_level_at(class_level),
            arcanum,
        })
    });

    SpellSlotsView {
        effective_spellcaster_level: 0,
        spellcasting_slots: BTreeMap::new(),
        pact_magic,
    }
}

/// Known-spell limit at a class level, `None` for classes without one.
pub fn spells_known_limit(tables: &RuleTables, class_name: &str, class_level: u8) -> Option<u8> {
    let class = tables.class(class_name)?;
    if class.spells_known.is_empty() {
        return None;
    }
    Some(class.spells_known_at(class_level))
}

/// Cantrip limit at a class level.
pub fn cantrips_known_limit(tables: &RuleTables, class_name: &str, class_level: u8) -> Option<u8> {
    let class = tables.class(class_name)?;
    if class.cantrips_known.is_empty() {
        return None;
    }
    Some(class.cantrips_known_at(class_level))
}

/// Highest castable spell level: the pact slot level for pact casters.
pub fn max_spell_level(tables: &RuleTables, class_name: &str, class_level: u8) -> u8 {
    tables
        .class(class_name)
        .and_then(|c| c.pact.as_ref())
        .map(|p| p.slot_level_at(clamp_int(class_level as i32, 0, 20) as u8))
        .unwrap_or(0)
}

/// Spell ids always prepared by the current subclass at the current level.
pub fn always_prepared_ids(record: &CharacterRecord, tables: &RuleTables) -> Vec<String> {
    let mut out = Vec::new();
    let class_name = record.primary.class_name.trim();
    let sub_name = record.primary.subclass.trim();
    if class_name.is_empty() || sub_name.is_empty() {
        return out;
    }
    let Some(sub) = tables.subclass(class_name, sub_name) else {
        return out;
    };
    let Some(rules) = &sub.spell_rules else {
        return out;
    };
    let level = clamp_int(record.primary.class_level as i32, 0, 20) as u8;
    for (need, ids) in &rules.always_prepared_by_level {
        if level >= *need {
            for id in ids {
                if !out.contains(id) {
                    out.push(id.clone());
                }
            }
        }
    }
    out
}

/// Everything the character may currently learn or cast: the class list up
/// to the highest castable level (arcanum levels included), plus the
/// subclass's always-prepared spells.
pub fn allowed_spell_ids(record: &CharacterRecord, tables: &RuleTables) -> Vec<String> {
    let mut out = Vec::new();
    let class_name = record.primary.class_name.trim();
    let class_level = clamp_int(record.primary.class_level as i32, 0, 20) as u8;
    let Some(class) = tables.class(class_name) else {
        return out;
    };
    if class_level == 0 {
        return out;
    }

    let mut max_lv = max_spell_level(tables, class_name, class_level);
    for (need, spell_level) in &class.mystic_arcanum {
        if class_level >= *need {
            max_lv = max_lv.max(*spell_level);
        }
    }

    // A subclass may substitute another class's spell list.
    let list_source = tables
        .subclass(class_name, record.primary.subclass.trim())
        .and_then(|s| s.spell_rules.as_ref())
        .and_then(|r| r.spell_source_class.as_deref())
        .and_then(|other| tables.class(other))
        .map(|c| &c.spell_list_by_level)
        .unwrap_or(&class.spell_list_by_level);

    for (lv, ids) in list_source {
        if *lv > max_lv {
            continue;
        }
        for id in ids {
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
    }

    for id in always_prepared_ids(record, tables) {
        if !out.contains(&id) {
            out.push(id);
        }
    }

    out
}

/// Groups a set of allowed ids by spell level, sorted by name within each.
pub fn spells_by_level<'a>(
    tables: &'a RuleTables,
    allowed_ids: &[String],
) -> BTreeMap<u8, Vec<&'a SpellDef>> {
    let mut by_level: BTreeMap<u8, Vec<&SpellDef>> = BTreeMap::new();
    for id in allowed_ids {
        if let Some(spell) = tables.spell(id) {
            by_level.entry(spell.level).or_default().push(spell);
        }
    }
    for spells in by_level.values_mut() {
        spells.sort_by(|a, b| a.name.cmp(&b.name));
    }
    by_level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;

    fn warlock_at(level: u8) -> CharacterRecord {
        let mut c = CharacterRecord::default();
        c.primary.class_name = "Warlock".into();
        c.primary.class_level = level;
        c
    }

    #[test]
    fn pact_magic_scales_with_level() {
        let t = rules::default_tables();
        let v = spell_slots(&warlock_at(1), &t);
        let pact = v.pact_magic.unwrap();
        assert_eq!(pact.slots, 1);
        assert_eq!(pact.slot_level, 1);

        let v = spell_slots(&warlock_at(17), &t);
        let pact = v.pact_magic.unwrap();
        assert_eq!(pact.slots, 4);
        assert_eq!(pact.slot_level, 5);
        assert_eq!(pact.arcanum, vec![6, 7, 8, 9]);
    }

    #[test]
    fn no_class_means_no_slots() {
        let t = rules::default_tables();
        let v = spell_slots(&CharacterRecord::default(), &t);
        assert!(v.pact_magic.is_none());
        assert!(v.spellcasting_slots.is_empty());
    }

    #[test]
    fn known_limits_follow_the_tables() {
        let t = rules::default_tables();
        assert_eq!(spells_known_limit(&t, "Warlock", 1), Some(2));
        assert_eq!(spells_known_limit(&t, "Warlock", 10), Some(10));
        assert_eq!(spells_known_limit(&t, "Warlock", 20), Some(15));
        assert_eq!(cantrips_known_limit(&t, "Warlock", 4), Some(3));
        assert_eq!(spells_known_limit(&t, "Wizard", 5), None);
    }

    #[test]
    fn allowed_spells_cap_at_pact_slot_level() {
        let t = rules::default_tables();
        let allowed = allowed_spell_ids(&warlock_at(5), &t);
        assert!(allowed.contains(&"counterspell".to_string())); // level 3
        assert!(!allowed.contains(&"banishment".to_string())); // level 4
        assert!(allowed.contains(&"eldritch_blast".to_string()));
    }

    #[test]
    fn arcanum_levels_extend_the_allowed_list() {
        let t = rules::default_tables();
        let allowed = allowed_spell_ids(&warlock_at(11), &t);
        assert!(allowed.contains(&"circle_of_death".to_string())); // level 6
        assert!(!allowed.contains(&"finger_of_death".to_string())); // level 7
    }

    #[test]
    fn subclass_spells_are_always_prepared_and_allowed() {
        let t = rules::default_tables();
        let mut c = warlock_at(5);
        c.primary.subclass = "The Fiend".into();
        let ap = always_prepared_ids(&c, &t);
        assert!(ap.contains(&"burning_hands".to_string()));
        assert!(ap.contains(&"fireball".to_string()));
        let allowed = allowed_spell_ids(&c, &t);
        assert!(allowed.contains(&"scorching_ray".to_string()));

        c.primary.class_level = 2;
        let ap = always_prepared_ids(&c, &t);
        assert!(!ap.contains(&"scorching_ray".to_string()));
    }

    #[test]
    fn grouping_sorts_by_name_within_level() {
        let t = rules::default_tables();
        let allowed = allowed_spell_ids(&warlock_at(3), &t);
        let grouped = spells_by_level(&t, &allowed);
        let cantrips = &grouped[&0];
        let names: Vec<_> = cantrips.iter().map(|s| s.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
