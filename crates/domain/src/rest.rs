//! Short and long rests.
//!
//! Dice rolls are injected as a closure so the rules stay deterministic
//! under test; callers supply real randomness at the edge.

use std::collections::BTreeMap;

use crate::character::{CharacterRecord, HitDicePool};
use crate::rules::RuleTables;
use crate::value_objects::{clamp_int, Ability, DieSize, ResetRule};

/// How spent hit dice heal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMode {
    /// Roll each die via the injected roller.
    Roll,
    /// Take the fixed average (faces/2 + 1) per die.
    Average,
}

/// Full pools implied by the current class levels: one hit die per class
/// level, of the class's die size.
pub fn default_hit_dice(
    record: &CharacterRecord,
    tables: &RuleTables,
) -> BTreeMap<DieSize, HitDicePool> {
    let mut pools = BTreeMap::new();
    let level = clamp_int(record.primary.class_level as i32, 0, 20);
    if level > 0 {
        if let Some(die) = tables.hit_die_for_class(record.primary.class_name.trim()) {
            pools.insert(
                die,
                HitDicePool {
                    max: level,
                    remaining: level,
                },
            );
        }
    }
    pools
}

/// Spends hit dice to heal and resets what a short rest restores: Pact
/// Magic slots and short-reset resource pools. `roll` receives the die's
/// face count and returns a roll in `1..=faces`; it is only consulted in
/// [`RestMode::Roll`].
pub fn short_rest(
    mut record: CharacterRecord,
    spend: &BTreeMap<DieSize, i32>,
    mode: RestMode,
    tables: &RuleTables,
    mut roll: impl FnMut(i32) -> i32,
) -> CharacterRecord {
    if record.rest.hit_dice.is_none() {
        record.rest.hit_dice = Some(default_hit_dice(&record, tables));
    }

    let con_mod = record.abilities.modifier(Ability::Con);
    let mut healed = 0i32;

    if let Some(pools) = record.rest.hit_dice.as_mut() {
        for (die, requested) in spend {
            let requested = clamp_int(*requested, 0, 999);
            let Some(pool) = pools.get_mut(die) else {
                continue;
            };
            let spent = requested.min(pool.remaining);
            pool.remaining -= spent;

            let faces = die.faces();
            for _ in 0..spent {
                let base = match mode {
                    RestMode::Average => die.average(),
                    RestMode::Roll => clamp_int(roll(faces), 1, faces),
                };
                healed += (base + con_mod).max(0);
            }
        }
    }

    record.combat.hp_now = clamp_int(
        record.combat.hp_now + healed,
        0,
        record.combat.hp_max.max(0),
    );

    record.resources.pact_slots_used = 0;
    for res in &mut record.resources.custom {
        if res.reset == ResetRule::Short {
            res.cur = res.max;
        }
    }

    record
}

/// A long rest restores everything: hit dice pools, hit points, temp HP
/// cleared, all slot usage zeroed, and long-reset pools refilled. The
/// prepared-spells unlock counter ticks up.
pub fn long_rest(mut record: CharacterRecord, tables: &RuleTables) -> CharacterRecord {
    record.rest.hit_dice = Some(default_hit_dice(&record, tables));
    record.rest.prepared_unlock = clamp_int(record.rest.prepared_unlock + 1, 0, 99);

    record.combat.hp_now = record.combat.hp_max;
    record.combat.hp_temp = 0;

    for used in record.resources.spell_slots_used.values_mut() {
        *used = 0;
    }
    record.resources.pact_slots_used = 0;
    for res in &mut record.resources.custom {
        if res.reset == ResetRule::Long {
            res.cur = res.max;
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CustomResource;
    use crate::rules;

    fn warlock_at(level: u8) -> CharacterRecord {
        let mut c = CharacterRecord::default();
        c.primary.class_name = "Warlock".into();
        c.primary.class_level = level;
        c
    }

    #[test]
    fn default_pools_match_class_levels() {
        let t = rules::default_tables();
        let pools = default_hit_dice(&warlock_at(5), &t);
        assert_eq!(pools[&DieSize::D8], HitDicePool { max: 5, remaining: 5 });
    }

    #[test]
    fn short_rest_heals_per_die_with_con() {
        let t = rules::default_tables();
        let mut c = warlock_at(3);
        c.abilities.constitution = 14; // +2
        c.combat.hp_max = 24;
        c.combat.hp_now = 5;

        let mut spend = BTreeMap::new();
        spend.insert(DieSize::D8, 2);
        let mut rolls = [3, 7].into_iter();
        let c = short_rest(c, &spend, RestMode::Roll, &t, |_| rolls.next().unwrap());

        // (3+2) + (7+2) = 14 healed
        assert_eq!(c.combat.hp_now, 19);
        assert_eq!(c.rest.hit_dice.as_ref().unwrap()[&DieSize::D8].remaining, 1);
    }

    #[test]
    fn short_rest_never_spends_more_dice_than_remain() {
        let t = rules::default_tables();
        let mut c = warlock_at(2);
        c.combat.hp_max = 50;
        c.combat.hp_now = 1;
        let mut spend = BTreeMap::new();
        spend.insert(DieSize::D8, 10);
        let c = short_rest(c, &spend, RestMode::Average, &t, |_| unreachable!());
        assert_eq!(c.rest.hit_dice.as_ref().unwrap()[&DieSize::D8].remaining, 0);
        // 2 dice * (5 average + 0 con)
        assert_eq!(c.combat.hp_now, 11);
    }

    #[test]
    fn short_rest_restores_pact_slots_and_short_pools() {
        let t = rules::default_tables();
        let mut c = warlock_at(5);
        c.resources.pact_slots_used = 2;
        c.resources.custom.push(CustomResource {
            name: "Ember of the Fire".into(),
            cur: 0,
            max: 2,
            reset: ResetRule::Short,
            source: None,
        });
        c.resources.custom.push(CustomResource {
            name: "Mystic Arcanum (6th)".into(),
            cur: 0,
            max: 1,
            reset: ResetRule::Long,
            source: None,
        });
        let c = short_rest(c, &BTreeMap::new(), RestMode::Average, &t, |_| 1);
        assert_eq!(c.resources.pact_slots_used, 0);
        assert_eq!(c.resources.custom[0].cur, 2);
        assert_eq!(c.resources.custom[1].cur, 0, "long pools stay spent");
    }

    #[test]
    fn long_rest_restores_everything() {
        let t = rules::default_tables();
        let mut c = warlock_at(6);
        c.combat.hp_max = 40;
        c.combat.hp_now = 3;
        c.combat.hp_temp = 5;
        c.resources.pact_slots_used = 2;
        c.resources.spell_slots_used.insert(1, 2);
        c.resources.custom.push(CustomResource {
            name: "Mystic Arcanum (6th)".into(),
            cur: 0,
            max: 1,
            reset: ResetRule::Long,
            source: None,
        });
        let mut pools = BTreeMap::new();
        pools.insert(DieSize::D8, HitDicePool { max: 6, remaining: 1 });
        c.rest.hit_dice = Some(pools);

        let c = long_rest(c, &t);
        assert_eq!(c.combat.hp_now, 40);
        assert_eq!(c.combat.hp_temp, 0);
        assert_eq!(c.resources.pact_slots_used, 0);
        assert_eq!(c.resources.spell_slots_used[&1], 0);
        assert_eq!(c.resources.custom[0].cur, 1);
        assert_eq!(c.rest.hit_dice.as_ref().unwrap()[&DieSize::D8].remaining, 6);
        assert_eq!(c.rest.prepared_unlock, 1);
    }
}
