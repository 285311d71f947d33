//! Built-in SRD (2014) Warlock dataset.
//!
//! One fully playable class with its subclasses, plus the backgrounds,
//! races, feats, and spell catalog the progression references. External
//! datasets with the same shape load through [`RuleTables::load_json`].

use std::collections::BTreeMap;

use crate::effects::Effect;
use crate::value_objects::{Ability, DieSize, ResetRule, Skill};

use super::{
    Background, BackgroundFeature, ChoiceDef, ChoiceOption, ClassTable, FeatDef, FeatureGrant,
    LevelEntry, PactProgression, Race, RacialTrait, RuleTables, SpellDef, SpellRules, Subclass,
};

/// Warlock spells known by class level (index 0 unused).
const SPELLS_KNOWN: [u8; 21] = [
    0, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 11, 11, 12, 12, 13, 13, 14, 14, 15, 15,
];

/// Warlock cantrips known by class level.
const CANTRIPS_KNOWN: [u8; 21] = [
    0, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
];

/// Pact Magic slot level by class level.
const PACT_SLOT_LEVEL: [u8; 21] = [
    0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5,
];

/// Pact Magic slot count by class level.
const PACT_SLOTS: [u8; 21] = [
    0, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4,
];

/// Eldritch invocations known by class level.
const INVOCATIONS_KNOWN: [u8; 21] = [
    0, 0, 2, 2, 2, 3, 3, 4, 4, 5, 5, 5, 6, 6, 6, 7, 7, 7, 8, 8, 8,
];

/// Builds the complete built-in dataset.
pub fn default_tables() -> RuleTables {
    let mut classes = BTreeMap::new();
    classes.insert("Warlock".to_string(), warlock_class());

    let mut subclasses = BTreeMap::new();
    subclasses.insert("Warlock".to_string(), warlock_subclasses());

    RuleTables {
        classes,
        subclasses,
        backgrounds: backgrounds(),
        races: races(),
        feats: feats(),
        spells: spell_catalog(),
    }
}

fn warlock_class() -> ClassTable {
    let mut mystic_arcanum = BTreeMap::new();
    mystic_arcanum.insert(11u8, 6u8);
    mystic_arcanum.insert(13, 7);
    mystic_arcanum.insert(15, 8);
    mystic_arcanum.insert(17, 9);

    ClassTable {
        hit_die: DieSize::D8,
        saves: vec![Ability::Wis, Ability::Cha],
        spell_ability: Some(Ability::Cha),
        asi_levels: vec![4, 8, 12, 16, 19],
        spells_known: SPELLS_KNOWN.to_vec(),
        cantrips_known: CANTRIPS_KNOWN.to_vec(),
        pact: Some(PactProgression {
            slot_level: PACT_SLOT_LEVEL.to_vec(),
            slots: PACT_SLOTS.to_vec(),
            invocations_known: INVOCATIONS_KNOWN.to_vec(),
        }),
        mystic_arcanum,
        levels: warlock_levels(),
        spell_list_by_level: warlock_spell_list(),
    }
}

fn warlock_levels() -> BTreeMap<u8, LevelEntry> {
    let mut levels = BTreeMap::new();

    levels.insert(
        1,
        LevelEntry {
            grants: vec![grant(
                "pact_magic",
                "Pact Magic",
                "Your arcane research and the magic bestowed on you by your patron have \
                 given you facility with spells. Your Pact Magic slots are all of the same \
                 level and refresh on a short rest.",
                vec![],
            )],
            choices: vec![],
        },
    );

    levels.insert(
        2,
        LevelEntry {
            grants: vec![],
            choices: vec![ChoiceDef {
                id: "eldritch_invocations".into(),
                name: "Eldritch Invocations".into(),
                prompt: "Choose two eldritch invocations.".into(),
                choose: 2,
                options: invocation_options(),
            }],
        },
    );

    levels.insert(
        3,
        LevelEntry {
            grants: vec![],
            choices: vec![ChoiceDef {
                id: "pact_boon".into(),
                name: "Pact Boon".into(),
                prompt: "Your patron bestows a gift upon you. Choose one boon.".into(),
                choose: 1,
                options: vec![
                    option(
                        "pact_of_the_blade",
                        "Pact of the Blade",
                        "You can create a pact weapon in your empty hand, and you are \
                         proficient with it while you wield it.",
                        vec![],
                    ),
                    option(
                        "pact_of_the_chain",
                        "Pact of the Chain",
                        "You learn the find familiar spell and can cast it as a ritual; \
                         your familiar can take special forms.",
                        vec![],
                    ),
                    option(
                        "pact_of_the_tome",
                        "Pact of the Tome",
                        "Your patron gives you a Book of Shadows with three cantrips from \
                         any class's spell list.",
                        vec![],
                    ),
                ],
            }],
        },
    );

    for (class_level, spell_level) in [(11u8, 6u8), (13, 7), (15, 8), (17, 9)] {
        levels.insert(
            class_level,
            LevelEntry {
                grants: vec![grant(
                    &format!("mystic_arcanum_{spell_level}"),
                    &format!("Mystic Arcanum ({spell_level}th)"),
                    "Your patron bestows a magical secret: choose one spell of this level \
                     as an arcanum you can cast once without a spell slot, regaining the \
                     use on a long rest.",
                    vec![Effect::ResourceEnsure {
                        name: format!("Mystic Arcanum ({spell_level}th)"),
                        reset: ResetRule::Long,
                        max: Some(1),
                        max_by_level: None,
                        fill: Some(false),
                    }],
                )],
                choices: vec![],
            },
        );
    }

    levels.insert(
        20,
        LevelEntry {
            grants: vec![grant(
                "eldritch_master",
                "Eldritch Master",
                "You can spend 1 minute entreating your patron to regain all your expended \
                 Pact Magic spell slots. Once used, you must finish a long rest before \
                 using it again.",
                vec![Effect::ResourceEnsure {
                    name: "Eldritch Master".into(),
                    reset: ResetRule::Long,
                    max: Some(1),
                    max_by_level: None,
                    fill: Some(false),
                }],
            )],
            choices: vec![],
        },
    );

    levels
}

fn invocation_options() -> Vec<ChoiceOption> {
    vec![
        option(
            "agonizing_blast",
            "Agonizing Blast",
            "When you cast eldritch blast, add your Charisma modifier to the damage it \
             deals on a hit.",
            vec![],
        ),
        option(
            "armor_of_shadows",
            "Armor of Shadows",
            "You can cast mage armor on yourself at will, without expending a spell slot.",
            vec![],
        ),
        option(
            "devils_sight",
            "Devil's Sight",
            "You can see normally in darkness, both magical and nonmagical, to a distance \
             of 120 feet.",
            vec![],
        ),
        option(
            "eldritch_sight",
            "Eldritch Sight",
            "You can cast detect magic at will, without expending a spell slot.",
            vec![],
        ),
        option(
            "fiendish_vigor",
            "Fiendish Vigor",
            "You can cast false life on yourself at will as a 1st-level spell, without \
             expending a spell slot.",
            vec![],
        ),
        option(
            "mask_of_many_faces",
            "Mask of Many Faces",
            "You can cast disguise self at will, without expending a spell slot.",
            vec![],
        ),
        option(
            "repelling_blast",
            "Repelling Blast",
            "When you hit a creature with eldritch blast, you can push the creature up to \
             10 feet away from you in a straight line.",
            vec![],
        ),
        option(
            "beast_speech",
            "Beast Speech",
            "You can cast speak with animals at will, without expending a spell slot.",
            vec![],
        ),
    ]
}

fn warlock_subclasses() -> Vec<Subclass> {
    vec![
        Subclass {
            name: "The Fiend".into(),
            spell_rules: Some(SpellRules {
                always_prepared_by_level: by_level(&[
                    (1, &["burning_hands", "command"]),
                    (3, &["scorching_ray"]),
                    (5, &["fireball"]),
                ]),
                spell_source_class: None,
            }),
        },
        Subclass {
            name: "The Archfey".into(),
            spell_rules: Some(SpellRules {
                always_prepared_by_level: by_level(&[
                    (1, &["faerie_fire", "sleep"]),
                    (3, &["phantasmal_force", "calm_emotions"]),
                    (5, &["blink"]),
                ]),
                spell_source_class: None,
            }),
        },
        Subclass {
            name: "The Great Old One".into(),
            spell_rules: Some(SpellRules {
                always_prepared_by_level: by_level(&[
                    (1, &["tashas_hideous_laughter"]),
                    (3, &["phantasmal_force"]),
                    (5, &["telekinesis"]),
                ]),
                spell_source_class: None,
            }),
        },
    ]
}

fn warlock_spell_list() -> BTreeMap<u8, Vec<String>> {
    by_level(&[
        (
            0,
            &[
                "eldritch_blast",
                "chill_touch",
                "mage_hand",
                "minor_illusion",
                "prestidigitation",
            ][..],
        ),
        (
            1,
            &[
                "armor_of_agathys",
                "charm_person",
                "hellish_rebuke",
                "hex",
                "witch_bolt",
            ],
        ),
        (2, &["darkness", "hold_person", "invisibility", "misty_step"]),
        (3, &["counterspell", "fly", "hypnotic_pattern"]),
        (4, &["banishment", "dimension_door"]),
        (5, &["contact_other_plane", "hold_monster"]),
        (6, &["circle_of_death", "true_seeing"]),
        (7, &["finger_of_death", "plane_shift"]),
        (8, &["demiplane", "dominate_monster"]),
        (9, &["astral_projection", "foresight"]),
    ])
}

fn spell_catalog() -> Vec<SpellDef> {
    let defs: &[(&str, &str, u8, &str)] = &[
        ("eldritch_blast", "Eldritch Blast", 0, "Evocation"),
        ("chill_touch", "Chill Touch", 0, "Necromancy"),
        ("mage_hand", "Mage Hand", 0, "Conjuration"),
        ("minor_illusion", "Minor Illusion", 0, "Illusion"),
        ("prestidigitation", "Prestidigitation", 0, "Transmutation"),
        ("armor_of_agathys", "Armor of Agathys", 1, "Abjuration"),
        ("burning_hands", "Burning Hands", 1, "Evocation"),
        ("charm_person", "Charm Person", 1, "Enchantment"),
        ("command", "Command", 1, "Enchantment"),
        ("faerie_fire", "Faerie Fire", 1, "Evocation"),
        ("hellish_rebuke", "Hellish Rebuke", 1, "Evocation"),
        ("hex", "Hex", 1, "Enchantment"),
        ("sleep", "Sleep", 1, "Enchantment"),
        (
            "tashas_hideous_laughter",
            "Tasha's Hideous Laughter",
            1,
            "Enchantment",
        ),
        ("witch_bolt", "Witch Bolt", 1, "Evocation"),
        ("calm_emotions", "Calm Emotions", 2, "Enchantment"),
        ("darkness", "Darkness", 2, "Evocation"),
        ("hold_person", "Hold Person", 2, "Enchantment"),
        ("invisibility", "Invisibility", 2, "Illusion"),
        ("misty_step", "Misty Step", 2, "Conjuration"),
        ("phantasmal_force", "Phantasmal Force", 2, "Illusion"),
        ("scorching_ray", "Scorching Ray", 2, "Evocation"),
        ("blink", "Blink", 3, "Transmutation"),
        ("counterspell", "Counterspell", 3, "Abjuration"),
        ("fireball", "Fireball", 3, "Evocation"),
        ("fly", "Fly", 3, "Transmutation"),
        ("hypnotic_pattern", "Hypnotic Pattern", 3, "Illusion"),
        ("banishment", "Banishment", 4, "Abjuration"),
        ("dimension_door", "Dimension Door", 4, "Conjuration"),
        ("contact_other_plane", "Contact Other Plane", 5, "Divination"),
        ("hold_monster", "Hold Monster", 5, "Enchantment"),
        ("telekinesis", "Telekinesis", 5, "Transmutation"),
        ("circle_of_death", "Circle of Death", 6, "Necromancy"),
        ("true_seeing", "True Seeing", 6, "Divination"),
        ("finger_of_death", "Finger of Death", 7, "Necromancy"),
        ("plane_shift", "Plane Shift", 7, "Conjuration"),
        ("demiplane", "Demiplane", 8, "Conjuration"),
        ("dominate_monster", "Dominate Monster", 8, "Enchantment"),
        ("astral_projection", "Astral Projection", 9, "Necromancy"),
        ("foresight", "Foresight", 9, "Divination"),
    ];
    defs.iter()
        .map(|(id, name, level, school)| SpellDef {
            id: (*id).into(),
            name: (*name).into(),
            level: *level,
            school: (*school).into(),
        })
        .collect()
}

fn backgrounds() -> Vec<Background> {
    vec![
        Background {
            id: "acolyte".into(),
            name: "Acolyte".into(),
            skills: vec![Skill::Insight, Skill::Religion],
            tools: vec![],
            languages: vec!["Celestial".into(), "Infernal".into()],
            feature: Some(BackgroundFeature {
                name: "Shelter of the Faithful".into(),
                text: "You and your companions can expect free healing and care at a \
                       temple, shrine, or other established presence of your faith."
                    .into(),
            }),
        },
        Background {
            id: "charlatan".into(),
            name: "Charlatan".into(),
            skills: vec![Skill::Deception, Skill::SleightOfHand],
            tools: vec!["Disguise kit".into(), "Forgery kit".into()],
            languages: vec![],
            feature: Some(BackgroundFeature {
                name: "False Identity".into(),
                text: "You have created a second identity that includes documentation, \
                       established acquaintances, and disguises."
                    .into(),
            }),
        },
        Background {
            id: "sage".into(),
            name: "Sage".into(),
            skills: vec![Skill::Arcana, Skill::History],
            tools: vec![],
            languages: vec!["Draconic".into(), "Elvish".into()],
            feature: Some(BackgroundFeature {
                name: "Researcher".into(),
                text: "When you attempt to learn or recall a piece of lore, you often \
                       know where and from whom you can obtain it."
                    .into(),
            }),
        },
    ]
}

fn races() -> Vec<Race> {
    vec![
        Race {
            id: "human".into(),
            name: "Human".into(),
            ability_bonuses: [
                (Ability::Str, 1),
                (Ability::Dex, 1),
                (Ability::Con, 1),
                (Ability::Int, 1),
                (Ability::Wis, 1),
                (Ability::Cha, 1),
            ]
            .into_iter()
            .collect(),
            speed: Some(30),
            skills: vec![],
            tools: vec![],
            languages: vec!["Common".into()],
            traits: vec![],
            effects: vec![],
        },
        Race {
            id: "tiefling".into(),
            name: "Tiefling".into(),
            ability_bonuses: [(Ability::Cha, 2), (Ability::Int, 1)].into_iter().collect(),
            speed: Some(30),
            skills: vec![],
            tools: vec![],
            languages: vec!["Common".into(), "Infernal".into()],
            traits: vec![
                RacialTrait {
                    name: "Darkvision".into(),
                    text: "You can see in dim light within 60 feet of you as if it were \
                           bright light, and in darkness as if it were dim light."
                        .into(),
                },
                RacialTrait {
                    name: "Hellish Resistance".into(),
                    text: "You have resistance to fire damage.".into(),
                },
                RacialTrait {
                    name: "Infernal Legacy".into(),
                    text: "You know the thaumaturgy cantrip. At higher levels you can \
                           cast hellish rebuke and darkness once per long rest."
                        .into(),
                },
            ],
            effects: vec![],
        },
        Race {
            id: "half_elf".into(),
            name: "Half-Elf".into(),
            ability_bonuses: [(Ability::Cha, 2)].into_iter().collect(),
            speed: Some(30),
            skills: vec![Skill::Persuasion, Skill::Insight],
            tools: vec![],
            languages: vec!["Common".into(), "Elvish".into()],
            traits: vec![
                RacialTrait {
                    name: "Darkvision".into(),
                    text: "You can see in dim light within 60 feet of you as if it were \
                           bright light, and in darkness as if it were dim light."
                        .into(),
                },
                RacialTrait {
                    name: "Fey Ancestry".into(),
                    text: "You have advantage on saving throws against being charmed, \
                           and magic can't put you to sleep."
                        .into(),
                },
            ],
            effects: vec![],
        },
    ]
}

fn feats() -> Vec<FeatDef> {
    vec![
        FeatDef {
            id: "feat_tough".into(),
            name: "Tough".into(),
            requirements_text: String::new(),
            effects_text: vec![
                "Your hit point maximum increases by an amount equal to twice your level \
                 when you gain this feat."
                    .into(),
                "Whenever you gain a level thereafter, your hit point maximum increases \
                 by an additional 2 hit points."
                    .into(),
            ],
        },
        FeatDef {
            id: "feat_alert".into(),
            name: "Alert".into(),
            requirements_text: String::new(),
            effects_text: vec![
                "You gain a +5 bonus to initiative.".into(),
                "You can't be surprised while you are conscious.".into(),
                "Other creatures don't gain advantage on attack rolls against you as a \
                 result of being unseen by you."
                    .into(),
            ],
        },
        FeatDef {
            id: "feat_lucky".into(),
            name: "Lucky".into(),
            requirements_text: String::new(),
            effects_text: vec![
                "You have 3 luck points. Whenever you make an attack roll, ability \
                 check, or saving throw, you can spend one luck point to roll an \
                 additional d20."
                    .into(),
                "You regain your expended luck points when you finish a long rest.".into(),
            ],
        },
    ]
}

fn grant(id: &str, name: &str, text: &str, effects: Vec<Effect>) -> FeatureGrant {
    FeatureGrant {
        id: id.into(),
        name: name.into(),
        text: text.into(),
        effects,
    }
}

fn option(id: &str, name: &str, text: &str, effects: Vec<Effect>) -> ChoiceOption {
    ChoiceOption {
        id: id.into(),
        name: name.into(),
        text: text.into(),
        effects,
    }
}

fn by_level(entries: &[(u8, &[&str])]) -> BTreeMap<u8, Vec<String>> {
    entries
        .iter()
        .map(|(lv, ids)| (*lv, ids.iter().map(|s| (*s).to_string()).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warlock_progression_tables_cover_all_levels() {
        let t = default_tables();
        let wl = t.class("Warlock").unwrap();
        assert_eq!(wl.spells_known.len(), 21);
        assert_eq!(wl.cantrips_known.len(), 21);
        let pact = wl.pact.as_ref().unwrap();
        assert_eq!(pact.slots_at(1), 1);
        assert_eq!(pact.slots_at(2), 2);
        assert_eq!(pact.slots_at(11), 3);
        assert_eq!(pact.slots_at(17), 4);
        assert_eq!(pact.slot_level_at(9), 5);
        assert_eq!(pact.invocations_at(2), 2);
        assert_eq!(pact.invocations_at(18), 8);
    }

    #[test]
    fn every_listed_spell_exists_in_the_catalog() {
        let t = default_tables();
        let wl = t.class("Warlock").unwrap();
        for ids in wl.spell_list_by_level.values() {
            for id in ids {
                assert!(t.spell(id).is_some(), "missing spell {id}");
            }
        }
        for sub in t.subclasses_for("Warlock") {
            let rules = sub.spell_rules.as_ref().unwrap();
            for ids in rules.always_prepared_by_level.values() {
                for id in ids {
                    assert!(t.spell(id).is_some(), "missing subclass spell {id}");
                }
            }
        }
    }

    #[test]
    fn arcanum_grants_carry_single_use_long_rest_pools() {
        let t = default_tables();
        let wl = t.class("Warlock").unwrap();
        let entry = &wl.levels[&11];
        let g = &entry.grants[0];
        assert!(matches!(
            &g.effects[0],
            Effect::ResourceEnsure { reset: ResetRule::Long, max: Some(1), .. }
        ));
    }
}
