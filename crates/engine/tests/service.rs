//! Integration tests for the character service: load tolerance, the save
//! pipeline, origin switches, level up through the store, and remote sync.

use std::collections::BTreeMap;

use async_trait::async_trait;

use hexbound_domain::level_up::Step;
use hexbound_domain::rest::RestMode;
use hexbound_domain::rules::default_tables;
use hexbound_domain::value_objects::{DieSize, Skill};
use hexbound_domain::{CharacterRecord, CHAR_STORAGE_KEY};
use hexbound_engine::persistence::{JsonFileStore, MemoryStore};
use hexbound_engine::ports::{CharacterStore, RemoteSync, SyncAck, SyncLoad};
use hexbound_engine::CharacterService;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("hexbound_engine=debug")
        .with_test_writer()
        .try_init();
}

fn warlock_service(store: MemoryStore) -> CharacterService<MemoryStore> {
    let mut svc = CharacterService::load(store, default_tables()).unwrap();
    svc.edit(|r| {
        r.primary.class_name = "Warlock".into();
        r.primary.subclass = "The Fiend".into();
        r.abilities.constitution = 14;
        r.combat.hp_max = 10;
        r.combat.hp_now = 10;
    })
    .unwrap();
    svc
}

#[test]
fn empty_store_loads_a_fresh_level_one_character() -> anyhow::Result<()> {
    init_tracing();
    let svc = CharacterService::load(MemoryStore::new(), default_tables())?;
    assert_eq!(svc.record().level, 1);
    assert!(!svc.record().id.is_empty());
    Ok(())
}

#[test]
fn malformed_payload_falls_back_to_a_default_record() -> anyhow::Result<()> {
    init_tracing();
    let store = MemoryStore::new();
    store.set(CHAR_STORAGE_KEY, b"{not json")?;
    let svc = CharacterService::load(store, default_tables())?;
    assert_eq!(svc.record().level, 1);
    Ok(())
}

#[test]
fn partial_payload_merges_over_defaults() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set(
        CHAR_STORAGE_KEY,
        br#"{"name":"Velora","primary":{"className":"Warlock","classLevel":3}}"#,
    )?;
    let svc = CharacterService::load(store, default_tables())?;
    assert_eq!(svc.record().name, "Velora");
    assert_eq!(svc.record().level, 3);
    // Structural defaults survive the merge.
    assert_eq!(svc.record().abilities.strength, 10);
    // The class sync runs on load: level 1 grants are present.
    assert!(svc
        .record()
        .features
        .iter()
        .any(|f| f.key == "class:primary:Warlock:L1:pact_magic"));
    Ok(())
}

#[test]
fn background_switch_strips_the_old_grants() -> anyhow::Result<()> {
    let mut svc = warlock_service(MemoryStore::new());
    svc.select_background(Some("acolyte"))?;
    assert!(svc.record().skill_rank(Skill::Religion).is_trained());

    svc.select_background(Some("sage"))?;
    assert!(!svc.record().skill_rank(Skill::Religion).is_trained());
    assert!(svc.record().skill_rank(Skill::Arcana).is_trained());
    assert_eq!(svc.record().background_id, "sage");
    Ok(())
}

#[test]
fn race_reselection_reverses_ability_bonuses_exactly() -> anyhow::Result<()> {
    let mut svc = warlock_service(MemoryStore::new());
    svc.select_race(Some("tiefling"))?; // CHA +2, INT +1
    assert_eq!(svc.record().abilities.charisma, 12);
    assert_eq!(svc.record().abilities.intelligence, 11);

    svc.select_race(Some("half_elf"))?; // CHA +2 only
    assert_eq!(svc.record().abilities.charisma, 12);
    assert_eq!(svc.record().abilities.intelligence, 10);
    Ok(())
}

#[test]
fn class_choice_selection_materializes_features() -> anyhow::Result<()> {
    let mut svc = warlock_service(MemoryStore::new());
    svc.edit(|r| r.primary.class_level = 2)?;

    let choices = svc.class_choices();
    let invocations = choices
        .iter()
        .find(|c| c.id == "eldritch_invocations")
        .expect("level 2 unlocks invocations");
    assert_eq!(invocations.choose, 2);
    assert!(!invocations.fulfilled);

    let picks: Vec<String> = vec!["agonizing_blast".into(), "devils_sight".into()];
    let key = invocations.choice_key.clone();
    svc.choose(&key, &picks)?;

    assert!(svc
        .record()
        .features
        .iter()
        .any(|f| f.key == format!("choice:{key}:agonizing_blast")));
    assert!(svc.class_choices().iter().all(|c| c.fulfilled));
    Ok(())
}

#[test]
fn level_up_commits_and_undoes_through_the_store() -> anyhow::Result<()> {
    init_tracing();
    let store = MemoryStore::new();
    let mut svc = warlock_service(store.clone());
    let before = svc.record().clone();

    let mut wiz = svc.begin_level_up()?;
    while wiz.current_step() != Step::Summary {
        match wiz.current_step() {
            Step::Choices => {
                let pending: Vec<(Vec<String>, String)> = wiz
                    .pending_choices(svc.tables())
                    .into_iter()
                    .map(|(choice, key)| {
                        let picks = choice
                            .options
                            .iter()
                            .take(choice.choose as usize)
                            .map(|o| o.id.clone())
                            .collect();
                        (picks, key)
                    })
                    .collect();
                for (picks, key) in pending {
                    wiz.set_choice(&key, picks);
                }
            }
            Step::Hp => wiz.set_hp_roll(6),
            Step::Spells => wiz.set_learned_spells(vec!["hex".into()]),
            _ => {}
        }
        wiz.next(svc.record(), svc.tables())?;
    }
    svc.commit_level_up(&wiz)?;

    assert_eq!(svc.record().level, 2);
    assert_eq!(svc.record().combat.hp_max, 10 + 6 + 2); // roll + CON mod
    assert!(svc.record().spells.known.contains(&"hex".to_string()));

    // The committed record is what a fresh service reads back.
    let reloaded = CharacterService::load(store.clone(), default_tables())?;
    assert_eq!(reloaded.record().level, 2);

    svc.undo_level_up()?;
    let mut after = svc.record().clone();
    after.build.redo.clear();
    let mut base = before.clone();
    base.build.redo.clear();
    assert_eq!(after, base);
    Ok(())
}

#[test]
fn pact_slot_casting_stops_at_the_table_maximum() -> anyhow::Result<()> {
    let mut svc = warlock_service(MemoryStore::new());
    assert!(svc.cast_pact_slot()?); // one slot at level 1
    assert!(!svc.cast_pact_slot()?);
    assert_eq!(svc.record().resources.pact_slots_used, 1);

    svc.take_long_rest()?;
    assert_eq!(svc.record().resources.pact_slots_used, 0);
    Ok(())
}

#[test]
fn short_rest_heals_through_the_service() -> anyhow::Result<()> {
    let mut svc = warlock_service(MemoryStore::new());
    svc.edit(|r| r.combat.hp_now = 3)?;

    let spend: BTreeMap<DieSize, i32> = [(DieSize::D8, 1)].into_iter().collect();
    svc.take_short_rest(&spend, RestMode::Average, |_| 0)?;
    // d8 average 5 + CON mod 2
    assert_eq!(svc.record().combat.hp_now, 10);
    Ok(())
}

#[test]
fn file_store_persists_across_service_instances() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    {
        let store = JsonFileStore::open(dir.path())?;
        let mut svc = CharacterService::load(store, default_tables())?;
        svc.edit(|r| r.name = "Morrow of the Deep".into())?;
    }
    let store = JsonFileStore::open(dir.path())?;
    let svc = CharacterService::load(store, default_tables())?;
    assert_eq!(svc.record().name, "Morrow of the Deep");
    Ok(())
}

// ----------------------------------------------------------------------
// Remote sync
// ----------------------------------------------------------------------

struct StubRemote {
    load_outcome: SyncLoad,
}

#[async_trait]
impl RemoteSync for StubRemote {
    async fn save(&self, _record: &CharacterRecord) -> SyncAck {
        SyncAck {
            ok: true,
            message: "Synced.".into(),
        }
    }

    async fn load(&self, _character_id: &str) -> SyncLoad {
        self.load_outcome.clone()
    }
}

#[tokio::test]
async fn remote_load_failure_leaves_the_local_record_untouched() -> anyhow::Result<()> {
    let mut svc = warlock_service(MemoryStore::new());
    svc.edit(|r| r.name = "Keeper".into())?;
    let before = svc.record().clone();

    let remote = StubRemote {
        load_outcome: SyncLoad {
            ok: false,
            record: None,
            message: "Load failed: connection refused".into(),
        },
    };
    let outcome = svc.load_remote(&remote).await?;
    assert!(!outcome.ok);
    assert_eq!(svc.record(), &before);
    Ok(())
}

#[tokio::test]
async fn remote_load_success_adopts_the_record() -> anyhow::Result<()> {
    let mut svc = warlock_service(MemoryStore::new());

    let mut remote_record = svc.record().clone();
    remote_record.name = "From the other device".into();
    let remote = StubRemote {
        load_outcome: SyncLoad {
            ok: true,
            record: Some(remote_record),
            message: "Loaded.".into(),
        },
    };
    let outcome = svc.load_remote(&remote).await?;
    assert!(outcome.ok);
    assert_eq!(svc.record().name, "From the other device");
    Ok(())
}
