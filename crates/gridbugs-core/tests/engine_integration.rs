use gridbugs_core::constants::{
    ACT_DIVIDE, ACT_EAT, ACT_MOVE, COST_EAT, DIE_THIN, EAT_LIMIT, GENE_COST, GENE_KNEE, NOM_MASS,
};
use gridbugs_core::{
    Brain, Bug, CellPos, Chromosome, Engine, Ethnicity, Gene, GeneKind, TickObserver, TickRecord,
    WorldConfig, WorldEvent, DIR_E, DIR_W,
};
use std::sync::{Arc, Mutex};

const N_DECISIONS: usize = 8;

/// A brain whose every decision is a bare constant weight.
fn constant_brain(weights: [i64; N_DECISIONS], uid: i64) -> Brain {
    let pairs = weights.map(|w| {
        (
            Chromosome::from_genes(vec![Gene::leaf(GeneKind::Const, 0, w, 0)]),
            Chromosome::from_genes(vec![Gene::leaf(GeneKind::Const, 0, w, 0)]),
        )
    });
    Brain::assemble(pairs, Ethnicity::new(uid, 120, 0, 0), 0)
}

fn single_decision_brain(decision: usize, uid: i64) -> Brain {
    let mut weights = [0i64; N_DECISIONS];
    weights[decision] = 1000;
    constant_brain(weights, uid)
}

fn gene_mass(brain: &Brain) -> i64 {
    (GENE_COST * brain.ngenes.pow(3)) / (GENE_KNEE * GENE_KNEE)
}

#[test]
fn lone_founder_survives_two_thousand_days() {
    let config = WorldConfig {
        rng_seed: 54321,
        ..WorldConfig::default()
    };
    let mut engine = Engine::new(config).expect("engine");
    engine.spawn_founder().expect("founder");

    for _ in 0..2000 {
        engine.tick();
    }

    let founder = engine
        .bugs()
        .map(|(_, bug)| bug)
        .find(|bug| bug.brain.eth.uid == 0)
        .expect("the founder must still be alive");
    assert!(founder.pos[0].weight > DIE_THIN);
    engine.check_invariants();
}

#[test]
fn adjacent_movers_fight_exactly_once() {
    let mut engine = Engine::new(WorldConfig::default()).expect("engine");
    engine.set_safety(false);

    let weight = DIE_THIN * 100;
    let a = Bug::newborn(
        CellPos::new(10, 10),
        DIR_E,
        weight,
        0,
        single_decision_brain(ACT_MOVE, 1),
    );
    let b = Bug::newborn(
        CellPos::new(11, 10),
        DIR_W,
        weight,
        0,
        single_decision_brain(ACT_MOVE, 2),
    );
    engine.spawn_bug(a).expect("bug a");
    engine.spawn_bug(b).expect("bug b");

    engine.tick();

    assert_eq!(engine.population(), 1, "exactly one bug dies in the clash");
    assert_eq!(engine.current_record().collisions, 1);
    let (_, survivor) = engine.bugs().next().expect("survivor");
    assert!(survivor.kills + survivor.defends >= 1);
    assert!(survivor.pos[0].weight > DIE_THIN);
    engine.check_invariants();
}

#[test]
fn genesis_population_persists_twenty_thousand_days() {
    let config = WorldConfig {
        rng_seed: 42,
        ..WorldConfig::default()
    };
    let mut engine = Engine::new(config).expect("engine");
    engine.spawn_founder().expect("founder");

    let mut max_pop = 0;
    for _ in 0..20_000 {
        engine.tick();
        max_pop = max_pop.max(engine.population());
    }

    assert!(max_pop >= 2, "the world must multiply; saw at most {max_pop}");
    engine.check_invariants();
}

#[test]
fn newborns_act_on_their_birth_day() {
    let mut engine = Engine::new(WorldConfig::default()).expect("engine");
    let parent = Bug::newborn(
        CellPos::new(40, 40),
        DIR_E,
        DIE_THIN * 256,
        0,
        single_decision_brain(ACT_DIVIDE, 7),
    );
    engine.spawn_bug(parent).expect("parent");

    engine.tick();

    assert!(engine.current_record().births >= 2);
    assert!(engine.population() >= 2);
    let same_day_actor = engine
        .bugs()
        .map(|(_, bug)| bug)
        .any(|bug| bug.birthday == 1 && bug.pos[0].act == ACT_DIVIDE);
    assert!(
        same_day_actor,
        "a bug born this tick must have taken its own turn"
    );
    engine.check_invariants();
}

#[test]
fn starvation_at_the_threshold_kills_on_any_cost() {
    let mut engine = Engine::new(WorldConfig::default()).expect("engine");
    let sleeper = Bug::newborn(
        CellPos::new(5, 5),
        DIR_E,
        DIE_THIN,
        0,
        constant_brain([0; N_DECISIONS], 3),
    );
    engine.spawn_bug(sleeper).expect("sleeper");

    engine.tick();

    assert_eq!(engine.population(), 0);
    assert_eq!(engine.current_record().starvations, 1);
}

#[test]
fn eating_an_empty_cell_charges_the_demand_anyway() {
    let mut engine = Engine::new(WorldConfig::default()).expect("engine");
    let p = CellPos::new(30, 30);
    let eater = Bug::newborn(p, DIR_E, DIE_THIN * 2, 0, single_decision_brain(ACT_EAT, 4));
    let genes = gene_mass(&eater.brain);
    engine.spawn_bug(eater).expect("eater");
    engine.grid_mut().cell_mut(p).food = 0;

    engine.tick();

    // Demand exceeds the empty cell, so the whole demand is paid as an
    // overeating penalty, then the eat cost is prorated on what is left.
    let demand = (DIE_THIN * 2 * EAT_LIMIT) / 1024;
    let after_penalty = DIE_THIN * 2 - demand;
    let eat_cost = (COST_EAT * (after_penalty + genes)) / NOM_MASS;
    let expected = after_penalty - eat_cost;
    let (_, bug) = engine.bugs().next().expect("eater alive");
    assert_eq!(bug.pos[0].weight, expected);
}

#[test]
fn division_below_the_threshold_yields_no_offspring() {
    let mut engine = Engine::new(WorldConfig::default()).expect("engine");
    // weight/3 - divide cost lands under the starvation limit.
    let divider = Bug::newborn(
        CellPos::new(60, 60),
        DIR_E,
        200_000,
        0,
        single_decision_brain(ACT_DIVIDE, 5),
    );
    engine.spawn_bug(divider).expect("divider");

    engine.tick();

    assert_eq!(engine.current_record().births, 0);
    assert_eq!(
        engine.current_record().starvations,
        1,
        "the thinned parent is not restored"
    );
    assert_eq!(engine.population(), 0);
}

fn run_seeded(seed: i64, ticks: u32) -> Engine {
    let config = WorldConfig {
        rng_seed: seed,
        ..WorldConfig::default()
    };
    let mut engine = Engine::new(config).expect("engine");
    engine.spawn_founder().expect("founder");
    for _ in 0..ticks {
        engine.tick();
    }
    engine
}

#[test]
fn seeded_runs_replay_bit_for_bit() {
    let a = run_seeded(42, 4000);
    let b = run_seeded(42, 4000);
    assert_eq!(a.history(), b.history());
    assert_eq!(a.snapshot(), b.snapshot());

    let c = run_seeded(43, 4000);
    assert_ne!(
        a.history(),
        c.history(),
        "a different seed must take a different trajectory"
    );
}

#[test]
#[ignore = "full determinism contract; minutes of runtime"]
fn seeded_runs_replay_bit_for_bit_over_a_hundred_thousand_days() {
    let a = run_seeded(42, 100_000);
    let b = run_seeded(42, 100_000);
    assert_eq!(a.history(), b.history());
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn snapshot_restore_reproduces_the_next_tick() {
    let engine = run_seeded(42, 500);
    let snapshot = engine.snapshot();

    let json = serde_json::to_string(&snapshot).expect("serialize");
    let parsed = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(snapshot, parsed);

    let mut restored = Engine::restore(parsed).expect("restore");
    let mut original = engine;
    original.tick();
    restored.tick();
    assert_eq!(original.snapshot(), restored.snapshot());
}

#[derive(Clone, Default)]
struct SpyObserver {
    records: Arc<Mutex<Vec<(TickRecord, Vec<WorldEvent>)>>>,
}

impl TickObserver for SpyObserver {
    fn on_tick(&mut self, record: &TickRecord, events: &[WorldEvent]) {
        self.records
            .lock()
            .unwrap()
            .push((*record, events.to_vec()));
    }
}

#[test]
fn observer_sees_births_and_deaths() {
    let spy = SpyObserver::default();
    let records = spy.records.clone();
    let mut engine =
        Engine::with_observer(WorldConfig::default(), Box::new(spy)).expect("engine");
    engine.spawn_founder().expect("founder");

    for _ in 0..50 {
        engine.tick();
    }

    let log = records.lock().unwrap();
    assert_eq!(log.len(), 50);
    let born: i64 = log
        .iter()
        .flat_map(|(_, events)| events.iter())
        .filter(|event| matches!(event, WorldEvent::Born { .. }))
        .count() as i64;
    let recorded: i64 = log.iter().map(|(record, _)| record.births).sum();
    assert_eq!(born, recorded, "event feed and counters agree on births");
    assert!(born >= 2, "the founder divides early");
}

#[test]
fn family_window_remembers_both_parents() {
    let mut engine = Engine::new(WorldConfig::default()).expect("engine");
    let parent = Bug::newborn(
        CellPos::new(80, 80),
        DIR_E,
        DIE_THIN * 256,
        0,
        single_decision_brain(ACT_DIVIDE, 9),
    );
    engine.spawn_bug(parent).expect("parent");

    engine.tick();

    let (_, child) = engine
        .bugs()
        .find(|(_, bug)| bug.birthday == 1)
        .expect("a child was born");
    // Unmated parent: matebrain is a self copy, so both family slots carry
    // the parent's uid.
    assert_eq!(child.brain.family[0].uid, 9);
    assert_eq!(child.brain.family[1].uid, 9);
    assert_eq!(child.brain.generation, 1);
}
