//! The simulation engine: owns the world, the roster, the randomness, the
//! schedule scalars and the statistics ring. One blocking [`Engine::tick`]
//! advances everything; collaborators read the exposed views in between.

use crate::bug::{Bug, BugKey};
use crate::config::{ConfigError, WorldConfig};
use crate::constants::{L_HIST, SEASON_LENGTH};
use crate::hex::GridBounds;
use crate::rng::TurnRng;
use crate::stats::{
    DeathCause, NullObserver, ScheduleScalars, TickObserver, TickRecord, WorldEvent,
};
use crate::world::WorldGrid;
use slotmap::SlotMap;
use std::fmt;
use tracing::debug;

/// Aggregate simulation state.
pub struct Engine {
    pub(crate) config: WorldConfig,
    pub(crate) rng: TurnRng,
    pub(crate) grid: WorldGrid,
    pub(crate) bugs: SlotMap<BugKey, Bug>,
    /// Processing order: insertion order, uids monotonic.
    pub(crate) roster: Vec<BugKey>,
    pub(crate) today: i64,
    pub(crate) uid_counter: i64,
    pub(crate) sched: ScheduleScalars,
    pub(crate) hist: Vec<TickRecord>,
    pub(crate) totalfood: i64,
    pub(crate) totalbug: i64,
    pub(crate) genecount: i64,
    pub(crate) events: Vec<WorldEvent>,
    /// Growth multipliers by `(y, season-shifted x)`, derived state: the
    /// seasonal factor only depends on those two and on `foodhump`.
    pub(crate) season_table: Vec<i64>,
    pub(crate) season_foodhump: f64,
    observer: Box<dyn TickObserver>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("today", &self.today)
            .field("population", &self.bugs.len())
            .field("uid_counter", &self.uid_counter)
            .field("sched", &self.sched)
            .finish()
    }
}

impl Engine {
    /// Builds an empty world from `config`. Seed it with
    /// [`Engine::spawn_founder`] or [`Engine::spawn_bug`].
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        Self::with_observer(config, Box::new(NullObserver))
    }

    /// Builds a world that reports each tick to `observer`.
    pub fn with_observer(
        config: WorldConfig,
        observer: Box<dyn TickObserver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = GridBounds::new(config.world_x, config.world_y);
        Ok(Self {
            rng: TurnRng::new(config.rng_seed),
            grid: WorldGrid::new(bounds),
            bugs: SlotMap::with_key(),
            roster: Vec::new(),
            today: 0,
            uid_counter: 0,
            sched: ScheduleScalars::initial(config.target_pop),
            hist: vec![TickRecord::default(); L_HIST],
            totalfood: 0,
            totalbug: 0,
            genecount: 0,
            events: Vec::new(),
            season_table: Vec::new(),
            season_foodhump: f64::NAN,
            observer,
            config,
        })
    }

    /// Advances the world by one day: schedule, bug actions, food growth,
    /// statistics, observer callback.
    pub fn tick(&mut self) {
        self.today += 1;
        self.events.clear();
        self.apply_schedule();

        let slot = self.hist_slot();
        let rec = &mut self.hist[slot];
        rec.movement = 0;
        rec.collisions = 0;
        rec.starvations = 0;
        rec.births = 0;

        self.move_bugs();
        self.grow_food();

        let n = self.bugs.len() as i64;
        let area = self.grid.bounds().area() as i64;
        let rec = &mut self.hist[slot];
        if n > 0 {
            rec.n_bugs = n;
            rec.avgweight = self.totalbug / n;
            rec.avgfood = (self.totalfood * 1024) / area;
            rec.avggenes = (self.genecount * 1024) / n;
        } else {
            rec.n_bugs = 0;
            rec.avgweight = 0;
            rec.avgfood = (self.totalfood * 1024) / area;
            rec.avggenes = 0;
        }

        let record = self.hist[slot];
        let Self {
            observer, events, ..
        } = self;
        observer.on_tick(&record, events);
    }

    /// Retunes the dynamic challenges for the day that just started.
    fn apply_schedule(&mut self) {
        let n = self.bugs.len() as i64;
        let oldest_age = self
            .roster
            .first()
            .map(|&k| self.today - self.bugs[k].birthday);
        let today = self.today;
        let s = &mut self.sched;

        if s.wait > 0 {
            s.wait -= 1;
        } else {
            if s.stage == 0 && n > 1000 {
                s.foodhump = 10.0;
                s.stage = 1;
                debug!(population = n, "challenge stage 1: food hump raised");
            }
            if s.stage == 1 && n > 10_000 {
                s.safety = false;
                s.stage = 2;
                debug!(population = n, "challenge stage 2: safety off");
            }
            if s.stage == 2 && n > 15_000 {
                s.leak = 0;
                s.stage = 3;
                s.wait = 250;
                debug!(population = n, "challenge stage 3: leak closed");
            }
        }

        match today {
            3000 => s.forcemate = 0x10,
            4000 => s.forcemate = 0x30,
            5000 => s.forcemate = 0x70,
            6000 => s.forcemate = 0x71,
            7000 => s.forcemate = 0x73,
            8000 => s.forcemate = 0x77,
            9000 => s.forcemate = 0x7F,
            10_000 => s.costmate = 24,
            11_000 => s.costmate = 48,
            12_000 => s.costmate = 96,
            13_000 => s.costmate = 144,
            _ => {}
        }

        if today > 3000 {
            if today > SEASON_LENGTH {
                if today % 32 == 0 {
                    if s.agediv < 30 {
                        s.foodhump *= 1.001;
                    }
                    if s.agediv > 300 {
                        s.foodhump /= 1.001;
                    }
                }
                if today % SEASON_LENGTH == 0 {
                    s.forcemate = if (today / SEASON_LENGTH) % 2 == 0 {
                        0x70
                    } else {
                        0x7F
                    };
                }
                if n < 1000 {
                    s.forcemate = 0x70;
                }
            }
            if let Some(oldest) = oldest_age {
                if n > s.target_pop * 2 && s.agediv < oldest {
                    s.agediv += 1;
                }
            }
            if today % 8 == 0 {
                s.agediv += 1;
            }
        }

        if let Some(oldest) = oldest_age {
            if (n < s.target_pop && s.agediv > 0) || s.agediv > oldest {
                s.agediv -= 1;
            }
            if n > self.config.pop_hard_limit {
                s.agediv = oldest;
            }
        }
    }

    /// Places `bug` on its cell and appends it to the roster. Refuses an
    /// occupied cell.
    pub fn spawn_bug(&mut self, bug: Bug) -> Option<BugKey> {
        let p = bug.pos[0].p;
        if self.grid.cell(p).bug.is_some() {
            return None;
        }
        let key = self.bugs.insert(bug);
        self.roster.push(key);
        self.grid.cell_mut(p).bug = Some(key);
        Some(key)
    }

    /// Converts a bug's remains into cell food and removes it. Safe to call
    /// on the bug being processed; the roster skips dead keys.
    pub(crate) fn kill_bug(&mut self, key: BugKey, cause: DeathCause) {
        let Some(bug) = self.bugs.remove(key) else {
            return;
        };
        let p = bug.pos[0].p;
        let cell = self.grid.cell_mut(p);
        cell.food += bug.pos[0].weight.max(0);
        if cell.bug == Some(key) {
            cell.bug = None;
        }
        self.events.push(WorldEvent::Died {
            uid: bug.brain.eth.uid,
            cause,
            age: bug.age(self.today),
        });
    }

    #[inline]
    pub(crate) fn hist_slot(&self) -> usize {
        (self.today % L_HIST as i64) as usize
    }

    /// Current day count.
    #[must_use]
    pub const fn today(&self) -> i64 {
        self.today
    }

    /// Number of living bugs.
    #[must_use]
    pub fn population(&self) -> usize {
        self.bugs.len()
    }

    /// Total bugs ever created.
    #[must_use]
    pub const fn bugs_born(&self) -> i64 {
        self.uid_counter
    }

    /// Read-only world grid.
    #[must_use]
    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    /// Mutable world grid, for scenario setup.
    #[must_use]
    pub fn grid_mut(&mut self) -> &mut WorldGrid {
        &mut self.grid
    }

    /// One bug by key.
    #[must_use]
    pub fn bug(&self, key: BugKey) -> Option<&Bug> {
        self.bugs.get(key)
    }

    /// Living bugs in processing order, oldest first.
    pub fn bugs(&self) -> impl Iterator<Item = (BugKey, &Bug)> {
        self.roster.iter().map(move |&k| (k, &self.bugs[k]))
    }

    /// The statistics ring, indexed by `tick % L_HIST`.
    #[must_use]
    pub fn history(&self) -> &[TickRecord] {
        &self.hist
    }

    /// The record written this tick.
    #[must_use]
    pub fn current_record(&self) -> &TickRecord {
        &self.hist[self.hist_slot()]
    }

    /// Schedule scalars as of the last tick.
    #[must_use]
    pub const fn scalars(&self) -> &ScheduleScalars {
        &self.sched
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Resets the randomness source.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = TurnRng::new(seed as i64);
    }

    /// Replaces the tick observer.
    pub fn set_observer(&mut self, observer: Box<dyn TickObserver>) {
        self.observer = observer;
    }

    pub fn set_safety(&mut self, safety: bool) {
        self.sched.safety = safety;
    }

    pub fn set_leak(&mut self, leak: i64) {
        self.sched.leak = leak;
    }

    pub fn set_forcemate(&mut self, forcemate: u8) {
        self.sched.forcemate = forcemate;
    }

    pub fn set_costmate(&mut self, costmate: i64) {
        self.sched.costmate = costmate;
    }

    pub fn set_agediv(&mut self, agediv: i64) {
        self.sched.agediv = agediv;
    }

    pub fn set_foodhump(&mut self, foodhump: f64) {
        self.sched.foodhump = foodhump;
    }

    pub fn set_target_pop(&mut self, target_pop: i64) {
        self.sched.target_pop = target_pop;
    }

    /// Asserts the structural invariants that must hold between ticks:
    /// cell/bug handle coherence, gene accounting, chain closure, and food
    /// bounds. Intended for tests.
    pub fn check_invariants(&self) {
        let mut occupied = 0usize;
        let bounds = self.grid.bounds();
        for y in 0..bounds.height {
            for x in 0..bounds.width {
                let p = crate::hex::CellPos::new(x, y);
                let cell = self.grid.cell(p);
                assert!(
                    (0..=crate::constants::FOOD_HARD_CAP).contains(&cell.food),
                    "food out of bounds at ({x},{y}): {}",
                    cell.food
                );
                if let Some(key) = cell.bug {
                    occupied += 1;
                    let bug = self.bugs.get(key).expect("cell points at a dead bug");
                    assert_eq!(bug.pos[0].p, p, "bug position desynced from its cell");
                }
            }
        }
        assert_eq!(occupied, self.bugs.len(), "occupied cells != living bugs");
        assert_eq!(self.roster.len(), self.bugs.len(), "roster desynced");
        for (_, bug) in self.bugs() {
            assert_eq!(bug.brain.ngenes, bug.brain.count_genes(), "ngenes drifted");
            assert!(bug.pos[0].weight >= 1, "living bug below minimum weight");
            for pair in &bug.brain.act {
                assert!(pair.a.is_coherent() && pair.b.is_coherent());
            }
        }
    }
}
