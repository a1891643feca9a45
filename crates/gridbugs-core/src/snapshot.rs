//! Complete, self-contained state capture.
//!
//! A snapshot holds everything a restored engine needs to reproduce the next
//! tick bit for bit: genomes, RNG state, schedule scalars and the statistics
//! ring. Recorders serialize it however they like; renderers only need the
//! food plane and the bug views inside it.

use crate::bug::Bug;
use crate::config::{ConfigError, WorldConfig};
use crate::constants::L_HIST;
use crate::engine::Engine;
use crate::rng::TurnRng;
use crate::stats::{ScheduleScalars, TickRecord};
use serde::{Deserialize, Serialize};

/// Full engine state at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub config: WorldConfig,
    pub today: i64,
    pub uid_counter: i64,
    pub rng_state: i64,
    pub sched: ScheduleScalars,
    /// Row-major food plane.
    pub food: Vec<i64>,
    /// Bugs in roster (processing) order.
    pub bugs: Vec<Bug>,
    pub hist: Vec<TickRecord>,
}

impl Engine {
    /// Captures the complete engine state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            config: self.config.clone(),
            today: self.today,
            uid_counter: self.uid_counter,
            rng_state: self.rng.state(),
            sched: self.sched,
            food: self.grid.cells().iter().map(|c| c.food).collect(),
            bugs: self.bugs().map(|(_, bug)| bug.clone()).collect(),
            hist: self.hist.clone(),
        }
    }

    /// Rebuilds an engine from a snapshot. The next tick of the restored
    /// engine matches the next tick the snapshotted one would have taken.
    pub fn restore(snapshot: WorldSnapshot) -> Result<Self, ConfigError> {
        let mut engine = Self::new(snapshot.config)?;
        if snapshot.food.len() != engine.grid.bounds().area() {
            return Err(ConfigError::Invalid("snapshot food plane size mismatch"));
        }
        if snapshot.hist.len() != L_HIST {
            return Err(ConfigError::Invalid("snapshot history length mismatch"));
        }
        engine.today = snapshot.today;
        engine.uid_counter = snapshot.uid_counter;
        engine.rng = TurnRng::from_state(snapshot.rng_state);
        engine.sched = snapshot.sched;
        engine.hist = snapshot.hist;
        for (cell, food) in engine.grid.cells_mut().iter_mut().zip(snapshot.food) {
            cell.food = food;
        }
        for bug in snapshot.bugs {
            let p = bug.pos[0].p;
            if engine.grid.cell(p).bug.is_some() {
                return Err(ConfigError::Invalid("snapshot places two bugs in a cell"));
            }
            let key = engine.bugs.insert(bug);
            engine.roster.push(key);
            engine.grid.cell_mut(p).bug = Some(key);
        }
        Ok(engine)
    }
}
