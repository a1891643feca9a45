//! Per-tick statistics and the observer seam for recorders.

use crate::hex::CellPos;
use serde::{Deserialize, Serialize};

/// One slot of the statistics ring. Averages are fixed-point ×1024.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    pub n_bugs: i64,
    pub movement: i64,
    pub collisions: i64,
    pub starvations: i64,
    pub births: i64,
    pub avgweight: i64,
    pub avgfood: i64,
    pub avggenes: i64,
}

/// Scalars the schedule retunes as the population grows. Exposed read-only
/// to stats consumers and captured whole in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleScalars {
    pub agediv: i64,
    pub forcemate: u8,
    pub foodhump: f64,
    pub costmate: i64,
    pub target_pop: i64,
    /// -1 keeps food growing under bugs; 0 and up shadows them.
    pub leak: i64,
    pub safety: bool,
    /// Dynamic-challenge stage reached so far.
    pub stage: u8,
    /// Ticks left before the next stage may fire.
    pub wait: i64,
}

impl ScheduleScalars {
    #[must_use]
    pub fn initial(target_pop: i64) -> Self {
        Self {
            agediv: 0,
            forcemate: 0,
            foodhump: 1.4,
            costmate: crate::constants::COST_MATE_INITIAL,
            target_pop,
            leak: -1,
            safety: true,
            stage: 0,
            wait: 0,
        }
    }
}

/// Why a bug died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Starved,
    Slain,
}

/// Per-tick world deltas handed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    Moved {
        uid: i64,
        from: CellPos,
        to: CellPos,
    },
    Born {
        uid: i64,
        parent: i64,
        pos: CellPos,
    },
    Died {
        uid: i64,
        cause: DeathCause,
        age: i64,
    },
    Mated {
        uid: i64,
        partner: i64,
    },
}

/// Sink invoked at the end of every tick with the tick's record and deltas.
pub trait TickObserver: Send {
    fn on_tick(&mut self, record: &TickRecord, events: &[WorldEvent]);
}

/// Observer that drops everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl TickObserver for NullObserver {
    fn on_tick(&mut self, _record: &TickRecord, _events: &[WorldEvent]) {}
}
