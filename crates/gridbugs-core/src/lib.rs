//! Deterministic hex-grid genetic-programming artificial-life engine.
//!
//! A population of bugs lives on a toroidal offset hex grid. Each tick every
//! bug senses its neighborhood, evaluates a diploid expression-tree genome
//! to pick one of seven actions, and pays mass-prorated metabolic costs.
//! Bugs fight when they collide, swap genomes when they mate, and split into
//! broods with crossover and mutation. Food grows seasonally by latitude and
//! terrain, rots under squatters, and spreads downhill. A schedule retunes
//! the world as the population grows.
//!
//! The engine is strictly single-threaded and integer-only (one seasonal f64
//! factor aside): equal seeds replay bit for bit. Renderers, recorders and
//! frontends live in sibling crates and consume the read-only views, the
//! [`TickObserver`] delta feed, and [`WorldSnapshot`].

mod action;
mod brain;
mod bug;
mod config;
pub mod constants;
mod engine;
mod food;
mod gene;
mod genesis;
mod hex;
mod rng;
mod sense;
mod snapshot;
mod stats;
mod world;

pub use brain::{family_match, Brain, DecisionPair, Ethnicity};
pub use bug::{Bug, BugKey, BugState};
pub use config::{ConfigError, WorldConfig};
pub use engine::Engine;
pub use gene::{limit_fn, Chromosome, Gene, GeneKind};
pub use hex::{
    normalize_dir, CellPos, GridBounds, DIR_CCW, DIR_CW, DIR_E, DIR_NE, DIR_NW, DIR_SE, DIR_SW,
    DIR_W,
};
pub use rng::{RandomSource, TurnRng};
pub use sense::Senses;
pub use snapshot::WorldSnapshot;
pub use stats::{
    DeathCause, NullObserver, ScheduleScalars, TickObserver, TickRecord, WorldEvent,
};
pub use world::{Cell, WorldGrid};
