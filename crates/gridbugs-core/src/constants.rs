//! Fixed parameters of the simulation.
//!
//! Food and weight values are fixed-point ×1024 throughout.

/// Default world width in cells.
pub const WORLD_X: i32 = 192;
/// Default world height in cells. Must be even so row parity wraps cleanly.
pub const WORLD_Y: i32 = 160;

/// Ticks per year.
pub const SEASON_LENGTH: i64 = 32_768;

/// Food level above which over-cap decay kicks in.
pub const FOOD_CAP: i64 = 1_024_000;
/// Per-tick growth multiplier (/1024) before the seasonal factor.
pub const FOOD_GROW: i64 = 1044;
/// Per-mille of a cell's food spread to each poorer neighbor per tick.
pub const FOOD_SPREAD: i64 = 10;
/// Food seeded into every cell at world creation.
pub const FOOD_START: i64 = 128_000;
/// Rate (/1024) at which food above `FOOD_CAP` decays.
pub const FOOD_DECAY: i64 = 115;
/// Absolute ceiling on cell food.
pub const FOOD_HARD_CAP: i64 = FOOD_CAP * 10;
/// Decay multipliers (/1024) by distance to the nearest bug.
pub const ROT: [i64; 4] = [988, 973, 1012, 1023];

/// Nominal costs, prorated by `cost * mass / NOM_MASS`.
pub const COST_SLEEP: i64 = 12;
pub const COST_EAT: i64 = 48;
pub const COST_TURN: i64 = 16;
pub const COST_MOVE: i64 = 96;
/// Surcharge on top of the move when a fight is won.
pub const COST_FIGHT: i64 = 36;
/// Initial mating cost; the schedule escalates it.
pub const COST_MATE_INITIAL: i64 = 12;
/// Cost per resulting creature in a division.
pub const COST_DIVIDE: i64 = 25_600;
/// Nominal mass for cost proration.
pub const NOM_MASS: i64 = 1024;

/// Weight below which a bug starves and becomes food.
pub const DIE_THIN: i64 = 102_400;
/// Mass above which the obesity surcharge applies.
pub const MASS_CAP: i64 = 10_240_000;
/// Fraction (/1024) of body mass a bug may eat per tick.
pub const EAT_LIMIT: i64 = 205;

/// Mass equivalent charged per gene, cubed over the knee squared.
pub const GENE_COST: i64 = 128;
/// Inflection point of the gene-count cost nonlinearity.
pub const GENE_KNEE: i64 = 96;

/// Action indices. The decision with the highest weight is taken.
pub const ACT_SLEEP: usize = 0;
pub const ACT_EAT: usize = 1;
pub const ACT_TURN_CW: usize = 2;
pub const ACT_TURN_CCW: usize = 3;
pub const ACT_MOVE: usize = 4;
pub const ACT_MATE: usize = 5;
pub const ACT_DIVIDE: usize = 6;
/// Double-acting chromosome consulted on the partner during mating.
pub const RESPONSE_MATE: usize = 7;
/// History-only stamp on both partners of a successful mating.
pub const ACT_MATED: usize = 7;
/// History-only stamp on a bug that survived an attack.
pub const ACT_DEFEND: usize = 8;
/// Number of actions tracked in history senses.
pub const N_ACT: usize = 9;
/// Number of decisions holding chromosome pairs.
pub const N_DECISIONS: usize = 8;

/// Position history ring length.
pub const POS_HISTORY: usize = 32;
/// Ancestry uid window length.
pub const FAM_HIST: usize = 126;
/// History ring length for per-tick statistics.
pub const L_HIST: usize = 1024;
/// Generations to assimilate to the local latitude color.
pub const ETHNIC_DUR: i32 = 120;

/// Probe cells per sense pass.
pub const N_SENSE_CELLS: usize = 12;
/// Start of the time-since-act self senses.
pub const SENSE_SELF: usize = N_SENSE_CELLS * 4;
/// Normalized projected offspring weight.
pub const SPAWN_WEIGHT_NORM: usize = SENSE_SELF + N_ACT;
/// Own weight normalized to the starvation limit.
pub const STARVE_WEIGHT_NORM: usize = SPAWN_WEIGHT_NORM + 1;
/// Ticks since birth, unscaled.
pub const SELF_AGE: usize = STARVE_WEIGHT_NORM + 1;
/// Total sense vector length.
pub const N_SENSES: usize = SELF_AGE + 1;

/// Default population the agediv regulator steers toward.
pub const POP_TARGET: i64 = 5000;
/// Population beyond which agediv snaps to the age of the oldest bug.
pub const POP_HARD_LIMIT: i64 = 24_000;
