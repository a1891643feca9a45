//! Individual bugs and their life accounting.

use crate::brain::Brain;
use crate::constants::{
    ACT_SLEEP, GENE_COST, GENE_KNEE, MASS_CAP, NOM_MASS, POS_HISTORY,
};
use crate::hex::CellPos;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tracing::trace;

new_key_type! {
    /// Stable handle for bugs backed by a generational slot map.
    pub struct BugKey;
}

/// One slot of the position ring: where the bug was, which way it faced,
/// what it did to get there, and what it weighed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugState {
    pub p: CellPos,
    pub face: i32,
    pub act: usize,
    pub weight: i64,
}

/// A living bug. Owned by the engine roster; world cells refer to it by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    pub birthday: i64,
    pub kills: i64,
    pub defends: i64,
    pub moves: i64,
    pub mate_success: i64,
    pub mate_fails: i64,
    pub mate_repeat: i64,
    pub offspring: i64,
    /// `pos[0]` is current, the rest is history, newest first.
    pub pos: [BugState; POS_HISTORY],
    pub brain: Brain,
    /// Genome of the last successful mate; a copy of `brain` until then.
    pub matebrain: Brain,
}

impl Bug {
    /// A newborn at `p` facing `face`, with zeroed life counters and the
    /// whole history ring primed to a sleeping start.
    #[must_use]
    pub fn newborn(p: CellPos, face: i32, weight: i64, birthday: i64, brain: Brain) -> Self {
        let state = BugState {
            p,
            face,
            act: ACT_SLEEP,
            weight,
        };
        let matebrain = brain.clone();
        Self {
            birthday,
            kills: 0,
            defends: 0,
            moves: 0,
            mate_success: 0,
            mate_fails: 0,
            mate_repeat: 0,
            offspring: 0,
            pos: [state; POS_HISTORY],
            brain,
            matebrain,
        }
    }

    /// Pushes the ring back one slot, duplicating the current state into
    /// slot 1 so the action of this tick can overwrite slot 0.
    pub fn shift_history(&mut self) {
        for i in (1..POS_HISTORY).rev() {
            self.pos[i] = self.pos[i - 1];
        }
    }

    /// Charges a nominal cost prorated by effective mass.
    ///
    /// Each gene counts as extra mass, cubed over the knee squared, and mass
    /// beyond `MASS_CAP` multiplies the cost itself. Weight never drops
    /// below 1 here; starvation is judged after the action completes.
    pub fn charge(&mut self, cost: i64) {
        let mut mass = self.pos[0].weight.abs()
            + (GENE_COST * self.brain.ngenes.pow(3)) / (GENE_KNEE * GENE_KNEE);
        let cost = if mass > MASS_CAP {
            cost.saturating_mul(1 + (mass - MASS_CAP) / 102_400)
        } else {
            cost
        };
        mass = cost.saturating_mul(mass) / NOM_MASS;
        if mass < 100 {
            trace!(cost, weight = self.pos[0].weight, mass, "suspiciously cheap charge");
        }
        self.pos[0].weight = self.pos[0].weight.saturating_sub(mass);
        if self.pos[0].weight <= 0 {
            self.pos[0].weight = 1;
        }
    }

    /// Ticks since birth.
    #[must_use]
    pub const fn age(&self, today: i64) -> i64 {
        today - self.birthday
    }
}
