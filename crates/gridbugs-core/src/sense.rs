//! Sense assembly: the per-bug view of the neighborhood and of itself.

use crate::bug::BugKey;
use crate::brain::family_match;
use crate::constants::{
    COST_DIVIDE, DIE_THIN, N_ACT, N_SENSES, N_SENSE_CELLS, POS_HISTORY, SELF_AGE, SENSE_SELF,
    SPAWN_WEIGHT_NORM, STARVE_WEIGHT_NORM,
};
use crate::engine::Engine;
use crate::hex::{normalize_dir, CellPos, GridBounds, DIR_CCW, DIR_CW};

/// A fully assembled sense vector.
pub type Senses = [i64; N_SENSES];

/// Walks to probe cell `i` relative to `face` and reports its family-match
/// level: 0 self, 1 adjacent ahead, 2 near front, 3 everything else.
///
/// Layout around the facing: 1, 2 and 3 ahead; one and two flanking steps to
/// either side; and the two forward diagonals.
pub(crate) fn probe_cell(
    bounds: GridBounds,
    p: CellPos,
    face: i32,
    i: usize,
) -> (CellPos, usize) {
    let step = |p, d| bounds.step(p, d);
    match i {
        0 => (p, 0),
        1 => (step(p, face), 1),
        2 => (step(step(p, face), face), 2),
        3 => (step(p, face + DIR_CCW), 2),
        4 => (step(p, face + DIR_CW), 2),
        5 => (step(step(step(p, face), face), face), 3),
        6 => (step(step(p, face + DIR_CCW), face + DIR_CCW), 3),
        7 => (step(step(p, face + DIR_CCW), face), 3),
        8 => (step(step(p, face + DIR_CW), face), 3),
        9 => (step(step(p, face + DIR_CW), face + DIR_CW), 3),
        10 => (step(p, face + DIR_CCW * 2), 3),
        _ => (step(p, face + DIR_CW * 2), 3),
    }
}

impl Engine {
    /// Fills the sense vector for `key`. Food and foreign masses are
    /// normalized to own weight, which is clamped to at least 1 first.
    pub(crate) fn gather_senses(&mut self, key: BugKey) -> Senses {
        if self.bugs[key].pos[0].weight <= 0 {
            self.bugs[key].pos[0].weight = 1;
        }
        let bounds = self.grid.bounds();
        let bug = &self.bugs[key];
        let me = bug.pos[0];
        let mut senses = [0i64; N_SENSES];

        for i in 0..N_SENSE_CELLS {
            let (cp, level) = probe_cell(bounds, me.p, me.face, i);
            let cell = self.grid.cell(cp);
            senses[i] = (cell.food * 1024) / me.weight;
            if let Some(other_key) = cell.bug {
                let other = &self.bugs[other_key];
                senses[i + N_SENSE_CELLS] = (other.pos[0].weight * 1024) / me.weight;
                let rf = normalize_dir(other.pos[0].face - me.face);
                senses[i + N_SENSE_CELLS * 2] = i64::from(rf) * 1024;
                senses[i + N_SENSE_CELLS * 3] = family_match(&other.brain, &bug.brain, level);
            }
        }

        // Ticks since each action last appears in the ring, normalized so
        // a full history span reads 1024.
        for act in 0..N_ACT {
            senses[SENSE_SELF + act] = match (0..POS_HISTORY).find(|&j| bug.pos[j].act == act) {
                Some(j) => (j as i64 * 1024) / POS_HISTORY as i64,
                None => 1024,
            };
        }

        senses[SPAWN_WEIGHT_NORM] =
            (((me.weight / bug.brain.divide) - COST_DIVIDE) * 1024) / DIE_THIN;
        senses[STARVE_WEIGHT_NORM] = (me.weight * 1024) / DIE_THIN;
        senses[SELF_AGE] = bug.age(self.today);
        senses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::DIR_E;

    #[test]
    fn probe_levels_partition_the_neighborhood() {
        let bounds = GridBounds::new(192, 160);
        let p = CellPos::new(96, 80);
        let levels: Vec<usize> = (0..N_SENSE_CELLS)
            .map(|i| probe_cell(bounds, p, DIR_E, i).1)
            .collect();
        assert_eq!(levels, vec![0, 1, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3]);
    }

    #[test]
    fn probe_cells_are_distinct() {
        let bounds = GridBounds::new(192, 160);
        let p = CellPos::new(96, 80);
        let mut cells: Vec<CellPos> = (0..N_SENSE_CELLS)
            .map(|i| probe_cell(bounds, p, DIR_E, i).0)
            .collect();
        cells.sort_by_key(|c| (c.x, c.y));
        cells.dedup();
        assert_eq!(cells.len(), N_SENSE_CELLS);
    }

    #[test]
    fn ahead_probe_follows_the_facing() {
        let bounds = GridBounds::new(192, 160);
        let p = CellPos::new(96, 80);
        let (ahead, _) = probe_cell(bounds, p, DIR_E, 1);
        assert_eq!(ahead, CellPos::new(97, 80));
        let (two_ahead, _) = probe_cell(bounds, p, DIR_E, 2);
        assert_eq!(two_ahead, CellPos::new(98, 80));
    }
}
