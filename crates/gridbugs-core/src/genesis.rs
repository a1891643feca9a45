//! The founder bug and its hand-authored genome.

use crate::brain::{Brain, Ethnicity};
use crate::bug::{Bug, BugKey};
use crate::constants::{DIE_THIN, ETHNIC_DUR, N_DECISIONS};
use crate::engine::Engine;
use crate::gene::{Chromosome, Gene, GeneKind};
use crate::hex::{CellPos, DIR_E};
use crate::rng::RandomSource;

const SI_AHEAD_MASS: usize = 13;
const SI_SPAWN: usize = 57;
const SI_STARVE: usize = 58;

fn leaf(kind: GeneKind, si: usize, c1: i64, c2: i64) -> Gene {
    Gene::leaf(kind, si, c1, c2)
}

fn prod(mut g: Gene, child: u32) -> Gene {
    g.prod = Some(child);
    g
}

fn sum(mut g: Gene, child: u32) -> Gene {
    g.sum = Some(child);
    g
}

/// The founder's eight chromosome pairs, carried over from a long-lived
/// evolved run: eat and move keyed on projected offspring weight and local
/// food, division gated on spawn weight, mating response on starvation
/// pressure.
fn founder_pairs() -> [(Chromosome, Chromosome); N_DECISIONS] {
    use GeneKind::{Const, Limit, Match, Sense};
    [
        // Sleep: small constant fallbacks.
        (
            Chromosome::from_genes(vec![leaf(Const, 55, 26, 363)]),
            Chromosome::from_genes(vec![leaf(Const, 55, 63, 1530)]),
        ),
        // Eat: fires when dividing now would leave the children thin.
        (
            Chromosome::from_genes(vec![
                prod(leaf(Const, SI_AHEAD_MASS, 1500, 1048), 1),
                sum(leaf(Limit, SI_SPAWN, 1216, 1084), 2),
                leaf(Match, SI_SPAWN, 1216, 1084),
            ]),
            Chromosome::from_genes(vec![
                prod(leaf(Const, SI_AHEAD_MASS, 2000, 1048), 1),
                leaf(Limit, SI_SPAWN, 1203, 1056),
            ]),
        ),
        // Turn CW: keyed on how long since the last clockwise turn.
        (
            Chromosome::from_genes(vec![leaf(Limit, 50, 50, 1200)]),
            Chromosome::from_genes(vec![leaf(Limit, 50, 760, 776)]),
        ),
        // Turn CCW.
        (
            Chromosome::from_genes(vec![leaf(Limit, 51, 100, 1000)]),
            Chromosome::from_genes(vec![leaf(Limit, 51, 510, 514)]),
        ),
        // Move: local food exhaustion against starvation pressure.
        (
            Chromosome::from_genes(vec![
                prod(leaf(Const, SI_AHEAD_MASS, 1500, 1048), 1),
                sum(leaf(Limit, 0, 173, -53), 2),
                leaf(Limit, SI_STARVE, 4274, 2187),
            ]),
            Chromosome::from_genes(vec![
                prod(leaf(Const, SI_AHEAD_MASS, 2000, 1048), 1),
                sum(leaf(Limit, 0, 226, -76), 2),
                leaf(Limit, SI_STARVE, 3944, 2187),
            ]),
        ),
        // Mate: a body ahead, scaled by time since the last mating.
        (
            Chromosome::from_genes(vec![
                prod(leaf(Sense, 55, 1421, 456), 1),
                leaf(Sense, SI_AHEAD_MASS, 734, 101),
            ]),
            Chromosome::from_genes(vec![
                prod(leaf(Sense, 55, 1339, 567), 1),
                leaf(Sense, SI_AHEAD_MASS, 785, 101),
            ]),
        ),
        // Divide: strongly, once offspring would be viable.
        (
            Chromosome::from_genes(vec![
                prod(leaf(Const, SI_AHEAD_MASS, 3500, 1048), 1),
                leaf(Limit, SI_SPAWN, 1200, 3000),
            ]),
            Chromosome::from_genes(vec![
                prod(leaf(Const, SI_AHEAD_MASS, 4000, 1048), 1),
                leaf(Limit, SI_SPAWN, 1800, 1850),
            ]),
        ),
        // Mate response.
        (
            Chromosome::from_genes(vec![leaf(Limit, 11, -50, 591)]),
            Chromosome::from_genes(vec![leaf(Limit, 51, -79, 546)]),
        ),
    ]
}

impl Engine {
    /// Seeds the original bug at world center: facing east, fat enough for
    /// many divisions, red-max ethnicity, unknown ancestry, and a freshly
    /// mutated matebrain. Returns `None` if the center cell is taken.
    pub fn spawn_founder(&mut self) -> Option<BugKey> {
        let bounds = self.grid.bounds();
        let p = CellPos::new(bounds.width / 2, bounds.height / 2);
        let uid = self.uid_counter;
        self.uid_counter += 1;

        let eth = Ethnicity::new(uid, ETHNIC_DUR, 0, 0);
        let expression = self.rng.next_bounded(256) as u8;
        let brain = Brain::assemble(founder_pairs(), eth, expression);
        let mut bug = Bug::newborn(p, DIR_E, DIE_THIN * 256, self.today, brain);
        bug.matebrain.mutate(&mut self.rng);
        self.spawn_bug(bug)
    }
}
