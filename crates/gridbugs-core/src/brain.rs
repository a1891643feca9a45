//! Diploid decision genomes.
//!
//! Each decision holds a pair of chromosomes; the `expression` bitmap picks
//! which one a decision consults. `RESPONSE_MATE` is the odd one out: both of
//! its chromosomes are summed when a partner proposes.

use crate::constants::{ACT_DIVIDE, ETHNIC_DUR, FAM_HIST, N_DECISIONS, N_SENSES};
use crate::gene::Chromosome;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

/// Lineage tag: a serial number plus assimilation color weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ethnicity {
    pub uid: i64,
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Ethnicity {
    #[must_use]
    pub const fn new(uid: i64, r: i32, g: i32, b: i32) -> Self {
        Self { uid, r, g, b }
    }

    /// Placeholder for ancestors beyond recorded history.
    #[must_use]
    pub const fn unknown() -> Self {
        Self::new(-1, ETHNIC_DUR / 8, ETHNIC_DUR / 8, ETHNIC_DUR / 8)
    }
}

/// A diploid chromosome pair with the ethnicity stamps of the last mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPair {
    pub a: Chromosome,
    pub b: Chromosome,
    pub ea: Ethnicity,
    pub eb: Ethnicity,
}

/// The whole decision-making genome of a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brain {
    pub act: Vec<DecisionPair>,
    #[serde(with = "BigArray")]
    pub family: [Ethnicity; FAM_HIST],
    pub eth: Ethnicity,
    pub generation: i64,
    /// Offspring count per division, kept in `[2, 7]`.
    pub divide: i64,
    /// Total chain length across every chromosome; feeds the cost of living.
    pub ngenes: i64,
    /// Bit `i` set means decision `i` consults chromosome A.
    pub expression: u8,
}

impl Brain {
    /// Assembles a brain from eight chromosome pairs, counting genes and
    /// stamping every pair with the owner's ethnicity.
    #[must_use]
    pub fn assemble(
        pairs: [(Chromosome, Chromosome); N_DECISIONS],
        eth: Ethnicity,
        expression: u8,
    ) -> Self {
        let mut ngenes = 0i64;
        let act = pairs
            .into_iter()
            .map(|(a, b)| {
                ngenes += (a.len() + b.len()) as i64;
                DecisionPair {
                    a,
                    b,
                    ea: eth,
                    eb: eth,
                }
            })
            .collect();
        Self {
            act,
            family: [Ethnicity::unknown(); FAM_HIST],
            eth,
            generation: 0,
            divide: 3,
            ngenes,
            expression,
        }
    }

    /// Recomputes `ngenes` from the chains.
    #[must_use]
    pub fn count_genes(&self) -> i64 {
        self.act
            .iter()
            .map(|pair| (pair.a.len() + pair.b.len()) as i64)
            .sum()
    }

    /// Picks the action for the current senses: per decision the expressed
    /// chromosome is evaluated and the highest weight wins, ties landing on
    /// the smallest index.
    pub fn decide<R: RandomSource>(&mut self, senses: &[i64; N_SENSES], rng: &mut R) -> usize {
        let mut best = -1_048_576i64;
        let mut choice = 0usize;
        let mut bit = 1u8;
        for i in 0..=ACT_DIVIDE {
            let pair = &mut self.act[i];
            let v = if self.expression & bit != 0 {
                pair.a.evaluate(senses, rng)
            } else {
                pair.b.evaluate(senses, rng)
            };
            bit = bit.wrapping_shl(1);
            if v > best {
                best = v;
                choice = i;
            }
        }
        choice
    }

    /// Applies a geometric burst of mutations: one for sure, each further
    /// one at half the odds. A mutation either nudges `divide` or edits one
    /// chromosome (tweak, or 3/4 grow, else prune).
    pub fn mutate<R: RandomSource>(&mut self, rng: &mut R) {
        let mut r = 1 + rng.next_bounded(16383);
        while r < 16384 {
            let n = rng.next_bounded(N_DECISIONS as i64 + 1) as usize;
            if n == N_DECISIONS {
                self.divide += rng.next_bounded(3) - 1;
                // Bounce off the edges rather than saturating.
                if self.divide > 7 {
                    self.divide = 6;
                }
                if self.divide < 2 {
                    self.divide = 3;
                }
            } else {
                let eth = self.eth;
                let pair = &mut self.act[n];
                let chromo = if rng.next_bounded(2) != 0 {
                    pair.ea = eth;
                    &mut pair.a
                } else {
                    pair.eb = eth;
                    &mut pair.b
                };
                let picked = rng.next_bounded(chromo.len() as i64) as usize;
                if rng.next_bounded(2) != 0 {
                    chromo.tweak(picked, rng);
                } else if rng.next_bounded(4) != 0 {
                    chromo.graft_copy(picked, rng);
                    self.ngenes += 1;
                } else {
                    self.ngenes -= chromo.prune(picked, rng) as i64;
                }
            }
            r *= 2;
        }
    }
}

/// Counts uid-equal pairs between the same window range of two families.
fn range_match(b1: &Brain, b2: &Brain, range: std::ops::RangeInclusive<usize>) -> i64 {
    let mut m = 0;
    for i in range.clone() {
        for j in range.clone() {
            if b1.family[i].uid == b2.family[j].uid {
                m += 1;
            }
        }
    }
    m
}

/// Genetic-similarity score between two brains, 1024 meaning certain kin.
///
/// `level` is the probe-cell distance class; farther cells get deeper
/// ancestry comparison. Parent matches weigh 256 each, and sharing both
/// parents is a total match outright.
#[must_use]
pub fn family_match(b1: &Brain, b2: &Brain, level: usize) -> i64 {
    if level == 0 {
        return 1024;
    }
    let mut r = range_match(b1, b2, 0..=1) * 256;
    if r == 512 {
        return 1024;
    }
    if level < 2 {
        return r;
    }
    r += range_match(b1, b2, 2..=5) * 64;
    if level < 3 {
        return r;
    }
    r += range_match(b1, b2, 6..=13) * 16;
    r += range_match(b1, b2, 14..=29) * 4;
    r += range_match(b1, b2, 30..=62);
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ACT_MOVE, ACT_SLEEP};
    use crate::gene::{Gene, GeneKind};
    use crate::rng::{ScriptedRng, TurnRng};

    fn constant_brain(weights: [i64; N_DECISIONS]) -> Brain {
        let pairs = weights.map(|w| {
            (
                Chromosome::from_genes(vec![Gene::leaf(GeneKind::Const, 0, w, 0)]),
                Chromosome::from_genes(vec![Gene::leaf(GeneKind::Const, 0, w, 0)]),
            )
        });
        Brain::assemble(pairs, Ethnicity::new(0, ETHNIC_DUR, 0, 0), 0)
    }

    #[test]
    fn decide_takes_the_argmax() {
        let mut brain = constant_brain([10, 20, 5, 5, 90, 1, 1, 0]);
        let mut rng = TurnRng::default();
        assert_eq!(brain.decide(&[0; N_SENSES], &mut rng), ACT_MOVE);
    }

    #[test]
    fn decide_breaks_ties_toward_the_smallest_index() {
        let mut brain = constant_brain([50, 50, 50, 50, 50, 50, 50, 0]);
        let mut rng = TurnRng::default();
        assert_eq!(brain.decide(&[0; N_SENSES], &mut rng), ACT_SLEEP);
    }

    #[test]
    fn expression_bit_selects_the_chromosome() {
        let mut brain = constant_brain([0; N_DECISIONS]);
        brain.act[ACT_MOVE].a =
            Chromosome::from_genes(vec![Gene::leaf(GeneKind::Const, 0, 777, 0)]);
        brain.ngenes = brain.count_genes();
        let mut rng = TurnRng::default();

        brain.expression = 0;
        assert_eq!(brain.decide(&[0; N_SENSES], &mut rng), ACT_SLEEP);
        brain.expression = 1 << ACT_MOVE;
        assert_eq!(brain.decide(&[0; N_SENSES], &mut rng), ACT_MOVE);
    }

    #[test]
    fn ngenes_tracks_chain_lengths_through_mutation() {
        let mut brain = constant_brain([1, 2, 3, 4, 5, 6, 7, 8]);
        let mut rng = TurnRng::new(2024);
        for _ in 0..200 {
            brain.mutate(&mut rng);
            assert_eq!(brain.ngenes, brain.count_genes());
            assert!((2..=7).contains(&brain.divide));
            for pair in &brain.act {
                assert!(pair.a.is_coherent());
                assert!(pair.b.is_coherent());
            }
        }
    }

    #[test]
    fn mutation_budget_is_geometric() {
        // First draw lands the top-level roll in [8192, 16383), so exactly
        // one mutation happens; it targets the divide count (n == NDEC) and
        // leaves every chromosome untouched.
        let mut brain = constant_brain([1; N_DECISIONS]);
        let before = brain.clone();
        let mut rng = ScriptedRng::new(&[9000, N_DECISIONS as i64, 1]);
        brain.mutate(&mut rng);
        assert_eq!(brain.divide, 3, "divide nudged by 1 - 1 = 0");
        assert_eq!(brain.act, before.act, "a single divide mutation leaves genes alone");
    }

    #[test]
    fn family_match_weights_parent_generations() {
        let mut a = constant_brain([0; N_DECISIONS]);
        let mut b = constant_brain([0; N_DECISIONS]);
        for (i, slot) in a.family.iter_mut().enumerate() {
            slot.uid = 1000 + i as i64;
        }
        for (i, slot) in b.family.iter_mut().enumerate() {
            slot.uid = 2000 + i as i64;
        }

        assert_eq!(family_match(&a, &b, 0), 1024);
        assert_eq!(family_match(&a, &b, 1), 0);

        // One shared parent.
        b.family[0].uid = a.family[0].uid;
        assert_eq!(family_match(&a, &b, 1), 256);

        // Both parents shared: total match regardless of the rest.
        b.family[1].uid = a.family[1].uid;
        assert_eq!(family_match(&a, &b, 1), 1024);
    }

    #[test]
    fn family_match_depth_grows_with_level() {
        let mut a = constant_brain([0; N_DECISIONS]);
        let mut b = constant_brain([0; N_DECISIONS]);
        for (i, slot) in a.family.iter_mut().enumerate() {
            slot.uid = 1000 + i as i64;
        }
        for (i, slot) in b.family.iter_mut().enumerate() {
            slot.uid = 2000 + i as i64;
        }
        // A single shared grandparent counts only from level 2 up.
        b.family[2].uid = a.family[2].uid;
        assert_eq!(family_match(&a, &b, 1), 0);
        assert_eq!(family_match(&a, &b, 2), 64);
        // A shared great-grandparent needs level 3.
        b.family[6].uid = a.family[6].uid;
        assert_eq!(family_match(&a, &b, 2), 64);
        assert_eq!(family_match(&a, &b, 3), 80);
    }
}
