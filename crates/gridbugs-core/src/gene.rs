//! Expression-tree genes and their flat chromosome arena.
//!
//! A chromosome is both a tree and a chain: the tree (via `prod`/`sum` links)
//! drives evaluation, the chain (the vector order, element 0 being the root)
//! drives enumeration and uniform mutation picks. Keeping the genes in one
//! arena with index links makes copies plain clones, which the
//! reproduction-heavy workload leans on hard.

use crate::constants::N_SENSES;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Gene dispatch kinds. The numeric codes are genome data: kind mutation
/// walks the code space directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneKind {
    Const,
    Sense,
    Limit,
    Compare,
    Match,
}

impl GeneKind {
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Const => 1,
            Self::Sense => 2,
            Self::Limit => 3,
            Self::Compare => 4,
            Self::Match => 5,
        }
    }

    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Const,
            2 => Self::Sense,
            4 => Self::Compare,
            5 => Self::Match,
            _ => Self::Limit,
        }
    }
}

/// One node of a chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub kind: GeneKind,
    pub si: usize,
    pub c1: i64,
    pub c2: i64,
    /// Child whose value multiplies this one (/1024).
    pub prod: Option<u32>,
    /// Child whose value adds to this one.
    pub sum: Option<u32>,
}

impl Gene {
    #[must_use]
    pub const fn leaf(kind: GeneKind, si: usize, c1: i64, c2: i64) -> Self {
        Self {
            kind,
            si,
            c1,
            c2,
            prod: None,
            sum: None,
        }
    }
}

/// Saturating ramp of `x` between `l1` and `l2`, inverted when `l1 > l2`.
/// Equal bounds pin the interior to the midpoint.
#[must_use]
pub fn limit_fn(x: i64, l1: i64, l2: i64) -> i64 {
    // The interpolation spans are genome constants and may sit anywhere in
    // the i64 range; widen so the division itself cannot overflow.
    let lerp = |x: i64, lo: i64, hi: i64| -> i64 {
        ((1024i128 * (i128::from(x) - i128::from(lo))) / (i128::from(hi) - i128::from(lo))) as i64
    };
    if l1 <= l2 {
        if x < l1 {
            return 0;
        }
        if x > l2 {
            return 1024;
        }
        if l1 == l2 {
            return 512;
        }
        return lerp(x, l1, l2);
    }
    if x < l2 {
        return 1024;
    }
    if x > l1 {
        return 0;
    }
    1024 - lerp(x, l2, l1)
}

/// An expression tree stored as a chain of genes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chromosome {
    genes: Vec<Gene>,
}

impl Chromosome {
    #[must_use]
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        debug_assert!(!genes.is_empty());
        Self { genes }
    }

    /// Chain length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Evaluates the tree against `senses`, depth-first from the root.
    pub fn evaluate<R: RandomSource>(&mut self, senses: &[i64; N_SENSES], rng: &mut R) -> i64 {
        self.eval_node(0, senses, rng)
    }

    fn eval_node<R: RandomSource>(
        &mut self,
        idx: usize,
        senses: &[i64; N_SENSES],
        rng: &mut R,
    ) -> i64 {
        if self.genes[idx].si >= N_SENSES {
            let repaired = rng.next_bounded(N_SENSES as i64) as usize;
            warn!(si = self.genes[idx].si, repaired, "sense index out of range");
            self.genes[idx].si = repaired;
        }
        let g = self.genes[idx];
        // Evolved constants and deep product chains can push values far out
        // of the useful range; saturating keeps the arithmetic total.
        let mut v = match g.kind {
            GeneKind::Const => g.c1,
            GeneKind::Sense => (senses[g.si].saturating_mul(g.c1) / 1024).saturating_add(g.c2),
            GeneKind::Limit => limit_fn(senses[g.si], g.c1, g.c2),
            // The compare arithmetic never reaches the caller; these nodes
            // share the match formula.
            GeneKind::Compare | GeneKind::Match => {
                let other = senses[g.c2.rem_euclid(N_SENSES as i64) as usize];
                let spread = (senses[g.si] - other).saturating_mul(g.c1).saturating_abs();
                (1024 - spread / 1024).max(0)
            }
        };
        if let Some(p) = g.prod {
            v = v.saturating_mul(self.eval_node(p as usize, senses, rng)) / 1024;
        }
        if let Some(s) = g.sum {
            v = v.saturating_add(self.eval_node(s as usize, senses, rng));
        }
        v
    }

    /// Nudges the gene at `idx`: one edit for sure, each further edit at
    /// half the odds of the previous.
    pub fn tweak<R: RandomSource>(&mut self, idx: usize, rng: &mut R) {
        let mut r = 1 + rng.next_bounded(255);
        while r < 256 {
            let g = &mut self.genes[idx];
            match rng.next_bounded(4) {
                0 => {
                    let mut code = g.kind.code() + rng.next_bounded(4) + 1;
                    if code > 5 {
                        code -= 5;
                    }
                    g.kind = GeneKind::from_code(code);
                }
                1 => {
                    // Slight preference for nearby senses; zero shift is
                    // substituted, not redrawn.
                    let mut d = rng.next_bounded(N_SENSES as i64 + 6) - 3;
                    if d == 0 {
                        d = 6;
                    }
                    let mut si = g.si as i64 + d;
                    if si < 0 {
                        si += N_SENSES as i64;
                    }
                    if si > N_SENSES as i64 - 1 {
                        si %= N_SENSES as i64;
                    }
                    g.si = si as usize;
                }
                2 => {
                    let d = 1024 + rng.next_bounded(256) - 128;
                    g.c1 = (g.c1.saturating_mul(d) / 1024).saturating_add(rng.next_bounded(128) - 64);
                }
                _ => {
                    let d = 1024 + rng.next_bounded(256) - 128;
                    g.c2 = (g.c2.saturating_mul(d) / 1024).saturating_add(rng.next_bounded(128) - 64);
                }
            }
            r *= 2;
        }
    }

    /// Grows the tree: walks random `prod`/`sum` links from the root until a
    /// null child, grafts a copy of the gene at `src` there, appends it to
    /// the chain end, and tweaks it half the time. Returns the new gene's
    /// chain index.
    pub fn graft_copy<R: RandomSource>(&mut self, src: usize, rng: &mut R) -> usize {
        let mut at = 0usize;
        let take_prod = loop {
            if rng.next_bounded(2) != 0 {
                match self.genes[at].prod {
                    None => break true,
                    Some(next) => at = next as usize,
                }
            } else {
                match self.genes[at].sum {
                    None => break false,
                    Some(next) => at = next as usize,
                }
            }
        };
        let mut fresh = self.genes[src];
        fresh.prod = None;
        fresh.sum = None;
        let new_idx = self.genes.len();
        self.genes.push(fresh);
        if take_prod {
            self.genes[at].prod = Some(new_idx as u32);
        } else {
            self.genes[at].sum = Some(new_idx as u32);
        }
        if rng.next_bounded(2) != 0 {
            self.tweak(new_idx, rng);
        }
        new_idx
    }

    /// Prunes one subtree hanging off the gene at `idx` (random side when
    /// both are present), removing the dropped genes from the chain.
    /// Returns how many genes were removed; the selected gene itself always
    /// survives, so the root can never be detached.
    pub fn prune<R: RandomSource>(&mut self, idx: usize, rng: &mut R) -> usize {
        let g = self.genes[idx];
        let take_prod = match (g.prod, g.sum) {
            (Some(_), Some(_)) => rng.next_bounded(2) != 0,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return 0,
        };
        let sub_root = if take_prod {
            self.genes[idx].prod.take()
        } else {
            self.genes[idx].sum.take()
        };
        let Some(sub_root) = sub_root else { return 0 };

        let mut doomed = vec![false; self.genes.len()];
        let mut stack = vec![sub_root as usize];
        while let Some(at) = stack.pop() {
            if doomed[at] {
                continue;
            }
            doomed[at] = true;
            if let Some(p) = self.genes[at].prod {
                stack.push(p as usize);
            }
            if let Some(s) = self.genes[at].sum {
                stack.push(s as usize);
            }
        }

        let mut remap = vec![u32::MAX; self.genes.len()];
        let mut kept = Vec::with_capacity(self.genes.len());
        for (i, gene) in self.genes.iter().enumerate() {
            if !doomed[i] {
                remap[i] = kept.len() as u32;
                kept.push(*gene);
            }
        }
        for gene in &mut kept {
            gene.prod = gene.prod.map(|p| remap[p as usize]);
            gene.sum = gene.sum.map(|s| remap[s as usize]);
        }
        let removed = self.genes.len() - kept.len();
        self.genes = kept;
        removed
    }

    /// True when every `prod`/`sum` target lands inside the chain and the
    /// whole chain is reachable from the root.
    #[must_use]
    pub fn is_coherent(&self) -> bool {
        let n = self.genes.len();
        if n == 0 {
            return false;
        }
        let mut seen = vec![false; n];
        let mut stack = vec![0usize];
        while let Some(at) = stack.pop() {
            if seen[at] {
                continue;
            }
            seen[at] = true;
            for child in [self.genes[at].prod, self.genes[at].sum] {
                match child {
                    Some(c) if (c as usize) < n => stack.push(c as usize),
                    Some(_) => return false,
                    None => {}
                }
            }
        }
        seen.into_iter().all(|s| s)
    }
}
