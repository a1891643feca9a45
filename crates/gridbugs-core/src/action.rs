//! Action execution: one bug's turn, with every side effect of the chosen
//! action, and the roster walk that drives a whole day.

use crate::brain::{Brain, DecisionPair, Ethnicity};
use crate::bug::{Bug, BugKey};
use crate::constants::{
    ACT_DEFEND, ACT_DIVIDE, ACT_EAT, ACT_MATED, ACT_MATE, ACT_MOVE, ACT_TURN_CCW, ACT_TURN_CW,
    COST_DIVIDE, COST_EAT, COST_FIGHT, COST_MOVE, COST_SLEEP, COST_TURN, DIE_THIN, EAT_LIMIT,
    ETHNIC_DUR, FAM_HIST, N_DECISIONS, RESPONSE_MATE,
};
use crate::engine::Engine;
use crate::hex::{normalize_dir, CellPos};
use crate::rng::RandomSource;
use crate::sense::Senses;
use crate::stats::{DeathCause, WorldEvent};

impl Engine {
    /// Walks the roster head to tail. Newborns are appended while walking
    /// and therefore act on the day they are born; keys of bugs that died
    /// mid-walk are skipped and compacted away afterwards.
    pub(crate) fn move_bugs(&mut self) {
        let mut cursor = 0;
        while cursor < self.roster.len() {
            let key = self.roster[cursor];
            cursor += 1;
            if !self.bugs.contains_key(key) {
                continue;
            }
            self.act_bug(key);
        }
        let bugs = &self.bugs;
        self.roster.retain(|k| bugs.contains_key(*k));
    }

    /// One bug's turn: sense, shift history, decide, act, then the
    /// starvation judgment.
    fn act_bug(&mut self, key: BugKey) {
        let senses = self.gather_senses(key);
        let act = {
            let Self { bugs, rng, .. } = self;
            let bug = &mut bugs[key];
            bug.shift_history();
            let act = bug.brain.decide(&senses, rng);
            bug.pos[0].act = act;
            act
        };

        match act {
            ACT_EAT => self.do_eat(key),
            ACT_TURN_CW => {
                let bug = &mut self.bugs[key];
                bug.pos[0].face = if bug.pos[0].face < 3 {
                    bug.pos[0].face + 1
                } else {
                    -2
                };
                bug.charge(COST_TURN);
            }
            ACT_TURN_CCW => {
                let bug = &mut self.bugs[key];
                bug.pos[0].face = if bug.pos[0].face > -2 {
                    bug.pos[0].face - 1
                } else {
                    3
                };
                bug.charge(COST_TURN);
            }
            ACT_MOVE => self.do_move(key),
            ACT_MATE => self.do_mate(key, &senses),
            ACT_DIVIDE => self.do_divide(key),
            _ => self.bugs[key].charge(COST_SLEEP),
        }

        if let Some(bug) = self.bugs.get(key) {
            if bug.pos[0].weight < DIE_THIN {
                let slot = self.hist_slot();
                self.hist[slot].starvations += 1;
                self.kill_bug(key, DeathCause::Starved);
            }
        }
    }

    /// Eat from the cell underfoot, limited to a fraction of body mass.
    /// Demanding more than the cell holds costs the difference.
    fn do_eat(&mut self, key: BugKey) {
        let p = self.bugs[key].pos[0].p;
        let available = self.grid.cell(p).food;
        {
            let bug = &mut self.bugs[key];
            let mut intake = (bug.pos[0].weight * EAT_LIMIT) / 1024;
            if intake > available {
                bug.pos[0].weight -= intake - available;
                intake = available;
            }
            bug.pos[0].weight += intake;
            self.grid.cell_mut(p).food -= intake;
        }
        self.bugs[key].charge(COST_EAT);
    }

    /// Step forward; an occupied destination means combat unless safety is
    /// on. The move is paid for either way.
    fn do_move(&mut self, key: BugKey) {
        let slot = self.hist_slot();
        self.bugs[key].moves += 1;
        self.hist[slot].movement += 1;

        let (from, face) = {
            let s = self.bugs[key].pos[0];
            (s.p, s.face)
        };
        let dest = self.grid.step(from, face);
        let defender = self.grid.cell(dest).bug;
        self.bugs[key].charge(COST_MOVE);
        if self.bugs[key].pos[0].weight < 0 {
            self.bugs[key].pos[0].weight = 0;
        }

        match defender {
            Some(dkey) => {
                if self.sched.safety {
                    return;
                }
                self.hist[slot].collisions += 1;
                self.resolve_combat(key, dkey, from, dest);
            }
            None => {
                self.grid.cell_mut(dest).bug = Some(key);
                self.grid.cell_mut(from).bug = None;
                self.bugs[key].pos[0].p = dest;
                self.events.push(WorldEvent::Moved {
                    uid: self.bugs[key].brain.eth.uid,
                    from,
                    to: dest,
                });
            }
        }
    }

    /// Fight over `dest`. The defender's effective mass is scaled by the
    /// relative facing and its defense experience; the attacker's kill tally
    /// erodes it from behind. Exactly one of the two dies.
    fn resolve_combat(&mut self, key: BugKey, dkey: BugKey, from: CellPos, dest: CellPos) {
        let (d_weight, d_face, d_defends) = {
            let d = &self.bugs[dkey];
            (d.pos[0].weight, d.pos[0].face, d.defends)
        };
        let (a_weight, a_face, a_kills) = {
            let a = &self.bugs[key];
            (a.pos[0].weight, a.pos[0].face, a.kills)
        };

        let mut mass = d_weight;
        match normalize_dir(d_face - a_face) {
            0 => {
                mass *= d_defends / 2 + 1;
                mass /= 128;
            }
            1 | -1 => {
                mass *= d_defends / 4 + 1;
                mass /= 1024;
            }
            2 | -2 => {
                mass *= d_defends / 8 + 1;
                mass /= 8192;
                mass -= a_kills;
            }
            _ => {
                mass /= 65536;
                mass -= a_kills * a_kills;
            }
        }
        if mass < 0 {
            mass = 0;
        }

        if self.rng.next_bounded(mass + a_weight / 1024) > mass {
            // Victory: the corpse feeds the cell the attacker now claims.
            self.bugs[key].kills += 1;
            self.kill_bug(dkey, DeathCause::Slain);
            self.grid.cell_mut(dest).bug = Some(key);
            self.grid.cell_mut(from).bug = None;
            self.bugs[key].pos[0].p = dest;
            self.events.push(WorldEvent::Moved {
                uid: self.bugs[key].brain.eth.uid,
                from,
                to: dest,
            });
            self.bugs[key].charge(COST_FIGHT);
        } else {
            // Defeat: the attacker's remains feed the defender's cell.
            self.bugs[dkey].defends += 1;
            let remains = self.bugs[key].pos[0].weight;
            self.grid.cell_mut(dest).food += remains;
            self.bugs[key].pos[0].weight = 0;
            self.kill_bug(key, DeathCause::Slain);
            let defender = &mut self.bugs[dkey];
            defender.shift_history();
            defender.pos[0].act = ACT_DEFEND;
        }
    }

    /// Propose to the bug ahead. The partner's response chromosomes are both
    /// evaluated, over the suitor's senses, and a positive sum seals it:
    /// matebrains swap and both sides log the mating.
    fn do_mate(&mut self, key: BugKey, senses: &Senses) {
        let (from, face) = {
            let s = self.bugs[key].pos[0];
            (s.p, s.face)
        };
        let dest = self.grid.step(from, face);

        match self.grid.cell(dest).bug {
            Some(pkey) => {
                let response = {
                    let Self { bugs, rng, .. } = self;
                    let pair = &mut bugs[pkey].brain.act[RESPONSE_MATE];
                    pair.a.evaluate(senses, rng) + pair.b.evaluate(senses, rng)
                };
                // The target cell is always one step away, so the pair can
                // never alias.
                if response > 0
                    && let Some([me, partner]) = self.bugs.get_disjoint_mut([key, pkey])
                {
                    if me.matebrain.eth.uid != partner.brain.eth.uid {
                        me.mate_success += 1;
                    } else {
                        me.mate_repeat += 1;
                    }
                    if partner.matebrain.eth.uid != me.brain.eth.uid {
                        partner.mate_success += 1;
                    } else {
                        partner.mate_repeat += 1;
                    }
                    me.matebrain = partner.brain.clone();
                    partner.matebrain = me.brain.clone();
                    partner.shift_history();
                    partner.pos[0].act = ACT_MATED;
                    me.pos[0].act = ACT_MATED;
                    let uids = (me.brain.eth.uid, partner.brain.eth.uid);
                    self.events.push(WorldEvent::Mated {
                        uid: uids.0,
                        partner: uids.1,
                    });
                } else {
                    self.bugs[key].mate_fails += 1;
                }
            }
            None => self.bugs[key].mate_fails += 1,
        }
        let costmate = self.sched.costmate;
        self.bugs[key].charge(costmate);
    }

    /// Split into `divide - 1` children plus the thinner parent, gated by
    /// the forcemate rules. Children inherit one haploid per decision from
    /// each of brain and matebrain.
    fn do_divide(&mut self, key: BugKey) {
        let forcemate = self.sched.forcemate;
        let agediv = self.sched.agediv;

        {
            let bug = &mut self.bugs[key];
            if forcemate & 0x10 != 0 && bug.birthday + agediv > self.today {
                if forcemate & 0x40 != 0 {
                    bug.pos[0].weight /= bug.brain.divide;
                }
                if forcemate & 0x20 != 0 {
                    bug.pos[0].weight -= COST_DIVIDE;
                }
                if bug.pos[0].weight < DIE_THIN {
                    bug.pos[0].weight = DIE_THIN;
                }
                bug.charge(COST_SLEEP);
                return;
            }
            if forcemate & 0x01 != 0 && bug.brain.eth.uid == bug.matebrain.eth.uid {
                if forcemate & 0x08 != 0 {
                    bug.pos[0].weight /= bug.brain.divide;
                }
                if forcemate & 0x04 != 0 {
                    bug.pos[0].weight -= COST_DIVIDE;
                }
                if bug.pos[0].weight < DIE_THIN {
                    bug.pos[0].weight = DIE_THIN;
                }
                bug.charge(COST_SLEEP);
                return;
            }
        }

        let (child_mass, divide, parent_pos, parent_face) = {
            let bug = &mut self.bugs[key];
            let mass = bug.pos[0].weight / bug.brain.divide - COST_DIVIDE;
            bug.pos[0].weight = mass;
            (mass, bug.brain.divide, bug.pos[0].p, bug.pos[0].face)
        };
        if child_mass < DIE_THIN {
            return;
        }

        let parent_brain = self.bugs[key].brain.clone();
        let parent_mate = self.bugs[key].matebrain.clone();
        let slot = self.hist_slot();

        // Offspring are born to the rear first, reducing parent/child
        // collisions on the very next move.
        for i in 1..divide {
            let face = parent_face
                + match i {
                    1 => 3,
                    2 => -2,
                    3 => 2,
                    4 => -1,
                    5 => 1,
                    _ => 0,
                };
            let p = self.grid.step(parent_pos, face);
            if self.grid.cell(p).bug.is_some() {
                continue;
            }
            self.bugs[key].offspring += 1;
            self.hist[slot].births += 1;
            self.birth_child(&parent_brain, &parent_mate, p, face, child_mass);
        }

        if forcemate & 0x02 != 0 {
            let own_uid = self.bugs[key].brain.eth.uid;
            self.bugs[key].matebrain.eth.uid = own_uid;
        }
    }

    /// Builds and places one child at `p`, drawing crossover, expression and
    /// mutation in a fixed order.
    fn birth_child(
        &mut self,
        parent: &Brain,
        mate: &Brain,
        p: CellPos,
        face: i32,
        mass: i64,
    ) -> BugKey {
        let uid = self.uid_counter;
        self.uid_counter += 1;

        let mut family = [Ethnicity::unknown(); FAM_HIST];
        family[0] = parent.eth;
        family[1] = mate.eth;
        let mut j = 2;
        while j + 1 < FAM_HIST {
            family[j] = parent.family[j / 2 - 1];
            family[j + 1] = mate.family[j / 2 - 1];
            j += 2;
        }

        let mut eth = assimilate(&parent.eth, &mate.eth, p, self.grid.bounds().height);
        eth.uid = uid;

        let (brain, mutate_mate, mutate_brain) = {
            let Self { rng, .. } = self;
            let mut act = Vec::with_capacity(N_DECISIONS);
            let mut ngenes = 0i64;
            for d in 0..N_DECISIONS {
                let (a, ea) = if rng.next_bounded(2) != 0 {
                    (parent.act[d].a.clone(), parent.act[d].ea)
                } else {
                    (parent.act[d].b.clone(), parent.act[d].eb)
                };
                let (b, eb) = if rng.next_bounded(2) != 0 {
                    (mate.act[d].a.clone(), mate.act[d].ea)
                } else {
                    (mate.act[d].b.clone(), mate.act[d].eb)
                };
                ngenes += (a.len() + b.len()) as i64;
                act.push(DecisionPair { a, b, ea, eb });
            }
            let divide = if rng.next_bounded(2) != 0 {
                parent.divide
            } else {
                mate.divide
            };
            let expression = rng.next_bounded(256) as u8;
            let brain = Brain {
                act,
                family,
                eth,
                generation: parent.generation.max(mate.generation) + 1,
                divide,
                ngenes,
                expression,
            };
            let mutate_mate = rng.next_bounded(4) == 0;
            let mutate_brain = rng.next_bounded(8) == 0;
            (brain, mutate_mate, mutate_brain)
        };

        let mut child = Bug::newborn(p, face, mass, self.today, brain);
        if mutate_mate {
            child.matebrain.mutate(&mut self.rng);
        }
        if mutate_brain {
            child.brain.mutate(&mut self.rng);
        }

        let ckey = self.bugs.insert(child);
        self.roster.push(ckey);
        self.grid.cell_mut(p).bug = Some(ckey);
        self.events.push(WorldEvent::Born {
            uid,
            parent: parent.eth.uid,
            pos: p,
        });
        ckey
    }
}

/// Averages the parents' colors and drifts them toward the latitude band:
/// blue sky at the top, redlands in the middle, greenland at the bottom.
/// The channel sum is held at `ETHNIC_DUR` or above.
fn assimilate(mom: &Ethnicity, dad: &Ethnicity, p: CellPos, world_y: i32) -> Ethnicity {
    let mut r = (mom.r + dad.r) / 2;
    let mut g = (mom.g + dad.g) / 2;
    let mut b = (mom.b + dad.b) / 2;
    match (p.y * 3) / world_y {
        0 => {
            if r > 0 {
                r -= 1;
                b += 1;
            }
            if g > 0 {
                g -= 1;
                b += 1;
            }
            b += (ETHNIC_DUR - (r + g + b)).max(0);
        }
        1 => {
            if g > 0 {
                g -= 1;
                r += 1;
            }
            if b > 0 {
                b -= 1;
                r += 1;
            }
            r += (ETHNIC_DUR - (r + g + b)).max(0);
        }
        _ => {
            if r > 0 {
                r -= 1;
                g += 1;
            }
            if b > 0 {
                b -= 1;
                g += 1;
            }
            g += (ETHNIC_DUR - (r + g + b)).max(0);
        }
    }
    Ethnicity { uid: -1, r, g, b }
}
