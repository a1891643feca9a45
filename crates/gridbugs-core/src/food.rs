//! Seasonal food growth, rot around bugs, and spreading.

use crate::constants::{
    FOOD_CAP, FOOD_DECAY, FOOD_GROW, FOOD_HARD_CAP, FOOD_SPREAD, ROT, SEASON_LENGTH,
};
use crate::engine::Engine;
use crate::hex::CellPos;
use std::f64::consts::PI;

impl Engine {
    /// Seasonal growth multiplier (/1024) for cell `(x, y)` today.
    ///
    /// The growing season sweeps westward across the map once per year; the
    /// cosine terrain bands modulate it by latitude. This is the engine's
    /// single floating-point computation, done in f64 and rounded to the
    /// integer multiplier. Exposed for renderers that shade the season.
    #[must_use]
    pub fn growing_season(&self, x: i32, y: i32) -> i64 {
        let wx = i64::from(self.grid.bounds().width);
        let sax = (i64::from(x) + (self.today * wx) / SEASON_LENGTH) % wx;
        self.season_multiplier(sax, i64::from(y))
    }

    fn season_multiplier(&self, sax: i64, y: i64) -> i64 {
        let wx = i64::from(self.grid.bounds().width);
        let wy = i64::from(self.grid.bounds().height);
        let fgf = 0.1
            + self.sched.foodhump
                * (PI * sax as f64 / wx as f64).sin()
                * (0.51 - 0.5 * (6.0 * PI * y as f64 / wy as f64).cos());
        (((FOOD_GROW - 1024) as f64) * fgf).round() as i64 + 1024
    }

    /// Marks occupied cells with distance 0, everything else unoccupied.
    fn update_nearest(&mut self) {
        for cell in self.grid.cells_mut() {
            cell.nearest = if cell.bug.is_some() { 0 } else { -1 };
        }
    }

    /// Rebuilds the multiplier table when `foodhump` has changed. The table
    /// is indexed by `(y, sax)`; the daily season shift turns a lookup per
    /// cell into a rotation of the row.
    fn refresh_season_table(&mut self) {
        if self.season_foodhump == self.sched.foodhump {
            return;
        }
        let bounds = self.grid.bounds();
        self.season_table.clear();
        self.season_table.reserve(bounds.area());
        for y in 0..i64::from(bounds.height) {
            for sax in 0..i64::from(bounds.width) {
                self.season_table.push(self.season_multiplier(sax, y));
            }
        }
        self.season_foodhump = self.sched.foodhump;
    }

    /// One food pass in strict row-major order, mutating in place: growth or
    /// rot, over-cap decay, the hard ceiling, then spread into poorer
    /// neighbors outside the leak shadow. Also aggregates the day's totals.
    pub(crate) fn grow_food(&mut self) {
        self.update_nearest();
        self.refresh_season_table();
        self.totalfood = 0;
        self.totalbug = 0;
        self.genecount = 0;

        let bounds = self.grid.bounds();
        let wx = i64::from(bounds.width);
        let shift = ((self.today * wx) / SEASON_LENGTH) % wx;
        let leak = self.sched.leak;
        for y in 0..bounds.height {
            for x in 0..bounds.width {
                let p = CellPos::new(x, y);
                let sax = (i64::from(x) + shift) % wx;
                let g = self.season_table[y as usize * wx as usize + sax as usize];
                {
                    let cell = self.grid.cell_mut(p);
                    if cell.nearest == -1 || leak < i64::from(cell.nearest) {
                        cell.food = (cell.food * g) / 1024;
                    } else {
                        cell.food = (cell.food * ROT[cell.nearest as usize]) / 1024;
                    }
                    if cell.food > FOOD_CAP {
                        cell.food -= ((cell.food - FOOD_CAP) * FOOD_DECAY) / 1024;
                    }
                    if cell.food > FOOD_HARD_CAP {
                        cell.food = FOOD_HARD_CAP;
                    }
                }

                let cell = *self.grid.cell(p);
                self.totalfood += cell.food / 1024;
                if let Some(key) = cell.bug {
                    let bug = &self.bugs[key];
                    self.totalbug += bug.pos[0].weight;
                    self.genecount += bug.brain.ngenes;
                }

                for dir in -2..=3 {
                    let np = bounds.step(p, dir);
                    let here = self.grid.cell(p).food;
                    let neighbor = *self.grid.cell(np);
                    if neighbor.food < here / 16
                        && (neighbor.nearest == -1 || leak < i64::from(neighbor.nearest))
                    {
                        let t = (here * FOOD_SPREAD) / 1024;
                        self.grid.cell_mut(p).food -= t;
                        self.grid.cell_mut(np).food += t;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::constants::FOOD_START;

    fn engine() -> Engine {
        Engine::new(WorldConfig::default()).expect("engine")
    }

    #[test]
    fn growth_multiplier_stays_near_the_nominal_band() {
        let engine = engine();
        for y in 0..engine.grid().bounds().height {
            for x in 0..engine.grid().bounds().width {
                let g = engine.growing_season(x, y);
                assert!(
                    (1024 - 40..=1024 + 40).contains(&g),
                    "multiplier {g} out of band at ({x},{y})"
                );
            }
        }
    }

    #[test]
    fn empty_world_food_grows_toward_the_cap() {
        let mut engine = engine();
        engine.tick();
        let grown = engine
            .grid()
            .cells()
            .iter()
            .filter(|c| c.food > FOOD_START)
            .count();
        assert!(grown > 0, "somewhere on the map it is growing season");
        assert!(engine.grid().cells().iter().all(|c| c.food <= FOOD_HARD_CAP));
    }

    #[test]
    fn season_table_matches_the_scalar_formula() {
        let mut engine = engine();
        engine.tick();
        let bounds = engine.grid().bounds();
        let wx = i64::from(bounds.width);
        let shift = ((engine.today() * wx) / crate::constants::SEASON_LENGTH) % wx;
        for (x, y) in [(0, 0), (7, 33), (100, 80), (191, 159)] {
            let sax = (i64::from(x) + shift) % wx;
            assert_eq!(
                engine.growing_season(x, y),
                engine.season_table[y as usize * wx as usize + sax as usize]
            );
        }
    }

    #[test]
    fn hot_cell_spreads_into_poor_neighbors() {
        let mut engine = engine();
        for cell in engine.grid_mut().cells_mut() {
            cell.food = 0;
        }
        let hot = CellPos::new(20, 20);
        engine.grid_mut().cell_mut(hot).food = 16 * FOOD_CAP;

        engine.tick();

        let bounds = engine.grid().bounds();
        let fed_neighbors = (-2..=3)
            .map(|dir| bounds.step(hot, dir))
            .filter(|&np| engine.grid().cell(np).food > 0)
            .count();
        assert!(fed_neighbors > 0, "at least one neighbor received food");
        assert!(
            engine.grid().cell(hot).food < 16 * FOOD_CAP,
            "source cell decreased"
        );
    }
}
