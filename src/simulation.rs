use crate::agent::{Agent, Kind};
use crate::config::{ConfigError, SimulationConfig};
use crate::constants::{
    INITIAL_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER, MIN_SPEED_MULTIPLIER, SPEED_ADJUST_FACTOR,
};
use crate::grid::{Grid, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type SimRng = StdRng;

/// Owns the committed grid and drives it one tick at a time. The driver is
/// expected to funnel both `advance` and `snapshot` through this one value;
/// a partially stepped grid is never observable from outside.
pub struct SimulationState {
    grid: Grid,
    rng: SimRng,
    tick: u64,
    config: SimulationConfig,
    is_paused: bool,
    speed_multiplier: f64,
}

impl SimulationState {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::build(config, SimRng::from_entropy())
    }

    /// Deterministic variant for tests and reproducible runs.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::build(config, SimRng::seed_from_u64(seed))
    }

    fn build(config: SimulationConfig, rng: SimRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut state = Self {
            grid: Grid::new(config.width, config.height),
            rng,
            tick: 0,
            config,
            is_paused: false,
            speed_multiplier: INITIAL_SPEED_MULTIPLIER,
        };
        state.seed_ocean();
        Ok(state)
    }

    /// Pre-populates the grid: a substrate band along the bottom, then flora
    /// scattered just above it and fauna in the open water, at counts
    /// proportional to the grid width.
    fn seed_ocean(&mut self) {
        let width = self.config.width;
        let height = self.config.height;
        let band_top = height - self.config.substrate_rows;

        for y in band_top..height {
            for x in 0..width {
                self.grid.place(Agent::substrate(x, y));
            }
        }

        for _ in 0..width / 5 {
            let x = self.rng.gen_range(0..width);
            let depth = self.rng.gen_range(1..=band_top.min(3));
            let root = Agent::flora_root(x, band_top - depth, &mut self.rng, &self.config.flora);
            self.grid.place(root);
        }
        for _ in 0..width / 10 {
            let x = self.rng.gen_range(0..width);
            let y = self.rng.gen_range(0..band_top);
            self.grid.place(Agent::forager(x, y, &self.config.forager));
        }
        for _ in 0..width / 20 {
            let x = self.rng.gen_range(0..width);
            let y = self.rng.gen_range(0..band_top);
            self.grid.place(Agent::hunter(x, y, &self.config.hunter));
        }

        let (flora, foragers, hunters) = self.grid.population_counts();
        log::info!(
            "seeded {width}x{height} ocean: {flora} flora, {foragers} foragers, {hunters} hunters"
        );
    }

    /// Advances the simulation by exactly one tick: a full row-major scan of
    /// the committed grid where every live agent transitions into a fresh
    /// buffer, followed by one population-controller pass.
    pub fn advance(&mut self) {
        let mut next = Grid::new(self.config.width, self.config.height);
        for y in 0..self.config.height {
            for x in 0..self.config.width {
                let Some(agent) = self.grid.get(x, y).copied() else {
                    continue;
                };
                if agent.removed {
                    continue;
                }
                agent.update(&mut self.grid, &mut next, &mut self.rng, &self.config);
            }
        }
        // Committing the new buffer drops the old one, and with it every
        // agent flagged for removal this tick.
        self.grid = next;
        self.tick += 1;
        self.reseed();
    }

    /// Stochastic reseeding, active only inside the configured tick window.
    /// Three independent, best-effort, single-placement attempts that no-op
    /// silently when the drawn cell is unsuitable.
    fn reseed(&mut self) {
        if self.tick >= self.config.spawn_window_ticks {
            return;
        }
        let width = self.config.width;
        let band_top = self.config.height - self.config.substrate_rows;

        if self.rng.gen_bool(self.config.flora_spawn_chance) {
            let x = self.rng.gen_range(0..width);
            let y = band_top - 1;
            let on_substrate =
                matches!(self.grid.get(x, band_top), Some(a) if a.kind() == Kind::Substrate);
            let radius = self.rng.gen_range(1..=self.config.flora_spacing_max.max(1));
            let from = x.saturating_sub(radius);
            let to = (x + radius).min(width - 1);
            if self.grid.is_empty(x, y) && on_substrate && !self.flora_in_columns(from, to) {
                let root = Agent::flora_root(x, y, &mut self.rng, &self.config.flora);
                self.grid.place(root);
            }
        }

        if self.rng.gen_bool(self.config.forager_spawn_chance) {
            let x = self.rng.gen_range(0..width);
            let y = self.rng.gen_range(0..band_top);
            if self.grid.is_empty(x, y) {
                self.grid.place(Agent::forager(x, y, &self.config.forager));
            }
        }

        if self.rng.gen_bool(self.config.hunter_spawn_chance) {
            let x = self.rng.gen_range(0..width);
            let y = self.rng.gen_range(0..band_top);
            if self.grid.is_empty(x, y) {
                self.grid.place(Agent::hunter(x, y, &self.config.hunter));
            }
        }
    }

    fn flora_in_columns(&self, from_x: usize, to_x: usize) -> bool {
        for x in from_x..=to_x {
            for y in 0..self.grid.height() {
                if matches!(self.grid.get(x, y), Some(a) if a.kind() == Kind::Flora) {
                    return true;
                }
            }
        }
        false
    }

    pub fn snapshot(&self) -> Snapshot {
        self.grid.snapshot()
    }

    /// (flora, foragers, hunters) currently alive.
    pub fn population_counts(&self) -> (usize, usize, usize) {
        self.grid.population_counts()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn adjust_speed(&mut self, increase: bool) {
        self.speed_multiplier = if increase {
            (self.speed_multiplier * SPEED_ADJUST_FACTOR).min(MAX_SPEED_MULTIPLIER)
        } else {
            (self.speed_multiplier / SPEED_ADJUST_FACTOR).max(MIN_SPEED_MULTIPLIER)
        };
        println!("Speed Multiplier: {:.2}", self.speed_multiplier);
    }

    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
        println!(
            "Simulation {}",
            if self.is_paused { "Paused" } else { "Resumed" }
        );
    }

    pub fn restart(&mut self) {
        log::info!("restarting simulation with a fresh seed");
        self.rng = SimRng::from_entropy();
        self.grid = Grid::new(self.config.width, self.config.height);
        self.tick = 0;
        self.speed_multiplier = INITIAL_SPEED_MULTIPLIER;
        self.is_paused = false;
        self.seed_ocean();
    }
}
