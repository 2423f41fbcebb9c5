use crate::constants::{GRID_HEIGHT, GRID_WIDTH};
use std::{error::Error, fmt};

/// Flora growth parameters. A root picks its height cap uniformly from
/// `min_height..=max_height`; sprouts inherit the parent's cap.
#[derive(Debug, Clone)]
pub struct FloraConfig {
    pub min_height: u32,
    pub max_height: u32,
}

impl Default for FloraConfig {
    fn default() -> Self {
        Self {
            min_height: 10,
            max_height: 19,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForagerConfig {
    pub max_hunger: u32,
    /// Hunger restored by one meal, capped at `max_hunger`.
    pub feed_gain: u32,
}

impl Default for ForagerConfig {
    fn default() -> Self {
        Self {
            max_hunger: 15,
            feed_gain: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HunterConfig {
    pub max_hunger: u32,
    /// Post-kill wander cooldown is drawn from `min_cooldown..=max_cooldown`.
    pub min_cooldown: u32,
    pub max_cooldown: u32,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            max_hunger: 25,
            min_cooldown: 2,
            max_cooldown: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub width: usize,
    pub height: usize,
    /// Rows of substrate along the bottom of the grid.
    pub substrate_rows: usize,
    /// The population controller only reseeds while tick < this window.
    pub spawn_window_ticks: u64,
    pub flora_spawn_chance: f64,
    pub forager_spawn_chance: f64,
    pub hunter_spawn_chance: f64,
    /// Upper bound of the randomized column radius used to keep reseeded
    /// flora out of already-planted columns.
    pub flora_spacing_max: usize,
    pub flora: FloraConfig,
    pub forager: ForagerConfig,
    pub hunter: HunterConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            substrate_rows: 3,
            spawn_window_ticks: 2000,
            flora_spawn_chance: 0.05,
            forager_spawn_chance: 0.03,
            hunter_spawn_chance: 0.005,
            flora_spacing_max: 3,
            flora: FloraConfig::default(),
            forager: ForagerConfig::default(),
            hunter: HunterConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroDimension { width: usize, height: usize },
    /// The water column must be at least two rows taller than the substrate
    /// band or there is nowhere to place fauna.
    GridTooShallow { height: usize, substrate_rows: usize },
    ChanceOutOfRange { name: &'static str, value: f64 },
    EmptyRange { name: &'static str, min: u64, max: u64 },
    ZeroHunger { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDimension { width, height } => {
                write!(f, "grid dimensions must be positive, got {width}x{height}")
            }
            ConfigError::GridTooShallow {
                height,
                substrate_rows,
            } => write!(
                f,
                "grid height {height} leaves no open water above {substrate_rows} substrate rows"
            ),
            ConfigError::ChanceOutOfRange { name, value } => {
                write!(f, "{name} must be within [0, 1], got {value}")
            }
            ConfigError::EmptyRange { name, min, max } => {
                write!(f, "{name} range is empty: {min}..={max}")
            }
            ConfigError::ZeroHunger { name } => {
                write!(f, "{name} max hunger must be positive")
            }
        }
    }
}

impl Error for ConfigError {}

impl SimulationConfig {
    /// Checked once at startup; the engine itself has no recoverable errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.height < self.substrate_rows + 2 {
            return Err(ConfigError::GridTooShallow {
                height: self.height,
                substrate_rows: self.substrate_rows,
            });
        }
        for (name, value) in [
            ("flora_spawn_chance", self.flora_spawn_chance),
            ("forager_spawn_chance", self.forager_spawn_chance),
            ("hunter_spawn_chance", self.hunter_spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ChanceOutOfRange { name, value });
            }
        }
        if self.flora.min_height > self.flora.max_height {
            return Err(ConfigError::EmptyRange {
                name: "flora height",
                min: self.flora.min_height as u64,
                max: self.flora.max_height as u64,
            });
        }
        if self.hunter.min_cooldown > self.hunter.max_cooldown {
            return Err(ConfigError::EmptyRange {
                name: "hunter cooldown",
                min: self.hunter.min_cooldown as u64,
                max: self.hunter.max_cooldown as u64,
            });
        }
        if self.forager.max_hunger == 0 {
            return Err(ConfigError::ZeroHunger { name: "forager" });
        }
        if self.hunter.max_hunger == 0 {
            return Err(ConfigError::ZeroHunger { name: "hunter" });
        }
        Ok(())
    }
}
