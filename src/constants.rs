// --- Global Simulation Constants ---

pub const GRID_WIDTH: usize = 120;
pub const GRID_HEIGHT: usize = 48;

// Pixel footprint of one grid cell; window size is derived from it.
pub const CELL_PIXEL_SIZE: f32 = 14.0;
pub const WINDOW_WIDTH: u32 = (GRID_WIDTH as f32 * CELL_PIXEL_SIZE) as u32;
pub const WINDOW_HEIGHT: u32 = (GRID_HEIGHT as f32 * CELL_PIXEL_SIZE) as u32;

// Deep-water navy backdrop.
pub const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.03,
    b: 0.16,
    a: 1.0,
};

// Per-kind cell colors, carried over from the original terminal palette.
pub const SUBSTRATE_COLOR: [f32; 4] = [0.86, 0.78, 0.42, 1.0];
pub const FLORA_COLOR: [f32; 4] = [0.13, 0.65, 0.20, 1.0];
pub const FORAGER_COLOR: [f32; 4] = [0.95, 0.55, 0.10, 1.0];
pub const HUNTER_COLOR: [f32; 4] = [0.88, 0.15, 0.12, 1.0];

// Fraction of a cell the quad fills; the rest reads as a grid gap.
pub const CELL_FILL_FACTOR: f32 = 0.92;

// One simulation tick every BASE_TICK_SECS at 1x speed.
pub const BASE_TICK_SECS: f64 = 0.15;
pub const INITIAL_SPEED_MULTIPLIER: f64 = 1.0;
pub const MIN_SPEED_MULTIPLIER: f64 = 0.25;
pub const MAX_SPEED_MULTIPLIER: f64 = 16.0;
pub const SPEED_ADJUST_FACTOR: f64 = 2.0;
// Cap on catch-up ticks per frame when the event loop stalls.
pub const MAX_TICKS_PER_FRAME: u32 = 8;

pub const FPS_UPDATE_INTERVAL_SECS: f64 = 1.0;
