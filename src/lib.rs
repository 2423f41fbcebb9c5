pub mod agent;
pub mod config;
pub mod constants;
pub mod grid;
pub mod renderer;
pub mod simulation;
