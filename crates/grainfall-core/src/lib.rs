//! Cell grid simulation core for grainfall
//!
//! - `simulation`: material table and cell words (re-exported from grainfall-simulation)
//! - `world`: the grid, its tick buffer and the per-tick resolvers

pub mod simulation;
pub mod world;

pub use world::{Grid, GridError, SimConfig, TickStats};
