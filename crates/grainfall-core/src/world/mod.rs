//! The cell grid and its per-tick update

mod cell_layer;
mod grid;
mod lifecycle_system;
mod movement_system;
mod neighbor_queries;
mod reaction_system;
pub mod rng_trait;
mod scheduler;
mod sim_config;
mod spread_system;
pub mod stats;
mod tick_buffer;

pub use cell_layer::CellLayer;
pub use grid::{Grid, GridError, MAX_GRID_SIDE};
pub use lifecycle_system::LifecycleSystem;
pub use movement_system::{CellOutcome, MovementSystem};
pub use neighbor_queries::{NEIGHBORHOOD, NeighborQueries};
pub use reaction_system::ReactionSystem;
pub use rng_trait::WorldRng;
pub use scheduler::{TickContext, TickScheduler};
pub use sim_config::SimConfig;
pub use spread_system::FluidSpreadSystem;
pub use stats::{NoopStats, SimStats, TickStats};
pub use tick_buffer::TickBuffer;
