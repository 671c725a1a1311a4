//! Material simulation data and reactions for grainfall
//!
//! This crate provides the foundational data types for the cell grid:
//! - Material definitions (MaterialId, MaterialDef, Materials)
//! - Material types and end-of-life rules (MaterialType, EndOfLife)
//! - Reaction rules (Reaction, ReactionOutcome, ReactionRegistry)
//! - Material tables loaded from RON (MaterialTable)
//! - Cell words (Cell, cell_flags)

mod cell;
mod error;
mod materials;
mod reactions;
mod table;

pub use cell::{Cell, cell_flags};
pub use error::ConfigError;
pub use materials::{
    AIR_DENSITY, BOUNDARY_DENSITY, EndOfLife, GRAVITY, MaterialDef, MaterialId, MaterialType,
    Materials,
};
pub use reactions::{Reaction, ReactionOutcome, ReactionRegistry};
pub use table::MaterialTable;
