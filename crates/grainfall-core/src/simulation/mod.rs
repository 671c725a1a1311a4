//! Material table and cell words

// Re-export from grainfall-simulation so resolvers use one path
pub use grainfall_simulation::{
    AIR_DENSITY, BOUNDARY_DENSITY, Cell, ConfigError, EndOfLife, GRAVITY, MaterialDef, MaterialId,
    MaterialTable, MaterialType, Materials, Reaction, ReactionOutcome, ReactionRegistry,
    cell_flags,
};
