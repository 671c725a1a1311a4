//! Aging and end-of-life

use crate::simulation::{Cell, EndOfLife, MaterialDef};
use crate::world::WorldRng;

/// Decides when a cell has outlived its material and what it leaves behind
pub struct LifecycleSystem;

impl LifecycleSystem {
    /// Age (already advanced for this tick) exceeds the lifespan
    pub fn is_expired(material: &MaterialDef, cell: Cell) -> bool {
        material.lifespan.is_some_and(|lifespan| cell.age > lifespan)
    }

    /// Product of an expiring cell, at age 0
    pub fn end_of_life<R: WorldRng>(material: &MaterialDef, rng: &mut R) -> Cell {
        match material.end_of_life {
            EndOfLife::Vanish => Cell::AIR,
            EndOfLife::Chance { into, probability } => {
                if rng.check_probability(probability) {
                    Cell::new(into)
                } else {
                    Cell::AIR
                }
            }
        }
    }

    /// Early expiry roll for a cell resting against the grid edge
    pub fn decays_at_boundary<R: WorldRng>(material: &MaterialDef, rng: &mut R) -> bool {
        material
            .boundary_decay
            .is_some_and(|probability| rng.check_probability(probability))
    }
}
