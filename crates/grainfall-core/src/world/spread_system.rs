//! Sideways fluid spreading, run after the movement pass

use glam::IVec2;

use super::TickContext;
use super::movement_system::MovementSystem;
use super::neighbor_queries::NeighborQueries;
use crate::simulation::{BOUNDARY_DENSITY, Cell, GRAVITY, MaterialDef};
use crate::world::{SimStats, WorldRng};

/// Levels out fluids that stayed in their row during the movement pass
pub struct FluidSpreadSystem;

impl FluidSpreadSystem {
    /// Largest sideways offset a resting fluid may pick (at least 1)
    pub fn reach(material: &MaterialDef, surrounding: f32) -> usize {
        let reach = (material.density / surrounding * (1.0 - material.viscosity) * GRAVITY).floor();
        // NaN and negatives saturate to 0
        (reach as usize).max(1)
    }

    /// Try to move a fluid sideways
    ///
    /// `cell` is the word the fluid left in the next buffer when it rested
    /// or gave up on falling. If anything replaced it since, the fluid was
    /// displaced and does not spread. Returns true when the fluid moved.
    pub fn spread_cell<R: WorldRng>(
        ctx: &TickContext,
        pos: IVec2,
        cell: Cell,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        if !ctx.next.lock(pos, cell) {
            return false;
        }

        let material = ctx.materials.get(cell.material_id);
        if rng.check_probability(material.viscosity) {
            ctx.next.release(pos, cell);
            return false;
        }

        let surrounding =
            NeighborQueries::surrounding_density(ctx.current, ctx.materials, pos, material.travel_dir())
                .unwrap_or(BOUNDARY_DENSITY);
        // A near-zero surrounding density must not push the jump past the grid
        let reach = Self::reach(material, surrounding).min(ctx.current.width());
        let distance = 1 + rng.gen_index(reach) as i32;

        let side = if rng.gen_bool() { -1 } else { 1 };
        for dx in [side, -side] {
            let target = pos + IVec2::new(dx * distance, 0);
            if !ctx.next.in_bounds(target) {
                continue;
            }
            if MovementSystem::try_enter(ctx, pos, cell, material, target, stats).is_some() {
                stats.record_spread();
                return true;
            }
        }

        ctx.next.release(pos, cell);
        false
    }
}
