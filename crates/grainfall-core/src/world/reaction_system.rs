//! Pairwise reaction resolution

use glam::IVec2;

use super::TickContext;
use super::neighbor_queries::NeighborQueries;
use crate::simulation::{Cell, Materials, ReactionOutcome};
use crate::world::{SimStats, WorldRng};

/// Combines the rules of both materials and writes the products
pub struct ReactionSystem;

impl ReactionSystem {
    /// Outcome of `mover` entering a cell held by `occupant`
    ///
    /// Both materials' rules are consulted. When both fire and disagree, a
    /// coin flip picks one.
    pub fn resolve<R: WorldRng>(
        materials: &Materials,
        mover: u16,
        occupant: u16,
        rng: &mut R,
    ) -> ReactionOutcome {
        let forward = materials.react(mover, occupant);
        let backward = materials.react(occupant, mover);

        match (forward.is_unchanged(), backward.is_unchanged()) {
            (false, false) if forward != backward => {
                if rng.gen_bool() {
                    forward
                } else {
                    backward
                }
            }
            (false, _) => forward,
            _ => backward,
        }
    }

    /// React a locked source with the open occupant at `dst`
    ///
    /// Returns true when the products were written. The caller still owns
    /// the source lock when this returns false.
    pub fn try_react<R: WorldRng>(
        ctx: &TickContext,
        src: IVec2,
        mover: Cell,
        dst: IVec2,
        occupant: Cell,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        if occupant.is_empty() || !occupant.is_open() {
            return false;
        }

        let outcome = Self::resolve(ctx.materials, mover.material_id, occupant.material_id, rng);
        let Some((dst_product, src_product)) = outcome.products() else {
            return false;
        };

        if !ctx.next.claim(dst, occupant, Cell::new(dst_product)) {
            stats.record_lost_claim();
            return false;
        }
        ctx.next.finish(src, Cell::new(src_product));
        true
    }

    /// React a locked source with what `dst` held at the start of the tick
    ///
    /// The claim only goes through while that occupant is still unmoved and
    /// unwritten in the next buffer.
    pub fn try_react_with_snapshot<R: WorldRng>(
        ctx: &TickContext,
        src: IVec2,
        mover: Cell,
        dst: IVec2,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        match ctx.current.get(dst) {
            Some(occupant) if !occupant.is_empty() => {
                Self::try_react(ctx, src, mover, dst, occupant.aged(), rng, stats)
            }
            _ => false,
        }
    }

    /// Contact reaction with the first reacting neighbor, in random order
    pub fn react_with_neighbors<R: WorldRng>(
        ctx: &TickContext,
        pos: IVec2,
        cell: Cell,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        NeighborQueries::shuffled_neighborhood(pos, rng)
            .into_iter()
            .any(|neighbor| Self::try_react_with_snapshot(ctx, pos, cell, neighbor, rng, stats))
    }
}
