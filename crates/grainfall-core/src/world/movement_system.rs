//! Movement resolution - falling, rising, displacement and diagonal fallback

use glam::IVec2;
use std::f32::consts::PI;

use super::TickContext;
use super::lifecycle_system::LifecycleSystem;
use super::neighbor_queries::NeighborQueries;
use super::reaction_system::ReactionSystem;
use crate::simulation::{Cell, MaterialDef};
use crate::world::{SimStats, WorldRng};

/// What happened to one source cell in the movement pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellOutcome {
    /// Air, or already relocated by another mover this tick
    Skipped,
    /// Solid material; only ages
    Static,
    /// Reached its end of life
    Expired,
    /// Moved into Air
    Moved,
    /// Swapped with a lighter fluid
    Displaced,
    /// A reaction rewrote the source and the destination
    Reacted,
    /// Not heavier than its surroundings
    Rested { spreads: bool },
    /// Tried to move but every option was taken
    Blocked { spreads: bool },
}

impl CellOutcome {
    /// Stayed in its row as a fluid that levels out, so the spread pass
    /// gets a turn
    pub fn spreads(&self) -> bool {
        matches!(
            self,
            CellOutcome::Rested { spreads: true } | CellOutcome::Blocked { spreads: true }
        )
    }
}

/// Resolves where a cell goes this tick
pub struct MovementSystem;

impl MovementSystem {
    /// Cells travelled in one tick, from the density ratio to the surroundings
    pub fn fall_distance(material: &MaterialDef, surrounding: f32) -> i32 {
        let ratio = if material.buoyant {
            surrounding / material.density
        } else {
            material.density / surrounding
        };
        let distance = (1.0 + 2.0 * (ratio - 1.0).atan() / PI).round() as i32;
        distance.max(1)
    }

    /// Whether `mover` may swap places with `occupant`
    ///
    /// Only fluids are displaced, and only when lighter than the mover (or
    /// denser, for a buoyant mover).
    pub fn can_displace(mover: &MaterialDef, occupant: &MaterialDef) -> bool {
        if !occupant.is_fluid() {
            return false;
        }
        if mover.buoyant {
            occupant.density > mover.density
        } else {
            occupant.density < mover.density
        }
    }

    /// Run the movement pass for the cell at `pos`
    pub fn update_cell<R: WorldRng>(
        ctx: &TickContext,
        pos: IVec2,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> CellOutcome {
        let outcome = Self::resolve(ctx, pos, rng, stats);
        match outcome {
            CellOutcome::Moved => stats.record_move(),
            CellOutcome::Displaced => stats.record_displacement(),
            CellOutcome::Reacted => stats.record_reaction(),
            CellOutcome::Expired => stats.record_expiry(),
            _ => {}
        }
        outcome
    }

    fn resolve<R: WorldRng>(
        ctx: &TickContext,
        pos: IVec2,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> CellOutcome {
        let Some(cell) = ctx.current.get(pos) else {
            return CellOutcome::Skipped;
        };
        if cell.is_empty() {
            return CellOutcome::Skipped;
        }

        // The buffer was seeded with aged cells; anything else means a mover
        // already took this one
        let cell = cell.aged();
        if !ctx.next.lock(pos, cell) {
            return CellOutcome::Skipped;
        }

        let material = ctx.materials.get(cell.material_id);

        if LifecycleSystem::is_expired(material, cell) {
            return Self::expire(ctx, pos, material, rng);
        }

        if material.is_solid() {
            ctx.next.release(pos, cell);
            return CellOutcome::Static;
        }

        // Contact with any unmoved neighbor reacts before the cell goes anywhere
        if ReactionSystem::react_with_neighbors(ctx, pos, cell, rng, stats) {
            return CellOutcome::Reacted;
        }

        let dir = material.travel_dir();
        let Some(surrounding) =
            NeighborQueries::surrounding_density(ctx.current, ctx.materials, pos, dir)
        else {
            // Resting against the grid edge
            if LifecycleSystem::decays_at_boundary(material, rng) {
                return Self::expire(ctx, pos, material, rng);
            }
            return Self::rest(ctx, pos, cell, material);
        };

        if !material.moves_through(surrounding) {
            return Self::rest(ctx, pos, cell, material);
        }

        let fall = Self::fall_distance(material, surrounding);
        let dx = rng.gen_index(3) as i32 - 1;
        let target = ctx.current.clamp(pos + IVec2::new(dx, fall * dir));
        if target == pos {
            return Self::rest(ctx, pos, cell, material);
        }

        // What sat at the target when the tick began, then whatever landed there since
        if ReactionSystem::try_react_with_snapshot(ctx, pos, cell, target, rng, stats)
            || ReactionSystem::try_react(ctx, pos, cell, target, ctx.next.load(target), rng, stats)
        {
            return CellOutcome::Reacted;
        }
        if let Some(outcome) = Self::try_enter(ctx, pos, cell, material, target, stats) {
            return outcome;
        }

        let side = if rng.gen_bool() { -1 } else { 1 };
        for dx in [side, -side] {
            let diagonal = pos + IVec2::new(dx, dir);
            if !ctx.next.in_bounds(diagonal) {
                continue;
            }
            if let Some(outcome) = Self::try_enter(ctx, pos, cell, material, diagonal, stats) {
                return outcome;
            }
        }

        ctx.next.release(pos, cell);
        CellOutcome::Blocked {
            spreads: material.levels_out(),
        }
    }

    /// Move a locked source into Air or swap it with a displaceable fluid
    ///
    /// No reactions are considered. On success the source is finished and
    /// the lock is gone; on failure the caller still holds it.
    pub fn try_enter(
        ctx: &TickContext,
        src: IVec2,
        mover: Cell,
        material: &MaterialDef,
        dst: IVec2,
        stats: &mut dyn SimStats,
    ) -> Option<CellOutcome> {
        let occupant = ctx.next.load(dst);
        if !occupant.is_open() {
            return None;
        }

        let outcome = if occupant.is_empty() {
            CellOutcome::Moved
        } else if Self::can_displace(material, ctx.materials.get(occupant.material_id)) {
            CellOutcome::Displaced
        } else {
            return None;
        };

        if !ctx.next.claim(dst, occupant, mover) {
            stats.record_lost_claim();
            return None;
        }
        ctx.next.finish(src, occupant);
        Some(outcome)
    }

    fn rest(ctx: &TickContext, pos: IVec2, cell: Cell, material: &MaterialDef) -> CellOutcome {
        ctx.next.release(pos, cell);
        CellOutcome::Rested {
            spreads: material.levels_out(),
        }
    }

    fn expire<R: WorldRng>(
        ctx: &TickContext,
        pos: IVec2,
        material: &MaterialDef,
        rng: &mut R,
    ) -> CellOutcome {
        let product = LifecycleSystem::end_of_life(material, rng);
        ctx.next.finish(pos, product);
        CellOutcome::Expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{MaterialId, Materials};
    use crate::world::{CellLayer, TickBuffer, TickStats};

    /// Test RNG that returns deterministic values
    struct TestRng {
        bool_value: bool,
        f32_value: f32,
    }

    impl TestRng {
        /// `f32_value` 0.5 makes `gen_index(3)` pick the middle, i.e. no drift
        fn straight() -> Self {
            Self {
                bool_value: true,
                f32_value: 0.5,
            }
        }
    }

    impl WorldRng for TestRng {
        fn gen_bool(&mut self) -> bool {
            self.bool_value
        }

        fn gen_f32(&mut self) -> f32 {
            self.f32_value
        }
    }

    fn layer_with(width: usize, height: usize, cells: &[(i32, i32, u16)]) -> CellLayer {
        let mut layer = CellLayer::new(width, height);
        for &(x, y, material) in cells {
            layer.set(IVec2::new(x, y), Cell::new(material));
        }
        layer
    }

    fn run_cell(
        layer: &CellLayer,
        materials: &Materials,
        pos: IVec2,
        rng: &mut TestRng,
    ) -> (CellOutcome, CellLayer, TickStats) {
        let next = TickBuffer::seeded_from(layer, false);
        let ctx = TickContext {
            current: layer,
            next: &next,
            materials,
        };
        let mut stats = TickStats::default();
        let outcome = MovementSystem::update_cell(&ctx, pos, rng, &mut stats);
        (outcome, next.into_layer(), stats)
    }

    #[test]
    fn test_fall_distance_grows_with_density_ratio() {
        let materials = Materials::new();
        let sand = materials.get(MaterialId::SAND);
        let stone = materials.get(MaterialId::STONE);

        // sand over water: ratio 1.5 -> 1 + 0.295 rounds to 1
        assert_eq!(MovementSystem::fall_distance(sand, 1.0), 1);
        // stone over air: ratio 1000 -> approaches 2
        assert_eq!(MovementSystem::fall_distance(stone, 0.1), 2);
        // never below one
        assert_eq!(MovementSystem::fall_distance(sand, 100.0), 1);
    }

    #[test]
    fn test_steam_rise_distance() {
        let materials = Materials::new();
        let steam = materials.get(MaterialId::STEAM);
        // steam under water: ratio 20
        assert_eq!(MovementSystem::fall_distance(steam, 1.0), 2);
        assert_eq!(MovementSystem::fall_distance(steam, 0.06), 1);
    }

    #[test]
    fn test_sand_falls_into_air() {
        let materials = Materials::new();
        let layer = layer_with(3, 5, &[(1, 1, MaterialId::SAND)]);

        let (outcome, next, stats) =
            run_cell(&layer, &materials, IVec2::new(1, 1), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Moved);
        assert_eq!(next.material(IVec2::new(1, 1)), Some(MaterialId::AIR));
        // ratio 15 over air rounds to a two-cell fall
        assert_eq!(next.get(IVec2::new(1, 3)), Some(Cell::with_age(MaterialId::SAND, 1)));
        assert_eq!(stats.moves, 1);
    }

    #[test]
    fn test_sand_rests_on_stone() {
        let materials = Materials::new();
        let layer = layer_with(
            3,
            3,
            &[
                (1, 1, MaterialId::SAND),
                (0, 2, MaterialId::STONE),
                (1, 2, MaterialId::STONE),
                (2, 2, MaterialId::STONE),
            ],
        );

        let (outcome, next, _) =
            run_cell(&layer, &materials, IVec2::new(1, 1), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Rested { spreads: false });
        assert_eq!(next.material(IVec2::new(1, 1)), Some(MaterialId::SAND));
    }

    #[test]
    fn test_mud_sinks_through_water() {
        let materials = Materials::new();
        let layer = layer_with(1, 2, &[(0, 0, MaterialId::MUD), (0, 1, MaterialId::WATER)]);

        let (outcome, next, stats) =
            run_cell(&layer, &materials, IVec2::new(0, 0), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Displaced);
        assert_eq!(next.material(IVec2::new(0, 0)), Some(MaterialId::WATER));
        assert_eq!(next.material(IVec2::new(0, 1)), Some(MaterialId::MUD));
        assert_eq!(stats.displacements, 1);
    }

    #[test]
    fn test_falling_water_reacts_with_lava() {
        let materials = Materials::new();
        let layer = layer_with(1, 3, &[(0, 0, MaterialId::WATER), (0, 2, MaterialId::LAVA)]);

        // Water over air falls 2 and lands on the lava
        let (outcome, next, stats) =
            run_cell(&layer, &materials, IVec2::new(0, 0), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Reacted);
        assert_eq!(next.material(IVec2::new(0, 2)), Some(MaterialId::STONE));
        assert_eq!(next.get(IVec2::new(0, 0)), Some(Cell::new(MaterialId::STEAM)));
        assert_eq!(stats.reactions, 1);
    }

    #[test]
    fn test_blocked_cell_slides_to_open_diagonal() {
        let materials = Materials::new();
        // Sand over sand in a two-row grid; the diagonals below are air
        let layer = layer_with(3, 2, &[(1, 0, MaterialId::SAND), (1, 1, MaterialId::SAND)]);

        // Mean below is (1.5 + 0.1 + 0.1) / 3, so the top sand tries to fall,
        // finds sand straight below and takes the left diagonal first
        let (outcome, next, _) =
            run_cell(&layer, &materials, IVec2::new(1, 0), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Moved);
        assert_eq!(next.material(IVec2::new(0, 1)), Some(MaterialId::SAND));
        assert_eq!(next.material(IVec2::new(1, 0)), Some(MaterialId::AIR));
    }

    #[test]
    fn test_blocked_when_targets_taken() {
        let materials = Materials::new();
        let layer = layer_with(3, 2, &[(1, 0, MaterialId::SAND)]);
        let next = TickBuffer::seeded_from(&layer, false);
        let ctx = TickContext {
            current: &layer,
            next: &next,
            materials: &materials,
        };

        // Other movers already landed in every cell below
        for x in 0..3 {
            assert!(next.claim(IVec2::new(x, 1), Cell::AIR, Cell::new(MaterialId::WATER)));
        }

        let mut stats = TickStats::default();
        let src = IVec2::new(1, 0);
        let outcome = MovementSystem::update_cell(&ctx, src, &mut TestRng::straight(), &mut stats);

        assert_eq!(outcome, CellOutcome::Blocked { spreads: false });
        assert!(!outcome.spreads());
        assert!(next.load(src).is_open());
        assert_eq!(next.load(src).material_id, MaterialId::SAND);
        assert_eq!(stats.changes(), 0);
    }

    #[test]
    fn test_blocked_fluid_still_spreads() {
        let materials = Materials::new();
        let layer = layer_with(3, 2, &[(1, 0, MaterialId::WATER)]);
        let next = TickBuffer::seeded_from(&layer, false);
        let ctx = TickContext {
            current: &layer,
            next: &next,
            materials: &materials,
        };

        for x in 0..3 {
            assert!(next.claim(IVec2::new(x, 1), Cell::AIR, Cell::new(MaterialId::SAND)));
        }

        let outcome = MovementSystem::update_cell(
            &ctx,
            IVec2::new(1, 0),
            &mut TestRng::straight(),
            &mut TickStats::default(),
        );

        // Never changed row, so it is offered to the spread pass
        assert_eq!(outcome, CellOutcome::Blocked { spreads: true });
        assert!(outcome.spreads());
    }

    #[test]
    fn test_wall_never_moves() {
        let materials = Materials::new();
        let layer = layer_with(3, 3, &[(1, 0, MaterialId::WALL)]);

        let (outcome, next, _) =
            run_cell(&layer, &materials, IVec2::new(1, 0), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Static);
        assert_eq!(next.get(IVec2::new(1, 0)), Some(Cell::with_age(MaterialId::WALL, 1)));
    }

    #[test]
    fn test_resting_water_reacts_with_lava_below() {
        let materials = Materials::new();
        let layer = layer_with(
            3,
            2,
            &[
                (1, 0, MaterialId::WATER),
                (0, 1, MaterialId::LAVA),
                (1, 1, MaterialId::LAVA),
                (2, 1, MaterialId::LAVA),
            ],
        );

        let (outcome, next, _) =
            run_cell(&layer, &materials, IVec2::new(1, 0), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Reacted);
        assert_eq!(next.material(IVec2::new(1, 1)), Some(MaterialId::STONE));
        assert_eq!(next.material(IVec2::new(1, 0)), Some(MaterialId::STEAM));
    }

    #[test]
    fn test_resting_lava_reacts_with_diagonal_water() {
        let materials = Materials::new();
        // Lava on the floor; the water touches it only at a corner
        let layer = layer_with(3, 2, &[(1, 1, MaterialId::LAVA), (2, 0, MaterialId::WATER)]);

        let (outcome, next, stats) =
            run_cell(&layer, &materials, IVec2::new(1, 1), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Reacted);
        assert_eq!(next.material(IVec2::new(2, 0)), Some(MaterialId::STONE));
        assert_eq!(next.material(IVec2::new(1, 1)), Some(MaterialId::STEAM));
        assert_eq!(stats.reactions, 1);
    }

    #[test]
    fn test_falling_lava_reacts_with_water_above_before_moving() {
        let materials = Materials::new();
        let layer = layer_with(1, 5, &[(0, 1, MaterialId::WATER), (0, 2, MaterialId::LAVA)]);

        let (outcome, next, _) =
            run_cell(&layer, &materials, IVec2::new(0, 2), &mut TestRng::straight());

        assert_eq!(outcome, CellOutcome::Reacted);
        assert_eq!(next.material(IVec2::new(0, 1)), Some(MaterialId::STONE));
        assert_eq!(next.material(IVec2::new(0, 2)), Some(MaterialId::STEAM));
        assert_eq!(next.material(IVec2::new(0, 4)), Some(MaterialId::AIR));
    }

    #[test]
    fn test_steam_at_ceiling_rests_in_place() {
        let materials = Materials::new();
        let layer = layer_with(3, 3, &[(1, 0, MaterialId::STEAM)]);
        // 0.5 is above the 0.1 boundary decay chance
        let (outcome, next, _) =
            run_cell(&layer, &materials, IVec2::new(1, 0), &mut TestRng::straight());

        // Steam does not level out
        assert_eq!(outcome, CellOutcome::Rested { spreads: false });
        assert_eq!(next.material(IVec2::new(1, 0)), Some(MaterialId::STEAM));
    }

    #[test]
    fn test_steam_at_ceiling_can_decay() {
        let materials = Materials::new();
        let layer = layer_with(3, 3, &[(1, 0, MaterialId::STEAM)]);
        let mut rng = TestRng {
            bool_value: true,
            f32_value: 0.05,
        };

        let (outcome, next, stats) = run_cell(&layer, &materials, IVec2::new(1, 0), &mut rng);

        assert_eq!(outcome, CellOutcome::Expired);
        // 0.05 is also below the 0.2 condensation chance
        assert_eq!(next.material(IVec2::new(1, 0)), Some(MaterialId::WATER));
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_relocated_source_is_skipped() {
        let materials = Materials::new();
        let layer = layer_with(1, 2, &[(0, 0, MaterialId::SAND)]);
        let next = TickBuffer::seeded_from(&layer, false);
        let ctx = TickContext {
            current: &layer,
            next: &next,
            materials: &materials,
        };

        // Someone else already wrote over the source
        let src = IVec2::new(0, 0);
        assert!(next.claim(src, next.load(src), Cell::new(MaterialId::WATER)));

        let outcome =
            MovementSystem::update_cell(&ctx, src, &mut TestRng::straight(), &mut TickStats::default());
        assert_eq!(outcome, CellOutcome::Skipped);
    }
}
