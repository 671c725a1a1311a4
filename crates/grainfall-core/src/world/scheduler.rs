//! Tick scheduling - sequential scan or rayon rows, both over the same
//! claim-based next buffer

use glam::IVec2;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;

use super::movement_system::MovementSystem;
use super::spread_system::FluidSpreadSystem;
use super::{CellLayer, SimConfig, TickBuffer, TickStats};
use crate::simulation::{Cell, Materials};
use crate::world::{SimStats, WorldRng};

const MOVEMENT_PASS: u64 = 0;
const SPREAD_PASS: u64 = 1;

/// Everything a resolver may touch during a tick
///
/// `current` is read-only; every write goes through `next`.
pub struct TickContext<'a> {
    pub current: &'a CellLayer,
    pub next: &'a TickBuffer,
    pub materials: &'a Materials,
}

/// Fluids that stayed in their row this tick, with the word they left behind
type SpreadQueue = Vec<(IVec2, Cell)>;

/// Runs both passes of a tick
pub struct TickScheduler;

impl TickScheduler {
    /// Compute the next layer from `current`
    pub fn run(
        current: &CellLayer,
        materials: &Materials,
        config: &SimConfig,
        rng: &mut Xoshiro256StarStar,
    ) -> (CellLayer, TickStats) {
        let next = TickBuffer::seeded_from(current, config.audit_claims);
        let ctx = TickContext {
            current,
            next: &next,
            materials,
        };

        let mut stats = if config.parallel {
            Self::run_parallel(&ctx, rng.next_u64())
        } else {
            Self::run_sequential(&ctx, rng)
        };
        stats.max_writers = next.max_writers();

        (next.into_layer(), stats)
    }

    /// Bottom row first, left to right, one RNG stream
    fn run_sequential<R: WorldRng>(ctx: &TickContext, rng: &mut R) -> TickStats {
        let mut stats = TickStats::default();
        let mut queue = SpreadQueue::new();

        for y in (0..ctx.current.height()).rev() {
            Self::movement_row(ctx, y, rng, &mut stats, &mut queue);
        }
        for (pos, cell) in queue {
            FluidSpreadSystem::spread_cell(ctx, pos, cell, rng, &mut stats);
        }

        stats
    }

    /// Rows in parallel, one RNG per row and pass
    ///
    /// The spread pass starts only after every row finished moving.
    fn run_parallel(ctx: &TickContext, tick_seed: u64) -> TickStats {
        let rows: Vec<(TickStats, SpreadQueue)> = (0..ctx.current.height())
            .into_par_iter()
            .map(|y| {
                let mut rng = Self::row_rng(tick_seed, y, MOVEMENT_PASS);
                let mut stats = TickStats::default();
                let mut queue = SpreadQueue::new();
                Self::movement_row(ctx, y, &mut rng, &mut stats, &mut queue);
                (stats, queue)
            })
            .collect();

        let mut stats = TickStats::default();
        let queues: Vec<(usize, SpreadQueue)> = rows
            .into_iter()
            .enumerate()
            .map(|(y, (row_stats, queue))| {
                stats.merge(&row_stats);
                (y, queue)
            })
            .collect();

        let spread_stats: Vec<TickStats> = queues
            .into_par_iter()
            .map(|(y, queue)| {
                let mut rng = Self::row_rng(tick_seed, y, SPREAD_PASS);
                let mut stats = TickStats::default();
                for (pos, cell) in queue {
                    FluidSpreadSystem::spread_cell(ctx, pos, cell, &mut rng, &mut stats);
                }
                stats
            })
            .collect();

        for row_stats in &spread_stats {
            stats.merge(row_stats);
        }
        stats
    }

    fn movement_row<R: WorldRng>(
        ctx: &TickContext,
        y: usize,
        rng: &mut R,
        stats: &mut dyn SimStats,
        queue: &mut SpreadQueue,
    ) {
        for x in 0..ctx.current.width() {
            let pos = IVec2::new(x as i32, y as i32);
            let Some(cell) = ctx.current.get(pos) else {
                continue;
            };
            if cell.is_empty() {
                continue;
            }

            if MovementSystem::update_cell(ctx, pos, rng, stats).spreads() {
                queue.push((pos, cell.aged()));
            }
        }
    }

    fn row_rng(tick_seed: u64, y: usize, pass: u64) -> Xoshiro256StarStar {
        let stream = (((y as u64) << 1) | pass).wrapping_add(1);
        Xoshiro256StarStar::seed_from_u64(tick_seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}
