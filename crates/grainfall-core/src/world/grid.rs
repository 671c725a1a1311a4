//! Grid - the cell layer, its materials and the tick loop

use glam::IVec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use super::scheduler::TickScheduler;
use super::{CellLayer, SimConfig, TickStats};
use crate::simulation::{Cell, MaterialId, Materials};

/// Largest width or height a grid may have
pub const MAX_GRID_SIDE: usize = u16::MAX as usize;

/// Errors reported by grid construction and painting
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid grid size {width}x{height} (each side must be 1..={max})", max = MAX_GRID_SIDE)]
    InvalidDimensions { width: usize, height: usize },

    #[error("unknown material id {0}")]
    UnknownMaterial(u16),

    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
}

/// A falling-sand grid
pub struct Grid {
    cells: CellLayer,
    materials: Arc<Materials>,
    config: SimConfig,
    rng: Xoshiro256StarStar,
    seed: u64,
    tick_count: u64,
}

impl Grid {
    /// All-Air grid with the default materials and an entropy seed
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::with_config(
            width,
            height,
            Arc::new(Materials::new()),
            SimConfig::default(),
        )
    }

    pub fn with_config(
        width: usize,
        height: usize,
        materials: Arc<Materials>,
        config: SimConfig,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 || width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
            return Err(GridError::InvalidDimensions { width, height });
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!(
            "Created {}x{} grid (seed {}, {} materials, {})",
            width,
            height,
            seed,
            materials.len(),
            if config.parallel {
                "parallel"
            } else {
                "sequential"
            }
        );

        Ok(Self {
            cells: CellLayer::new(width, height),
            materials,
            config,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            seed,
            tick_count: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// Seed actually used (drawn from entropy if none was configured)
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn materials(&self) -> &Arc<Materials> {
        &self.materials
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Read-only view of the current cells
    pub fn cells(&self) -> &CellLayer {
        &self.cells
    }

    /// Switch between sequential and parallel scheduling
    pub fn set_parallel(&mut self, parallel: bool) {
        self.config.parallel = parallel;
    }

    /// Advance the grid by one tick
    pub fn tick(&mut self) -> TickStats {
        let (next, stats) =
            TickScheduler::run(&self.cells, &self.materials, &self.config, &mut self.rng);
        self.cells = next;
        self.tick_count += 1;

        log::debug!(
            "Tick {}: {} moves, {} displacements, {} reactions, {} spreads, {} expirations",
            self.tick_count,
            stats.moves,
            stats.displacements,
            stats.reactions,
            stats.spreads,
            stats.expirations
        );
        stats
    }

    /// Paint a filled circle of fresh cells (age 0)
    ///
    /// Every in-bounds cell within Euclidean `radius` of the center is set;
    /// returns how many were. Painting Air erases.
    pub fn paint(&mut self, x: i32, y: i32, material: u16, radius: u32) -> Result<usize, GridError> {
        self.check_material(material)?;

        // Only offsets that land inside the grid are visited
        let r = radius as i64;
        let (x, y) = (x as i64, y as i64);
        let (w, h) = (self.width() as i64, self.height() as i64);
        let r_sq = radius as u64 * radius as u64;

        let mut painted = 0;
        for dy in (-r).max(-y)..=r.min(h - 1 - y) {
            for dx in (-r).max(-x)..=r.min(w - 1 - x) {
                if dx.unsigned_abs().pow(2) + dy.unsigned_abs().pow(2) > r_sq {
                    continue;
                }
                let pos = IVec2::new((x + dx) as i32, (y + dy) as i32);
                if self.cells.set(pos, Cell::new(material)) {
                    painted += 1;
                }
            }
        }
        Ok(painted)
    }

    /// Fill an axis-aligned rectangle (inclusive corners, clipped to the grid)
    pub fn fill_rect(
        &mut self,
        min: IVec2,
        max: IVec2,
        material: u16,
    ) -> Result<usize, GridError> {
        self.check_material(material)?;

        let lo = self.cells.clamp(min.min(max));
        let hi = self.cells.clamp(min.max(max));
        let mut painted = 0;
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                if self.cells.set(IVec2::new(x, y), Cell::new(material)) {
                    painted += 1;
                }
            }
        }
        Ok(painted)
    }

    /// Place a cell with an explicit age
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) -> Result<(), GridError> {
        self.check_material(cell.material_id)?;
        if self.cells.set(IVec2::new(x, y), cell.flagged(0)) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds { x, y })
        }
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.cells.get(IVec2::new(x, y))
    }

    pub fn material_at(&self, x: i32, y: i32) -> Option<u16> {
        self.cells.material(IVec2::new(x, y))
    }

    /// Number of cells holding `material`
    pub fn count(&self, material: u16) -> usize {
        self.cells.materials().iter().filter(|&&m| m == material).count()
    }

    pub fn non_air_count(&self) -> usize {
        self.cells
            .materials()
            .iter()
            .filter(|&&m| m != MaterialId::AIR)
            .count()
    }

    /// Cell count per material id, Air included
    pub fn histogram(&self) -> BTreeMap<u16, usize> {
        let mut histogram = BTreeMap::new();
        for &material in self.cells.materials() {
            *histogram.entry(material).or_insert(0) += 1;
        }
        histogram
    }

    fn check_material(&self, material: u16) -> Result<(), GridError> {
        if self.materials.contains(material) {
            Ok(())
        } else {
            Err(GridError::UnknownMaterial(material))
        }
    }
}
