//! Current-state cell storage
//!
//! Materials and ages live in two parallel arrays, row-major with the origin
//! at the top-left and y growing downward.

use glam::IVec2;

use crate::simulation::Cell;

/// Snapshot of every cell in the grid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellLayer {
    width: usize,
    height: usize,
    materials: Vec<u16>,
    ages: Vec<u16>,
}

impl CellLayer {
    /// All-Air layer
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            materials: vec![0; width * height],
            ages: vec![0; width * height],
        }
    }

    /// Build a layer from row-major cells (flags are dropped)
    pub fn from_cells(width: usize, height: usize, cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut layer = Self::new(width, height);
        for (i, cell) in cells.into_iter().take(width * height).enumerate() {
            layer.materials[i] = cell.material_id;
            layer.ages[i] = cell.age;
        }
        layer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Row-major index of an in-bounds position
    #[inline]
    pub fn index(&self, pos: IVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// Position of a row-major index
    #[inline]
    pub fn position(&self, index: usize) -> IVec2 {
        IVec2::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Clamp a position into the grid
    pub fn clamp(&self, pos: IVec2) -> IVec2 {
        pos.clamp(
            IVec2::ZERO,
            IVec2::new(self.width as i32 - 1, self.height as i32 - 1),
        )
    }

    pub fn get(&self, pos: IVec2) -> Option<Cell> {
        self.index(pos)
            .map(|i| Cell::with_age(self.materials[i], self.ages[i]))
    }

    pub fn material(&self, pos: IVec2) -> Option<u16> {
        self.index(pos).map(|i| self.materials[i])
    }

    /// Write a cell; returns false when out of bounds
    pub fn set(&mut self, pos: IVec2, cell: Cell) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.materials[i] = cell.material_id;
                self.ages[i] = cell.age;
                true
            }
            None => false,
        }
    }

    pub fn materials(&self) -> &[u16] {
        &self.materials
    }

    pub fn ages(&self) -> &[u16] {
        &self.ages
    }

    /// Cell at a row-major index
    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::with_age(self.materials[index], self.ages[index])
    }

    /// Every cell in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, Cell)> + '_ {
        (0..self.len()).map(|i| (self.position(i), self.cell_at(i)))
    }
}
