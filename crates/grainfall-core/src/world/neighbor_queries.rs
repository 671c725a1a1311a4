//! Neighbor density sampling

use glam::IVec2;

use super::CellLayer;
use crate::simulation::Materials;
use crate::world::WorldRng;

/// Offsets of the eight cells around a position
pub const NEIGHBORHOOD: [IVec2; 8] = [
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(1, 1),
    IVec2::new(-1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, -1),
];

/// Stateless queries against the current snapshot
pub struct NeighborQueries;

impl NeighborQueries {
    /// The eight positions around `pos`, Fisher-Yates shuffled
    ///
    /// Positions off the grid are included; callers skip them.
    pub fn shuffled_neighborhood<R: WorldRng>(pos: IVec2, rng: &mut R) -> [IVec2; 8] {
        let mut cells = NEIGHBORHOOD.map(|offset| pos + offset);
        for i in (1..cells.len()).rev() {
            cells.swap(i, rng.gen_index(i + 1));
        }
        cells
    }

    /// The three cells one step in the travel direction
    ///
    /// Order: straight, left, right
    pub fn travel_neighbors(pos: IVec2, dir: i32) -> [IVec2; 3] {
        [
            IVec2::new(pos.x, pos.y + dir),
            IVec2::new(pos.x - 1, pos.y + dir),
            IVec2::new(pos.x + 1, pos.y + dir),
        ]
    }

    /// Mean density of the in-bounds travel neighbors
    ///
    /// Returns None when none of them is inside the grid, i.e. the cell rests
    /// against the grid edge.
    pub fn surrounding_density(
        current: &CellLayer,
        materials: &Materials,
        pos: IVec2,
        dir: i32,
    ) -> Option<f32> {
        let mut total = 0.0;
        let mut count = 0;

        for neighbor in Self::travel_neighbors(pos, dir) {
            if let Some(material) = current.material(neighbor) {
                total += materials.get(material).density;
                count += 1;
            }
        }

        (count > 0).then(|| total / count as f32)
    }
}
