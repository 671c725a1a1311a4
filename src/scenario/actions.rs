//! Scenario actions and regions

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// One step of a scenario. Materials are referenced by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioAction {
    /// Paint a filled circle of fresh cells
    Paint {
        x: i32,
        y: i32,
        material: String,
        #[serde(default)]
        radius: u32,
    },

    /// Paint a one-cell line between two points (both ends included)
    Line {
        from: IVec2,
        to: IVec2,
        material: String,
    },

    /// Fill a region
    Fill { region: Region, material: String },

    /// Advance the grid
    Tick { count: u64 },

    /// Write a message to the scenario log
    Log { message: String },
}

/// Spatial region of the grid (coordinates are inclusive and clipped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Region {
    /// Rectangular region
    Rect {
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
    },

    /// Circular region (Euclidean distance)
    Circle {
        center_x: i32,
        center_y: i32,
        radius: u32,
    },

    /// Entire grid
    Whole,
}

impl Region {
    /// In-grid positions covered by the region, row by row
    pub fn positions(&self, width: usize, height: usize) -> Vec<IVec2> {
        let max = IVec2::new(width as i32 - 1, height as i32 - 1);
        let (lo, hi) = match *self {
            Region::Rect {
                min_x,
                min_y,
                max_x,
                max_y,
            } => (
                IVec2::new(min_x.min(max_x), min_y.min(max_y)),
                IVec2::new(min_x.max(max_x), min_y.max(max_y)),
            ),
            Region::Circle {
                center_x,
                center_y,
                radius,
            } => {
                let r = radius as i32;
                (
                    IVec2::new(center_x - r, center_y - r),
                    IVec2::new(center_x + r, center_y + r),
                )
            }
            Region::Whole => (IVec2::ZERO, max),
        };
        let lo = lo.max(IVec2::ZERO);
        let hi = hi.min(max);

        let mut positions = Vec::new();
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                let pos = IVec2::new(x, y);
                if self.contains(pos) {
                    positions.push(pos);
                }
            }
        }
        positions
    }

    /// Whether `pos` lies in the region (ignoring grid bounds)
    pub fn contains(&self, pos: IVec2) -> bool {
        match *self {
            Region::Rect {
                min_x,
                min_y,
                max_x,
                max_y,
            } => {
                (min_x.min(max_x)..=min_x.max(max_x)).contains(&pos.x)
                    && (min_y.min(max_y)..=min_y.max(max_y)).contains(&pos.y)
            }
            Region::Circle {
                center_x,
                center_y,
                radius,
            } => {
                let d = pos - IVec2::new(center_x, center_y);
                let r = radius as i64;
                (d.x as i64).pow(2) + (d.y as i64).pow(2) <= r * r
            }
            Region::Whole => true,
        }
    }
}
