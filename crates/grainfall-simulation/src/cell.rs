//! Cell words
//!
//! A cell is the material id, its age in ticks and a few state flags. The
//! tick buffer stores cells packed into a single `u64` so that every write
//! can go through one compare-and-swap.

use crate::MaterialId;
use serde::{Deserialize, Serialize};

/// A single grid cell
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Material type (0 = air)
    pub material_id: u16,
    /// Ticks this material has existed (saturating)
    pub age: u16,
    /// Tick-local state flags (claimed, locked)
    #[serde(skip)]
    pub flags: u16,
}

impl Cell {
    pub const AIR: Cell = Cell {
        material_id: MaterialId::AIR,
        age: 0,
        flags: 0,
    };

    pub fn new(material_id: u16) -> Self {
        Self {
            material_id,
            age: 0,
            flags: 0,
        }
    }

    pub fn with_age(material_id: u16, age: u16) -> Self {
        Self {
            material_id,
            age,
            flags: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.material_id == MaterialId::AIR
    }

    pub fn is_claimed(&self) -> bool {
        self.flags & cell_flags::CLAIMED != 0
    }

    pub fn is_locked(&self) -> bool {
        self.flags & cell_flags::LOCKED != 0
    }

    /// Neither claimed nor locked
    pub fn is_open(&self) -> bool {
        self.flags & (cell_flags::CLAIMED | cell_flags::LOCKED) == 0
    }

    /// Same cell with the given flags replacing the current ones
    pub fn flagged(self, flags: u16) -> Self {
        Self { flags, ..self }
    }

    /// Age advanced by one tick; air never ages
    pub fn aged(self) -> Self {
        if self.is_empty() {
            return self;
        }
        Self {
            age: self.age.saturating_add(1),
            ..self
        }
    }

    #[inline]
    pub fn pack(self) -> u64 {
        self.material_id as u64 | (self.age as u64) << 16 | (self.flags as u64) << 32
    }

    #[inline]
    pub fn unpack(word: u64) -> Self {
        Self {
            material_id: word as u16,
            age: (word >> 16) as u16,
            flags: (word >> 32) as u16,
        }
    }
}

/// Flag bits for tick-local cell state
pub mod cell_flags {
    pub const CLAIMED: u16 = 1 << 0; // Written by a winning mover this tick
    pub const LOCKED: u16 = 1 << 1; // Source held by its mover while it decides
}
