//! Next-state buffer written during a tick
//!
//! Every cell is one packed `AtomicU64` (see `Cell::pack`). All writes go
//! through compare-and-swap so that sequential and parallel scheduling share
//! the same protocol:
//!
//! - `lock`: open source -> locked source, held while its mover decides
//! - `claim`: open destination -> claimed new word, at most once per cell
//! - `finish`: the lock holder stores the final source word
//! - `release`: the lock holder restores the untouched source
//!
//! A claimed cell is never claimed again within the tick.

use glam::IVec2;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use super::CellLayer;
use crate::simulation::{Cell, cell_flags};

pub struct TickBuffer {
    width: usize,
    height: usize,
    words: Vec<AtomicU64>,
    /// Claimed writes per cell, only kept when auditing
    writers: Option<Vec<AtomicU32>>,
}

impl TickBuffer {
    /// Seed the buffer from the current layer, aging every occupied cell
    pub fn seeded_from(current: &CellLayer, audit: bool) -> Self {
        let words = (0..current.len())
            .map(|i| AtomicU64::new(current.cell_at(i).aged().pack()))
            .collect();
        let writers = audit.then(|| (0..current.len()).map(|_| AtomicU32::new(0)).collect());

        Self {
            width: current.width(),
            height: current.height(),
            words,
            writers,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    #[inline]
    fn index(&self, pos: IVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// Current word at a position (out of bounds reads as a claimed cell)
    pub fn load(&self, pos: IVec2) -> Cell {
        match self.index(pos) {
            Some(i) => Cell::unpack(self.words[i].load(Ordering::Acquire)),
            None => Cell::AIR.flagged(cell_flags::CLAIMED),
        }
    }

    fn swap(&self, pos: IVec2, expected: Cell, new: Cell) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        self.words[i]
            .compare_exchange(
                expected.pack(),
                new.pack(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn count_writer(&self, pos: IVec2) {
        if let (Some(writers), Some(i)) = (&self.writers, self.index(pos)) {
            writers[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take the source cell for its mover; fails if it changed since seeding
    pub fn lock(&self, pos: IVec2, expected: Cell) -> bool {
        self.swap(
            pos,
            expected.flagged(0),
            expected.flagged(cell_flags::LOCKED),
        )
    }

    /// Write `new` into an open cell still holding `expected`
    pub fn claim(&self, pos: IVec2, expected: Cell, new: Cell) -> bool {
        let won = self.swap(
            pos,
            expected.flagged(0),
            new.flagged(cell_flags::CLAIMED),
        );
        if won {
            self.count_writer(pos);
        } else {
            log::trace!("Lost claim at ({}, {})", pos.x, pos.y);
        }
        won
    }

    /// Store the final word of a locked source
    ///
    /// Vacated Air stays open so later movers can enter it; anything else
    /// written here is claimed for the rest of the tick.
    pub fn finish(&self, pos: IVec2, cell: Cell) {
        let Some(i) = self.index(pos) else {
            return;
        };
        let word = if cell.is_empty() {
            Cell::AIR
        } else {
            self.count_writer(pos);
            cell.flagged(cell_flags::CLAIMED)
        };
        self.words[i].store(word.pack(), Ordering::Release);
    }

    /// Unlock a source whose mover did nothing
    pub fn release(&self, pos: IVec2, original: Cell) {
        if let Some(i) = self.index(pos) {
            self.words[i].store(original.flagged(0).pack(), Ordering::Release);
        }
    }

    /// Highest number of claimed writes on any cell (0 when not auditing)
    pub fn max_writers(&self) -> u32 {
        self.writers
            .as_ref()
            .and_then(|w| w.iter().map(|c| c.load(Ordering::Relaxed)).max())
            .unwrap_or(0)
    }

    /// Drop the flags and turn the buffer into the next current layer
    pub fn into_layer(self) -> CellLayer {
        let (width, height) = (self.width, self.height);
        CellLayer::from_cells(
            width,
            height,
            self.words
                .into_iter()
                .map(|word| Cell::unpack(word.into_inner())),
        )
    }
}
