//! Simulation statistics collection

use serde::{Deserialize, Serialize};

/// Trait for collecting simulation statistics
///
/// The resolvers record what they did through this trait so callers can
/// choose between counting (`TickStats`) and ignoring (`NoopStats`).
pub trait SimStats {
    /// A cell moved into Air
    fn record_move(&mut self);

    /// A cell swapped places with a lighter fluid
    fn record_displacement(&mut self);

    /// A reaction rule rewrote two cells
    fn record_reaction(&mut self);

    /// A fluid moved sideways in the spread pass
    fn record_spread(&mut self);

    /// A cell reached its end of life
    fn record_expiry(&mut self);

    /// A compare-and-swap on the next buffer failed
    fn record_lost_claim(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_move(&mut self) {}
    fn record_displacement(&mut self) {}
    fn record_reaction(&mut self) {}
    fn record_spread(&mut self) {}
    fn record_expiry(&mut self) {}
    fn record_lost_claim(&mut self) {}
}

/// Counters for one tick (or a sum over many)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    pub moves: u64,
    pub displacements: u64,
    pub reactions: u64,
    pub spreads: u64,
    pub expirations: u64,
    pub lost_claims: u64,
    /// Highest number of claimed writes seen on one cell (0 unless auditing)
    pub max_writers: u32,
}

impl TickStats {
    /// Fold another set of counters into this one
    pub fn merge(&mut self, other: &TickStats) {
        self.moves += other.moves;
        self.displacements += other.displacements;
        self.reactions += other.reactions;
        self.spreads += other.spreads;
        self.expirations += other.expirations;
        self.lost_claims += other.lost_claims;
        self.max_writers = self.max_writers.max(other.max_writers);
    }

    /// Total number of cells that changed position or material
    pub fn changes(&self) -> u64 {
        self.moves + self.displacements + self.reactions + self.spreads + self.expirations
    }
}

impl SimStats for TickStats {
    fn record_move(&mut self) {
        self.moves += 1;
    }

    fn record_displacement(&mut self) {
        self.displacements += 1;
    }

    fn record_reaction(&mut self) {
        self.reactions += 1;
    }

    fn record_spread(&mut self) {
        self.spreads += 1;
    }

    fn record_expiry(&mut self) {
        self.expirations += 1;
    }

    fn record_lost_claim(&mut self) {
        self.lost_claims += 1;
    }
}
