//! Reaction rules
//!
//! Every rule belongs to one material (the owner) and examines one other
//! material. The grid evaluates both directions when two cells meet and
//! settles disagreements itself; this module only stores and looks up rules.
//! Examples: water meeting lava → stone + steam, sand falling into water → mud

use ahash::HashMap;
use serde::{Deserialize, Serialize};

use crate::MaterialId;

/// Result of a reaction rule, oriented as (destination, source) of the
/// move that brought the two materials together
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionOutcome {
    /// No reaction
    #[default]
    Unchanged,
    /// Destination becomes the material, source becomes air
    Replace(u16),
    /// Destination becomes the first material, source the second
    ReplaceBoth(u16, u16),
}

impl ReactionOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, ReactionOutcome::Unchanged)
    }

    /// Materials written into (destination, source), if anything changes
    pub fn products(&self) -> Option<(u16, u16)> {
        match *self {
            ReactionOutcome::Unchanged => None,
            ReactionOutcome::Replace(dst) => Some((dst, MaterialId::AIR)),
            ReactionOutcome::ReplaceBoth(dst, src) => Some((dst, src)),
        }
    }
}

/// One-directional rule: what happens when `owner` meets `other`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reaction {
    pub owner: u16,
    pub other: u16,
    pub outcome: ReactionOutcome,
}

/// Registry of reaction rules with O(1) lookup
/// Key: (owner, other) - not normalized, rules are directional
pub struct ReactionRegistry {
    reactions: HashMap<(u16, u16), ReactionOutcome>,
}

impl ReactionRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_default_reactions();
        registry
    }

    pub fn empty() -> Self {
        Self {
            reactions: HashMap::default(),
        }
    }

    fn register_default_reactions(&mut self) {
        // Sand + Lava → Stone
        self.register(Reaction {
            owner: MaterialId::SAND,
            other: MaterialId::LAVA,
            outcome: ReactionOutcome::Replace(MaterialId::STONE),
        });

        // Sand + Water → Mud
        self.register(Reaction {
            owner: MaterialId::SAND,
            other: MaterialId::WATER,
            outcome: ReactionOutcome::Replace(MaterialId::MUD),
        });

        // Water + Lava → Stone + Steam
        self.register(Reaction {
            owner: MaterialId::WATER,
            other: MaterialId::LAVA,
            outcome: ReactionOutcome::ReplaceBoth(MaterialId::STONE, MaterialId::STEAM),
        });

        // Steam + Water → Water (condensation)
        self.register(Reaction {
            owner: MaterialId::STEAM,
            other: MaterialId::WATER,
            outcome: ReactionOutcome::Replace(MaterialId::WATER),
        });

        // Lava + Water → Stone + Steam
        self.register(Reaction {
            owner: MaterialId::LAVA,
            other: MaterialId::WATER,
            outcome: ReactionOutcome::ReplaceBoth(MaterialId::STONE, MaterialId::STEAM),
        });

        // Stone + Lava → Lava (stone melts into the pool)
        self.register(Reaction {
            owner: MaterialId::STONE,
            other: MaterialId::LAVA,
            outcome: ReactionOutcome::Replace(MaterialId::LAVA),
        });
    }

    /// Register a rule, returning the outcome it replaced
    pub fn register(&mut self, reaction: Reaction) -> Option<ReactionOutcome> {
        log::trace!(
            "Registered reaction {} + {} -> {:?}",
            reaction.owner,
            reaction.other,
            reaction.outcome
        );
        self.reactions
            .insert((reaction.owner, reaction.other), reaction.outcome)
    }

    /// Rule of `owner` when it meets `other`
    pub fn react(&self, owner: u16, other: u16) -> ReactionOutcome {
        self.reactions
            .get(&(owner, other))
            .copied()
            .unwrap_or_default()
    }

    /// All rules, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = Reaction> + '_ {
        self.reactions
            .iter()
            .map(|(&(owner, other), &outcome)| Reaction {
                owner,
                other,
                outcome,
            })
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
}

impl Default for ReactionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
