//! Build/break permission checks.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::position::BlockPos;

/// Stable identifier of a connected player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Answers "may this player build or break at this position".
pub trait BuildPermissions {
    /// Returns `true` if `player` may modify the block at `pos`.
    fn may_build(&self, player: PlayerId, pos: BlockPos) -> bool;
}

/// Everyone may build everywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl BuildPermissions for AllowAll {
    fn may_build(&self, _player: PlayerId, _pos: BlockPos) -> bool {
        true
    }
}

/// An axis-aligned claim: inside it only the listed owners may build;
/// outside it everyone may.
#[derive(Clone, Debug)]
pub struct ProtectedArea {
    /// Inclusive minimum corner.
    pub min: BlockPos,
    /// Inclusive maximum corner.
    pub max: BlockPos,
    /// Players allowed to build inside.
    pub owners: HashSet<PlayerId>,
}

impl ProtectedArea {
    /// Creates a claim spanning `min..=max` owned by `owners`.
    pub fn new(min: BlockPos, max: BlockPos, owners: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            min,
            max,
            owners: owners.into_iter().collect(),
        }
    }

    /// Whether `pos` lies inside the claim.
    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }
}

impl BuildPermissions for ProtectedArea {
    fn may_build(&self, player: PlayerId, pos: BlockPos) -> bool {
        !self.contains(pos) || self.owners.contains(&player)
    }
}
