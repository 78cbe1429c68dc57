//! Block coordinates, the six block faces, and the player's block selection.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Integer coordinate of a block cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate (up).
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Creates a position from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// `self + delta`, or `None` if any coordinate leaves the `i32` range.
    #[must_use]
    pub fn checked_add(self, delta: IVec3) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(delta.x)?,
            self.y.checked_add(delta.y)?,
            self.z.checked_add(delta.z)?,
        ))
    }

    /// The neighbouring cell across `face`. `None` at the edge of the
    /// coordinate range.
    #[must_use]
    pub fn offset(self, face: BlockFace) -> Option<Self> {
        self.checked_add(face.normal())
    }

    /// The cell directly below.
    #[must_use]
    pub fn down(self) -> Option<Self> {
        self.offset(BlockFace::Down)
    }

    /// The cell directly above.
    #[must_use]
    pub fn up(self) -> Option<Self> {
        self.offset(BlockFace::Up)
    }

    /// Centre of the cell in world space.
    pub fn center(self) -> Vec3 {
        IVec3::from(self).as_vec3() + Vec3::splat(0.5)
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockPos> for IVec3 {
    fn from(p: BlockPos) -> Self {
        IVec3::new(p.x, p.y, p.z)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six faces of a block.
///
/// The `repr(u8)` discriminant doubles as the bit index inside
/// [`crate::FaceMask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockFace {
    /// −Z.
    North = 0,
    /// +X.
    East = 1,
    /// +Z.
    South = 2,
    /// −X.
    West = 3,
    /// +Y.
    Up = 4,
    /// −Y.
    Down = 5,
}

impl BlockFace {
    /// All six faces in discriminant order.
    pub const ALL: [BlockFace; 6] = [
        Self::North,
        Self::East,
        Self::South,
        Self::West,
        Self::Up,
        Self::Down,
    ];

    /// Unit offset pointing out of this face.
    pub fn normal(self) -> IVec3 {
        match self {
            Self::North => IVec3::NEG_Z,
            Self::East => IVec3::X,
            Self::South => IVec3::Z,
            Self::West => IVec3::NEG_X,
            Self::Up => IVec3::Y,
            Self::Down => IVec3::NEG_Y,
        }
    }

    /// Returns the opposite face.
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Bit index of this face.
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// What the player is aiming at: a block cell, the face that was hit, and
/// the hit point within the cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockSelection {
    /// The targeted cell.
    pub position: BlockPos,
    /// The face of the targeted cell the aim ray entered through.
    pub face: BlockFace,
    /// Hit point relative to the cell's minimum corner (each axis `0.0..=1.0`).
    pub hit_position: Vec3,
    /// Set once `position` has been moved outward along `face`.
    pub did_offset: bool,
}

impl BlockSelection {
    /// A selection of `face` on `position`, hit at the centre of that face.
    pub fn new(position: BlockPos, face: BlockFace) -> Self {
        let hit_position = Vec3::splat(0.5) + face.normal().as_vec3() * 0.5;
        Self {
            position,
            face,
            hit_position,
            did_offset: false,
        }
    }
}
