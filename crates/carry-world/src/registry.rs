//! Block type registry: maps compact [`BlockId`] values to [`BlockTypeDef`] metadata.
//!
//! Air is always ID 0. The registry is built once at startup and shared by
//! the client and server copies of the world so both sides agree on
//! solidity, replaceability and carry behaviour.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::behavior::CarryBehavior;
use crate::position::BlockFace;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact block type identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    /// Empty space.
    pub const AIR: Self = Self(0);

    /// Returns `true` for air.
    pub fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// Set of block faces, one bit per [`BlockFace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceMask(pub u8);

impl FaceMask {
    /// No solid faces.
    pub const NONE: Self = Self(0);
    /// All six faces solid (a full cube).
    pub const ALL: Self = Self(0b11_1111);

    /// A mask with a single face.
    pub fn only(face: BlockFace) -> Self {
        Self(1 << face.index())
    }

    /// Whether `face` is in the mask.
    pub fn contains(self, face: BlockFace) -> bool {
        self.0 & (1 << face.index()) != 0
    }
}

/// Full descriptor for a block type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockTypeDef {
    /// Human-readable name (e.g. "stone", "tallgrass", "chest").
    pub name: String,
    /// Faces that can support a block placed against them.
    pub solid_faces: FaceMask,
    /// Whether placing another block may overwrite this one.
    pub replaceable: bool,
    /// Whether the block stores the face it was placed against.
    pub orientable: bool,
    /// Carry behaviour, if the block can be carried at all.
    pub carry: Option<CarryBehavior>,
}

impl BlockTypeDef {
    /// A full, non-replaceable cube that can't be carried.
    pub fn solid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            solid_faces: FaceMask::ALL,
            replaceable: false,
            orientable: false,
            carry: None,
        }
    }

    /// Non-solid filler that placement may overwrite (tall grass, snow layer).
    pub fn replaceable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            solid_faces: FaceMask::NONE,
            replaceable: true,
            orientable: false,
            carry: None,
        }
    }

    /// Builder-style: attach a carry behaviour.
    #[must_use]
    pub fn carryable(mut self, behavior: CarryBehavior) -> Self {
        self.carry = Some(behavior);
        self
    }

    /// Builder-style: override the solid faces.
    #[must_use]
    pub fn with_solid_faces(mut self, faces: FaceMask) -> Self {
        self.solid_faces = faces;
        self
    }

    /// Builder-style: remember placement facing.
    #[must_use]
    pub fn orientable(mut self) -> Self {
        self.orientable = true;
        self
    }
}

/// Errors that can occur during block type registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with the same name has already been registered.
    #[error("duplicate block type name: {0}")]
    DuplicateName(String),
    /// All 65 535 user-defined slots have been consumed.
    #[error("block type registry is full (max 65536 types)")]
    RegistryFull,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockId`] → [`BlockTypeDef`] with O(1) lookup by index and by name.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    /// Dense array where `index == BlockId.0`.
    types: Vec<BlockTypeDef>,
    /// Reverse lookup: name → ID.
    name_to_id: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates a new registry with air pre-registered as ID 0.
    pub fn new() -> Self {
        let mut name_to_id = HashMap::new();
        name_to_id.insert("air".to_string(), BlockId::AIR);

        Self {
            types: vec![BlockTypeDef::replaceable("air")],
            name_to_id,
        }
    }

    /// Registers a new block type and returns its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if a type with the same name
    /// already exists, or [`RegistryError::RegistryFull`] if all IDs are used.
    pub fn register(&mut self, def: BlockTypeDef) -> Result<BlockId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.types.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockId(self.types.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.types.push(def);
        Ok(id)
    }

    /// Returns the definition for a given ID, or `None` for unknown IDs.
    pub fn get(&self, id: BlockId) -> Option<&BlockTypeDef> {
        self.types.get(id.0 as usize)
    }

    /// Returns the ID for a named block type.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the total number of registered types (including air).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }

    /// Carry behaviour of `id`, if it is carryable.
    pub fn carry_behavior(&self, id: BlockId) -> Option<&CarryBehavior> {
        self.get(id)?.carry.as_ref()
    }

    /// Whether a block of type `existing` may be overwritten by placing `by`.
    ///
    /// Air yields to anything; other replaceable blocks only yield to
    /// non-replaceable ones. Unknown types never yield.
    pub fn is_replaceable_by(&self, existing: BlockId, by: BlockId) -> bool {
        if existing.is_air() {
            return true;
        }
        match (self.get(existing), self.get(by)) {
            (Some(old), Some(new)) => old.replaceable && !new.replaceable,
            _ => false,
        }
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
