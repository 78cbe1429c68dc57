//! World-side collaborators of the carry mechanic: block positions and faces,
//! the block registry with carry behaviours, the [`BlockAccess`] seam the
//! carry logic reads and mutates the world through, build permissions, and an
//! in-memory [`GridWorld`].

pub mod access;
pub mod behavior;
pub mod grid;
pub mod permissions;
pub mod position;
pub mod registry;

pub use access::{BlockAccess, BlockEntityData, BlockState};
pub use behavior::{CarryBehavior, CarrySlot, SlotSettings};
pub use grid::GridWorld;
pub use permissions::{AllowAll, BuildPermissions, PlayerId, ProtectedArea};
pub use position::{BlockFace, BlockPos, BlockSelection};
pub use registry::{BlockId, BlockRegistry, BlockTypeDef, FaceMask, RegistryError};
