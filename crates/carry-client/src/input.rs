//! Input as seen by the interaction controller.

use carry_world::BlockSelection;

/// Discrete player actions the controller is notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityAction {
    /// Use / interact (right mouse button by default).
    Interact,
    /// Attack / break (left mouse button by default).
    PrimaryAction,
    /// Start sprinting.
    Sprint,
    /// Jump.
    Jump,
}

/// Whether the engine should still run its own handling of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// Let the default behaviour run.
    PassThrough,
    /// The carry mechanic consumed the action.
    PreventDefault,
}

impl Handling {
    /// Returns `true` for [`Handling::PreventDefault`].
    pub fn is_prevented(self) -> bool {
        self == Handling::PreventDefault
    }
}

/// Per-frame input state sampled by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Whether the interact button is currently held.
    pub interact_down: bool,
    /// What the crosshair is on, if anything.
    pub selection: Option<BlockSelection>,
}

impl InputSnapshot {
    /// Interact held while aiming at `selection`.
    pub fn holding(selection: Option<BlockSelection>) -> Self {
        Self {
            interact_down: true,
            selection,
        }
    }

    /// Nothing pressed, nothing aimed at.
    pub fn released() -> Self {
        Self::default()
    }
}
