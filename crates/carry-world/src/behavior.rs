//! Carry behaviour metadata attached to block types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A location on the carrier where a block can sit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CarrySlot {
    /// Held in front with both hands.
    Hands,
    /// Resting on one shoulder.
    Shoulder,
    /// Strapped to the back.
    Back,
}

impl CarrySlot {
    /// All slots in storage order.
    pub const ALL: [CarrySlot; 3] = [Self::Hands, Self::Shoulder, Self::Back];

    /// Slots a block can be picked up into directly, in order of preference.
    pub const PICKUP_ORDER: [CarrySlot; 2] = [Self::Hands, Self::Shoulder];

    /// Dense index for per-slot arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Hands => 0,
            Self::Shoulder => 1,
            Self::Back => 2,
        }
    }

    /// Key naming this slot inside watched attributes.
    pub fn key(self) -> &'static str {
        match self {
            Self::Hands => "Hands",
            Self::Shoulder => "Shoulder",
            Self::Back => "Back",
        }
    }
}

/// Settings of one slot a block may be carried in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSettings {
    /// Added to the carrier's walk speed multiplier.
    pub walk_speed_modifier: f32,
    /// Animation played while the block sits in the slot.
    pub animation: Option<String>,
}

/// Declares a block type carryable: how long the hold gesture takes and
/// which slots it may occupy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarryBehavior {
    /// Base hold time in seconds before the interaction completes.
    pub interact_delay: f32,
    /// Legal slots and their settings. A slot missing here is illegal.
    pub slots: BTreeMap<CarrySlot, SlotSettings>,
}

impl CarryBehavior {
    /// A behaviour with the given delay and no legal slots yet.
    pub fn new(interact_delay: f32) -> Self {
        Self {
            interact_delay,
            slots: BTreeMap::new(),
        }
    }

    /// Builder-style: allow `slot` with `settings`.
    #[must_use]
    pub fn with_slot(mut self, slot: CarrySlot, settings: SlotSettings) -> Self {
        self.slots.insert(slot, settings);
        self
    }

    /// Whether the block may sit in `slot`.
    pub fn allows(&self, slot: CarrySlot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Settings for `slot`, if legal.
    pub fn slot(&self, slot: CarrySlot) -> Option<&SlotSettings> {
        self.slots.get(&slot)
    }

    /// First slot of [`CarrySlot::PICKUP_ORDER`] this block may be picked up into.
    pub fn first_pickup_slot(&self) -> Option<CarrySlot> {
        CarrySlot::PICKUP_ORDER
            .into_iter()
            .find(|slot| self.allows(*slot))
    }
}
