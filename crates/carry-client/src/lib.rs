//! Client side of the carry mechanic.
//!
//! [`InteractionController`] turns input edges and per-frame ticks into timed
//! pick-up, place-down and swap interactions, applies them optimistically to
//! the local mirror, and reports each completed one to the server.
//! [`ClientWorld`] holds that mirror and applies the server's corrections.

pub mod controller;
pub mod input;
pub mod mirror;
pub mod progress;

pub use controller::{CurrentAction, InteractionController, InteractionState, LocalPlayer};
pub use input::{EntityAction, Handling, InputSnapshot};
pub use mirror::{ClientWorld, register_client_handlers};
pub use progress::{ProgressIndicator, ProgressRecorder};
