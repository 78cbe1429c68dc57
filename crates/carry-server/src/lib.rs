//! Server-authoritative validation of carry intents.
//!
//! The server owns the canonical carried state and block world. Each intent
//! a client sends is re-derived from that state; accepted intents mutate it
//! and replicate through watched attributes, rejected ones force a resync.

pub mod validator;

pub use validator::{CarryServer, Correction, Rejection, register_handlers};

#[cfg(test)]
mod session_tests;
