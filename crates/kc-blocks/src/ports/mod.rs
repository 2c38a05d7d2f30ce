//! Ports layer for the block core.

pub mod outbound;

pub use outbound::*;
