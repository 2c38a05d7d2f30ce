//! Ports layer for the transaction core.
//!
//! Only outbound ports exist: the core is a library driven directly by its
//! callers, and it drives the state store and the VM.

pub mod outbound;

pub use outbound::*;
