//! Adapters for the block core's outbound ports.

pub mod derive_sha;

pub use derive_sha::{ConcatDeriveSha, SimpleDeriveSha};
