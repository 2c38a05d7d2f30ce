//! # Block Core
//!
//! Headers, blocks, receipts and logs, with their consensus and storage
//! encodings.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Header commits to its transaction and receipt lists | `domain/block.rs` - `Block::new()` |
//! | No receipts: empty root and zero bloom | `domain/block.rs` - `Block::new()` |
//! | IBFT hash excludes seals | `domain/header.rs` - `Header::hash()` |
//! | Consensus receipts carry no tx hash | `domain/receipt.rs` - `Receipt::decode()` |
//! | Block hash and size computed once | `domain/block.rs` - `OnceLock` caches |
//!
//! ## Injected Behavior
//!
//! The chain's consensus engine arrives as [`BlockConfig`]; the list root
//! hasher as a [`DeriveSha`] implementation. [`adapters`] provides two.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{ConcatDeriveSha, SimpleDeriveSha};
pub use config::{BlockConfig, EngineType};
pub use domain::*;
pub use ports::{DerivableList, DeriveSha};
