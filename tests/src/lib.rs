//! # Klay-Core Test Suite
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # criterion groups, driven from benches/
//! │   └── recovery.rs
//! │
//! └── integration/      # flows that cross crate boundaries
//!     ├── scenarios.rs  # the reference scenarios, one test each
//!     ├── properties.rs # proptest invariants over several crates
//!     └── block_flow.rs # pool -> selector -> block -> wire -> recovery
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kc-tests
//! cargo test -p kc-tests integration::scenarios::
//! cargo bench -p kc-tests
//! ```

pub mod benchmarks;
pub mod fixtures;
pub mod integration;
