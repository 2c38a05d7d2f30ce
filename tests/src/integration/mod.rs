//! # Integration Tests
//!
//! Flows exercising several crates together.

pub mod block_flow;
pub mod properties;
pub mod scenarios;
