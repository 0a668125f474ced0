//! # Core Tests
//!
//! Organised the same way as the `core` module of the crate.


/// Programs run on the full core through the simulator.
pub mod cpu;

/// Arbitration, forwarding and pipeline transparency.
pub mod pipeline;
