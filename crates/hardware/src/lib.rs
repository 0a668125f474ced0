//! Cycle-level model of an in-order, five-stage RV32IMA core.
//!
//! This crate implements the core and a small memory environment with the following:
//! 1. **Core:** Pipeline (fetch, decode, execute, memory, writeback) with an arbitration
//!    network, register forwarding, a partial-product multiplier and an iterative divider.
//! 2. **Memory:** Direct-mapped instruction and data caches, per-port TLBs and a shared
//!    Sv32 page-table walker.
//! 3. **Privilege:** M/S/U modes, CSRs, traps, interrupts and a debug control unit.
//! 4. **SoC:** A latency-modelled RAM, an uncached IO window and bus-error windows behind
//!    a split instruction/data bus.
//! 5. **Simulation:** Loader, configuration and statistics collection.

/// Common types and constants (addresses, traps, errors, access types).
pub mod common;
/// Model configuration (defaults and hierarchical config structures).
pub mod config;
/// CPU core (arch state, units, pipeline, cycle orchestration).
pub mod core;
/// Instruction set (encodings and the decoder).
pub mod isa;
/// Simulator shell and program loading.
pub mod sim;
/// Memory environment (bus contract, RAM, interconnect).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main CPU type; holds the pipeline latches, caches, MMU and stats.
pub use crate::core::Cpu;
/// Core plus memory environment; construct with `Simulator::new`.
pub use crate::sim::Simulator;
