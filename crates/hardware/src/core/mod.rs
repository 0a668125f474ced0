//! Core processor implementation.
//!
//! This module contains the CPU implementation: the architectural state, the
//! execution units, the five-stage pipeline and the cycle orchestration that
//! ties them together.

/// Architecture-specific components (CSRs, register file, privilege modes, interrupt selection).
pub mod arch;

/// CPU core state and cycle orchestration.
pub mod cpu;

/// Instruction pipeline implementation (arbitration, stages, latches, forwarding, micro-ops).
pub mod pipeline;

/// Execution units (ALU, branch unit, multiplier/divider, LSU helpers, caches, MMU).
pub mod units;

pub use self::cpu::Cpu;
