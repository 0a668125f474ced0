//! Execution units and functional components.
//!
//! This module contains the leaf units the pipeline stages drive: the integer
//! ALU, branch resolution and prediction, the multiplier and divider, the
//! load/store helpers, the caches and the MMU.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Branch resolution and the decode-stage branch predictor.
pub mod bru;

/// Direct-mapped instruction and data caches with their line loaders.
pub mod cache;

/// Load/store alignment, byte lanes and the atomic ALU.
pub mod lsu;

/// Memory Management Unit with per-port TLBs and the shared page table walker.
pub mod mmu;

/// Partial-product multiplier and iterative divider.
pub mod muldiv;
