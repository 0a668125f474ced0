//! Instruction pipeline implementation.
//!
//! This module contains the five-stage in-order pipeline. It includes the following components:
//! 1. **Arbitration:** Per-stage halt, hold and flush signals and the firing rules derived from them.
//! 2. **Hazards:** The forwarding lookup over pending register writes.
//! 3. **Latches:** Inter-stage buffers between fetch, decode, execute, memory and write-back.
//! 4. **Signals:** The micro-op tagged union produced by decode.
//! 5. **Stages:** The side-effect-free evaluation of each stage.

/// Stage arbitration signals.
pub mod arbitration;

/// Register forwarding.
pub mod hazards;

/// Inter-stage pipeline latches (IF/ID, ID/EX, EX/MEM, MEM/WB).
pub mod latches;

/// Micro-ops generated during instruction decode.
pub mod signals;

/// Pipeline stage implementations (fetch, decode, execute, memory, writeback).
pub mod stages;
