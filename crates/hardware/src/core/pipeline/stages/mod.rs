//! Pipeline stage implementations.
//!
//! Each stage is a pure `evaluate` function over the core state at the start of
//! the cycle. It returns what the stage wants (an output entry, halts, redirects
//! and requests) and never mutates anything. The commit phase in
//! [`Cpu::tick`](crate::core::Cpu::tick) applies the outputs once the
//! arbitration for the cycle is settled.
//!
//! 1. **Fetch:** ITLB translation and instruction cache lookup.
//! 2. **Decode:** Decoding, operand read through forwarding, and prediction.
//! 3. **Execute:** ALU, branch resolution and address generation.
//! 4. **Memory:** Data cache, bus and long-latency completion.
//! 5. **Writeback:** Register write, traps and serialising instructions.

/// Instruction decode stage implementation.
pub mod decode;

/// Instruction execute stage implementation.
pub mod execute;

/// Instruction fetch stage implementation.
pub mod fetch;

/// Memory access stage implementation.
pub mod memory;

/// Writeback stage implementation.
pub mod writeback;

pub use decode::DecodeOutput;
pub use execute::ExecuteOutput;
pub use fetch::FetchOutput;
pub use memory::MemoryOutput;
pub use writeback::{WbAction, WritebackOutput};
