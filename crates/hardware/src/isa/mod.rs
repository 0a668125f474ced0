//! Instruction set definitions.
//!
//! Opcodes and function codes are grouped by extension. Decoding produces a
//! structured [`MicroOp`](crate::core::pipeline::signals::MicroOp) once, in the
//! decode stage; later stages never look at raw encoding bits again.
//!
//! # Extensions
//!
//! * `rv32i`: Base integer instruction set, plus Zifencei.
//! * `rv32m`: Integer multiplication and division.
//! * `rv32a`: Atomic instructions.
//! * `privileged`: System instructions, CSR access and trap causes.

/// Instruction decoding into micro-ops.
pub mod decode;

/// Instruction field extraction.
pub mod instruction;

/// Privileged architecture definitions (trap causes, system instructions).
pub mod privileged;

/// Atomic memory operations extension.
pub mod rv32a;

/// Base integer instruction set.
pub mod rv32i;

/// Integer multiply/divide extension.
pub mod rv32m;
