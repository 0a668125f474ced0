//! Privileged architecture definitions.
//!
//! # Modules
//!
//! - `cause`: Exception and interrupt cause codes.
//! - `opcodes`: System instruction encodings.

/// Exception and interrupt cause code definitions.
pub mod cause;

/// System instruction encodings (ECALL, EBREAK, xRET, WFI, CSR access).
pub mod opcodes;
