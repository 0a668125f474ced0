//! Architectural state.
//!
//! This module contains the programmer-visible state of the core:
//! 1. **CSRs:** Control and status register storage and field masks.
//! 2. **GPRs:** The integer register file.
//! 3. **Modes:** Privilege levels.
//! 4. **Traps:** Interrupt selection from pending and enabled sources.

/// Control and Status Register (CSR) definitions and storage.
pub mod csr;

/// General-Purpose Register file implementation.
pub mod gpr;

/// Privilege mode definitions.
pub mod mode;

/// Interrupt selection.
pub mod trap;
