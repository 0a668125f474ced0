//! Common types shared by every part of the core model.
//!
//! This module provides the vocabulary the pipeline, caches and MMU agree on:
//! 1. **Addresses:** Distinct virtual and physical 32-bit address types.
//! 2. **Constants:** Page geometry, instruction size and interrupt bit positions.
//! 3. **Access Types:** Fetch/read/write classification used for permission checks.
//! 4. **Errors:** Architectural traps and simulator-level failures.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the model.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Trap and simulator error definitions.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{PAGE_SHIFT, PAGE_SIZE};
pub use data::AccessType;
pub use error::{SimError, Trap};
