//! Memory access types.
//!
//! Used by the MMU to pick the permission bit to check and the fault to raise,
//! and by the statistics counters.

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch. Requires Execute (X) permission.
    Fetch,

    /// Data load, including LR and the read half of an AMO.
    /// Requires Read (R) permission, or X when `mstatus.MXR` is set.
    Read,

    /// Data store, including SC and the write half of an AMO.
    /// Requires Write (W) permission and a set dirty bit.
    Write,
}
