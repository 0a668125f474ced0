//! General-purpose register file.
//!
//! One write port, any number of read ports; `x0` reads as zero and ignores
//! writes. Same-cycle visibility of a write to earlier stages is provided by
//! forwarding, not by this structure.

use crate::common::constants::GPR_COUNT;

/// General-purpose register file.
#[derive(Clone, Debug, Default)]
pub struct Gpr {
    regs: [u32; GPR_COUNT],
}

impl Gpr {
    /// Creates a register file with every register zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register. `x0` always returns 0.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    pub fn read(&self, idx: usize) -> u32 {
        if idx == 0 { 0 } else { self.regs[idx & (GPR_COUNT - 1)] }
    }

    /// Writes a register. Writes to `x0` are dropped.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The value to write.
    pub fn write(&mut self, idx: usize, val: u32) {
        if idx != 0 {
            self.regs[idx & (GPR_COUNT - 1)] = val;
        }
    }

    /// Snapshot of all registers, for tests and tracing.
    pub const fn snapshot(&self) -> [u32; GPR_COUNT] {
        self.regs
    }
}
