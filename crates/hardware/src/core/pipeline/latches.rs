//! Pipeline latches.
//!
//! One latch sits in front of each stage after fetch:
//! Fetch → `IfId` → Decode → `IdEx` → Execute → `ExMem` → Memory → `MemWb` → WriteBack.
//!
//! A latch is an `Option`: `Some` is the stage's `isValid`. Every entry carries
//! the trap latched so far; once set, later stages pass the entry through
//! without further effect and the trap retires at write-back.

use crate::common::Trap;
use crate::core::pipeline::signals::MicroOp;
use crate::core::units::muldiv::{DivState, MulPartials};

/// Fetch to decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IfIdEntry {
    /// Program counter.
    pub pc: u32,
    /// Instruction word; zero when fetch trapped.
    pub inst: u32,
    /// Fetch-side trap (page fault, access fault).
    pub trap: Option<Trap>,
    /// Placed by the debug unit rather than fetched.
    pub injected: bool,
}

/// Decode to execute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdExEntry {
    /// Program counter.
    pub pc: u32,
    /// Instruction word.
    pub inst: u32,
    /// Decoded operation.
    pub op: MicroOp,
    /// Destination register.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// First operand, forwarded or read.
    pub rs1_val: u32,
    /// Second operand, forwarded or read.
    pub rs2_val: u32,
    /// Address fetch continued at after this instruction.
    pub predicted_next: u32,
    /// Latched trap.
    pub trap: Option<Trap>,
    /// Placed by the debug unit.
    pub injected: bool,
}

/// Progress of a memory-stage bus access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemPhase {
    /// Nothing issued yet.
    #[default]
    Start,
    /// A write is in flight. `old` is the value returned to `rd` on completion
    /// (the memory value for an AMO, 0 for a successful SC).
    WaitAck {
        /// Physical address written.
        pa: u32,
        /// Write data.
        data: u32,
        /// Byte enables.
        mask: u8,
        /// Merge into the data cache on acknowledge.
        cached: bool,
        /// Result for `rd`.
        old: u32,
    },
    /// An uncached read is in flight.
    WaitRead,
}

/// Execute to memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExMemEntry {
    /// Program counter.
    pub pc: u32,
    /// Instruction word.
    pub inst: u32,
    /// Decoded operation.
    pub op: MicroOp,
    /// Destination register.
    pub rd: usize,
    /// `rs1` index, used by CSR instructions to decide whether to write.
    pub rs1: usize,
    /// Result of execute-stage operations.
    pub result: u32,
    /// Effective virtual address of a memory access.
    pub addr: u32,
    /// Store or AMO source value, or the CSR write operand.
    pub operand: u32,
    /// Partial products of a multiply.
    pub mul: MulPartials,
    /// Divider state.
    pub div: DivState,
    /// Bus access progress.
    pub phase: MemPhase,
    /// Latched trap.
    pub trap: Option<Trap>,
    /// Placed by the debug unit.
    pub injected: bool,
}

/// Memory to write-back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemWbEntry {
    /// Program counter.
    pub pc: u32,
    /// Instruction word.
    pub inst: u32,
    /// Decoded operation.
    pub op: MicroOp,
    /// Destination register.
    pub rd: usize,
    /// `rs1` index.
    pub rs1: usize,
    /// Value for `rd`; for multiplies see `product`.
    pub result: u32,
    /// Full 64-bit product; the word is selected here.
    pub product: i64,
    /// CSR write operand.
    pub operand: u32,
    /// Latched trap.
    pub trap: Option<Trap>,
    /// Placed by the debug unit.
    pub injected: bool,
}

impl MemWbEntry {
    /// Returns true if this entry, once at write-back, may still flush the
    /// younger stages: a trap or a serialising instruction.
    pub const fn may_flush(&self) -> bool {
        self.trap.is_some() || self.op.is_serializing()
    }
}
