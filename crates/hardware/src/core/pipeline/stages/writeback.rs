//! Writeback (WB) Stage.
//!
//! This module implements the final stage of the pipeline. It performs the following:
//! 1. **Result Selection:** Picks the register value, including the product half of a multiply.
//! 2. **Trap Detection:** Surfaces the instruction's trap, plus the privilege checks for CSR
//!    accesses and the privileged system instructions.
//! 3. **Serialisation:** Classifies CSR and system instructions so the commit phase can apply
//!    them and restart fetch behind them.
//!
//! Evaluation has no side effects; the commit phase of the cycle applies the returned action.

use crate::common::Trap;
use crate::core::Cpu;
use crate::core::arch::csr::{MSTATUS_TSR, MSTATUS_TVM, MSTATUS_TW};
use crate::core::arch::mode::PrivilegeMode;
use crate::core::pipeline::hazards::PendingWrite;
use crate::core::pipeline::latches::MemWbEntry;
use crate::core::pipeline::signals::{CsrOp, CsrSource, MicroOp, SystemOp};
use crate::core::units::muldiv::select_product;

/// Architectural effect of the instruction leaving write-back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WbAction {
    /// Ordinary retirement.
    Retire,
    /// Take a trap with the instruction's PC as `epc`.
    Trap(Trap),
    /// Write a CSR (`None` when the instruction only reads).
    Csr {
        /// CSR address.
        addr: u16,
        /// New value.
        value: Option<u32>,
    },
    /// Return from an M-mode trap.
    Mret,
    /// Return from an S-mode trap.
    Sret,
    /// Wait for an interrupt.
    Wfi,
    /// Invalidate both TLBs.
    SfenceVma,
    /// Flush the instruction cache.
    FenceI,
    /// Flush the data cache.
    DcacheFlush,
}

impl WbAction {
    /// True if everything younger must be flushed when this retires.
    pub const fn flushes(&self) -> bool {
        !matches!(self, Self::Retire)
    }
}

/// What the write-back stage commits this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WritebackOutput {
    /// The retiring entry.
    pub entry: MemWbEntry,
    /// Register write `(rd, value)`; never targets `x0`.
    pub rd_write: Option<(usize, u32)>,
    /// Trap, serialising effect, or plain retirement.
    pub action: WbAction,
}

impl WritebackOutput {
    /// The register write as seen by the forwarding network.
    pub fn pending_write(&self) -> Option<PendingWrite> {
        self.rd_write.map(|(rd, value)| PendingWrite {
            rd,
            value: Some(value),
        })
    }
}

/// Whether a CSR instruction writes, per the `rs1 == x0` / `uimm == 0` rule.
const fn csr_writes(op: CsrOp, src: CsrSource, rs1: usize) -> bool {
    match (op, src) {
        (CsrOp::Rw, _) => true,
        (_, CsrSource::Reg) => rs1 != 0,
        (_, CsrSource::Imm(uimm)) => uimm != 0,
    }
}

/// Privilege check for the serialising system instructions.
fn system_allowed(cpu: &Cpu, op: SystemOp) -> bool {
    let privilege = cpu.privilege;
    let supervisor_trapped = |bit| privilege == PrivilegeMode::Supervisor && cpu.csrs.status(bit);
    match op {
        SystemOp::Mret => privilege == PrivilegeMode::Machine,
        SystemOp::Sret => privilege >= PrivilegeMode::Supervisor && !supervisor_trapped(MSTATUS_TSR),
        SystemOp::Wfi => privilege != PrivilegeMode::User && !supervisor_trapped(MSTATUS_TW),
        SystemOp::SfenceVma => privilege != PrivilegeMode::User && !supervisor_trapped(MSTATUS_TVM),
        _ => true,
    }
}

/// Evaluates the write-back stage.
///
/// # Arguments
///
/// * `cpu` - Core state at the start of the cycle.
///
/// # Returns
///
/// The commit to perform, or `None` when the latch is empty.
pub fn evaluate(cpu: &Cpu) -> Option<WritebackOutput> {
    let entry = cpu.mem_wb?;
    let trapped = |trap| WritebackOutput {
        entry,
        rd_write: None,
        action: WbAction::Trap(trap),
    };
    if let Some(trap) = entry.trap {
        return Some(trapped(trap));
    }

    let (value, action) = match entry.op {
        MicroOp::Csr { op, addr, src } => {
            let writes = csr_writes(op, src, entry.rs1);
            let Some(old) = cpu.csr_read_checked(addr, writes) else {
                return Some(trapped(Trap::IllegalInstruction(entry.inst)));
            };
            let new = match op {
                CsrOp::Rw => entry.operand,
                CsrOp::Rs => old | entry.operand,
                CsrOp::Rc => old & !entry.operand,
            };
            let value = writes.then_some(new);
            (old, WbAction::Csr { addr, value })
        }
        MicroOp::System(op) => {
            if !system_allowed(cpu, op) {
                return Some(trapped(Trap::IllegalInstruction(entry.inst)));
            }
            let action = match op {
                SystemOp::Mret => WbAction::Mret,
                SystemOp::Sret => WbAction::Sret,
                SystemOp::Wfi => WbAction::Wfi,
                SystemOp::SfenceVma => WbAction::SfenceVma,
                SystemOp::FenceI => WbAction::FenceI,
                SystemOp::DcacheFlush => WbAction::DcacheFlush,
                SystemOp::Ecall | SystemOp::Ebreak => WbAction::Retire,
            };
            (0, action)
        }
        MicroOp::Mul { op } => (select_product(op, entry.product), WbAction::Retire),
        _ => (entry.result, WbAction::Retire),
    };

    let rd_write = (entry.op.writes_rd() && entry.rd != 0).then_some((entry.rd, value));
    Some(WritebackOutput {
        entry,
        rd_write,
        action,
    })
}
