//! Instruction Decode (ID) Stage.
//!
//! This module implements the second stage of the pipeline. It performs the following:
//! 1. **Decoding:** Turns the instruction word into a [`MicroOp`] with its register interface.
//! 2. **Decode-time traps:** Illegal instructions, `ECALL` and `EBREAK`.
//! 3. **Register Read:** Reads both operands through the forwarding network, halting while
//!    a pending writer has not produced its value.
//! 4. **Prediction:** Redirects fetch for `JAL` and for conditional branches the predictor
//!    takes; execute checks the guess.
//! 5. **Breakpoints:** Compares the PC with the debug unit's comparators.

use crate::common::Trap;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::core::Cpu;
use crate::core::arch::mode::PrivilegeMode;
use crate::core::pipeline::hazards::{Forward, PendingWrite, forwarding_lookup};
use crate::core::pipeline::latches::IdExEntry;
use crate::core::pipeline::signals::{MicroOp, SystemOp};
use crate::isa::decode::decode;

/// What the decode stage wants this cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOutput {
    /// An operand is not ready.
    pub halt: bool,
    /// Entry for execute, present when not halted.
    pub entry: Option<IdExEntry>,
    /// Predicted-taken target fetch should jump to when decode fires.
    pub redirect: Option<u32>,
    /// An enabled breakpoint matches this instruction.
    pub breakpoint: bool,
}

/// Reads one operand through the forwarding network.
fn read_operand(cpu: &Cpu, reg: usize, writers: &[PendingWrite]) -> Option<u32> {
    match forwarding_lookup(reg, writers) {
        Forward::None => Some(cpu.regs.read(reg)),
        Forward::Ready(value) => Some(value),
        Forward::NotReady => None,
    }
}

const fn ecall_trap(privilege: PrivilegeMode) -> Trap {
    match privilege {
        PrivilegeMode::User => Trap::EnvironmentCallFromUMode,
        PrivilegeMode::Supervisor => Trap::EnvironmentCallFromSMode,
        PrivilegeMode::Machine => Trap::EnvironmentCallFromMMode,
    }
}

/// Evaluates the decode stage.
///
/// # Arguments
///
/// * `cpu` - Core state at the start of the cycle.
/// * `writers` - Pending register writes of the older stages, oldest first.
pub fn evaluate(cpu: &Cpu, writers: &[PendingWrite]) -> DecodeOutput {
    let mut out = DecodeOutput::default();
    let Some(fetched) = cpu.if_id else {
        return out;
    };
    let pc = fetched.pc;
    let fall_through = pc.wrapping_add(INSTRUCTION_SIZE);
    out.breakpoint = !fetched.injected && cpu.debug.breakpoint_hit(pc);

    let mut entry = IdExEntry {
        pc,
        inst: fetched.inst,
        predicted_next: fall_through,
        trap: fetched.trap,
        injected: fetched.injected,
        ..IdExEntry::default()
    };
    if entry.trap.is_some() {
        out.entry = Some(entry);
        return out;
    }

    let Some(decoded) = decode(fetched.inst) else {
        entry.trap = Some(Trap::IllegalInstruction(fetched.inst));
        out.entry = Some(entry);
        return out;
    };
    entry.trap = match decoded.op {
        MicroOp::System(SystemOp::Ecall) => Some(ecall_trap(cpu.privilege)),
        MicroOp::System(SystemOp::Ebreak) => Some(Trap::Breakpoint(pc)),
        _ => None,
    };
    if entry.trap.is_some() {
        out.entry = Some(entry);
        return out;
    }

    let (Some(rs1_val), Some(rs2_val)) = (
        read_operand(cpu, decoded.rs1, writers),
        read_operand(cpu, decoded.rs2, writers),
    ) else {
        out.halt = true;
        return out;
    };

    entry.op = decoded.op;
    entry.rd = decoded.rd;
    entry.rs1 = decoded.rs1;
    entry.rs2 = decoded.rs2;
    entry.rs1_val = rs1_val;
    entry.rs2_val = rs2_val;

    if !fetched.injected {
        let target = match decoded.op {
            MicroOp::Jal { offset } => Some(pc.wrapping_add(offset)),
            MicroOp::Branch { offset, .. } if cpu.predictor.predict(pc) => Some(pc.wrapping_add(offset)),
            _ => None,
        };
        if let Some(target) = target.filter(|t| t & 3 == 0) {
            entry.predicted_next = target;
            out.redirect = Some(target);
        }
    }
    out.entry = Some(entry);
    out
}
