//! Execute (EX) Stage.
//!
//! This module implements the third stage of the pipeline. It performs the following:
//! 1. **Arithmetic Execution:** ALU, upper-immediate and link-address results.
//! 2. **Branch Resolution:** Computes the real next PC and checks it against the
//!    address decode let fetch continue at; a mismatch redirects fetch.
//! 3. **Address Generation:** Effective addresses and alignment checks for memory operations.
//! 4. **Long-latency setup:** Multiplier partial products and divider operand latching.

use crate::common::Trap;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::core::Cpu;
use crate::core::pipeline::latches::ExMemEntry;
use crate::core::pipeline::signals::{AtomicOp, CsrSource, MemWidth, MicroOp, Operand};
use crate::core::units::alu::Alu;
use crate::core::units::bru::branch_taken;
use crate::core::units::lsu::is_aligned;
use crate::core::units::muldiv::{DivState, MulPartials};

/// What the execute stage produces this cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecuteOutput {
    /// Entry for the memory stage.
    pub entry: Option<ExMemEntry>,
    /// Correct next PC when the prediction was wrong.
    pub mispredict: Option<u32>,
    /// Resolved conditional branch `(pc, taken)` for predictor training.
    pub branch: Option<(u32, bool)>,
}

/// Evaluates the execute stage.
///
/// # Arguments
///
/// * `cpu` - Core state at the start of the cycle.
pub fn evaluate(cpu: &Cpu) -> ExecuteOutput {
    let mut out = ExecuteOutput::default();
    let Some(id) = cpu.id_ex else {
        return out;
    };
    let mut entry = ExMemEntry {
        pc: id.pc,
        inst: id.inst,
        op: id.op,
        rd: id.rd,
        rs1: id.rs1,
        trap: id.trap,
        injected: id.injected,
        ..ExMemEntry::default()
    };
    if entry.trap.is_some() {
        out.entry = Some(entry);
        return out;
    }

    let (a, b) = (id.rs1_val, id.rs2_val);
    let link = id.pc.wrapping_add(INSTRUCTION_SIZE);
    let mut next_pc = link;

    match id.op {
        MicroOp::Nop | MicroOp::System(_) => {}
        MicroOp::Alu { op, src2 } => {
            let rhs = match src2 {
                Operand::Reg => b,
                Operand::Imm(imm) => imm,
            };
            entry.result = Alu::execute(op, a, rhs);
        }
        MicroOp::Lui { imm } => entry.result = imm,
        MicroOp::Auipc { imm } => entry.result = id.pc.wrapping_add(imm),
        MicroOp::Jal { offset } => {
            entry.result = link;
            next_pc = id.pc.wrapping_add(offset);
        }
        MicroOp::Jalr { offset } => {
            entry.result = link;
            next_pc = a.wrapping_add(offset) & !1;
        }
        MicroOp::Branch { cond, offset } => {
            let taken = branch_taken(cond, a, b);
            out.branch = Some((id.pc, taken));
            if taken {
                next_pc = id.pc.wrapping_add(offset);
            }
        }
        MicroOp::Load { width, offset, .. } => {
            entry.addr = a.wrapping_add(offset);
            if !is_aligned(entry.addr, width) {
                entry.trap = Some(Trap::LoadAddressMisaligned(entry.addr));
            }
        }
        MicroOp::Store { width, offset } => {
            entry.addr = a.wrapping_add(offset);
            entry.operand = b;
            if !is_aligned(entry.addr, width) {
                entry.trap = Some(Trap::StoreAddressMisaligned(entry.addr));
            }
        }
        MicroOp::Atomic { op } => {
            entry.addr = a;
            entry.operand = b;
            if !is_aligned(a, MemWidth::Word) {
                entry.trap = Some(if op == AtomicOp::Lr {
                    Trap::LoadAddressMisaligned(a)
                } else {
                    Trap::StoreAddressMisaligned(a)
                });
            }
        }
        MicroOp::Mul { op } => entry.mul = MulPartials::compute(op, a, b),
        MicroOp::Div { op } => entry.div = DivState::start(op, a, b),
        MicroOp::Csr { src, .. } => {
            entry.operand = match src {
                CsrSource::Reg => a,
                CsrSource::Imm(uimm) => uimm,
            };
        }
    }

    if entry.trap.is_none() && next_pc != link && next_pc & 3 != 0 {
        entry.trap = Some(Trap::InstructionAddressMisaligned(next_pc));
    }
    if entry.trap.is_none() && next_pc != id.predicted_next {
        out.mispredict = Some(next_pc);
    }
    out.entry = Some(entry);
    out
}
