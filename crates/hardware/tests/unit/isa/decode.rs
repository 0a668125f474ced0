//! Decoder Tests.
//!
//! Each instruction class maps to the right micro-op and register interface;
//! unsupported encodings decode to `None`.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vexsim_core::core::pipeline::signals::{
    AluOp, AtomicOp, BranchCond, CsrOp, CsrSource, DivOp, MemWidth, MicroOp, MulOp, Operand,
    SystemOp,
};
use vexsim_core::isa::decode::{Decoded, decode};

use crate::common::builder::instruction::*;

fn dec(inst: u32) -> Decoded {
    decode(inst).unwrap_or_else(|| panic!("{inst:#010x} should decode"))
}

// ══════════════════════════════════════════════════════════
// 1. RV32I
// ══════════════════════════════════════════════════════════

#[test]
fn register_alu() {
    let d = dec(sub(1, 2, 3));
    assert_eq!(d.op, MicroOp::Alu { op: AluOp::Sub, src2: Operand::Reg });
    assert_eq!((d.rd, d.rs1, d.rs2), (1, 2, 3));
}

#[test]
fn immediate_alu_sign_extends() {
    let d = dec(addi(5, 6, -1));
    assert_eq!(d.op, MicroOp::Alu { op: AluOp::Add, src2: Operand::Imm(u32::MAX) });
    assert_eq!((d.rd, d.rs1, d.rs2), (5, 6, 0));
}

#[test]
fn shift_immediates() {
    assert_eq!(dec(srai(1, 1, 31)).op, MicroOp::Alu { op: AluOp::Sra, src2: Operand::Imm(31) });
    assert_eq!(dec(srli(1, 1, 4)).op, MicroOp::Alu { op: AluOp::Srl, src2: Operand::Imm(4) });
    assert_eq!(dec(slli(1, 1, 0)).op, MicroOp::Alu { op: AluOp::Sll, src2: Operand::Imm(0) });
}

#[test]
fn upper_immediates_and_jumps() {
    assert_eq!(dec(lui(1, 0xABCD_E000)).op, MicroOp::Lui { imm: 0xABCD_E000 });
    assert_eq!(dec(auipc(1, 0x1000)).op, MicroOp::Auipc { imm: 0x1000 });
    assert_eq!(dec(jal(1, -8)).op, MicroOp::Jal { offset: -8_i32 as u32 });
    let d = dec(jalr(0, 1, 12));
    assert_eq!(d.op, MicroOp::Jalr { offset: 12 });
    assert_eq!(d.rs1, 1);
}

#[test]
fn branches_read_two_sources_and_write_none() {
    let d = dec(bltu(4, 5, -16));
    assert_eq!(d.op, MicroOp::Branch { cond: BranchCond::Ltu, offset: -16_i32 as u32 });
    assert_eq!((d.rd, d.rs1, d.rs2), (0, 4, 5));
}

#[test]
fn loads_and_stores() {
    assert_eq!(
        dec(lhu(3, 2, 6)).op,
        MicroOp::Load { width: MemWidth::Half, unsigned: true, offset: 6 }
    );
    let st = dec(sb(7, 2, -1));
    assert_eq!(st.op, MicroOp::Store { width: MemWidth::Byte, offset: u32::MAX });
    assert_eq!((st.rd, st.rs1, st.rs2), (0, 2, 7));
}

#[test]
fn fences() {
    assert_eq!(dec(fence()).op, MicroOp::Nop);
    assert_eq!(dec(fence_i()).op, MicroOp::System(SystemOp::FenceI));
    assert_eq!(dec(dcache_flush()).op, MicroOp::System(SystemOp::DcacheFlush));
}

// ══════════════════════════════════════════════════════════
// 2. M and A extensions
// ══════════════════════════════════════════════════════════

#[test]
fn multiply_divide() {
    assert_eq!(dec(mulhsu(1, 2, 3)).op, MicroOp::Mul { op: MulOp::Mulhsu });
    assert_eq!(dec(remu(1, 2, 3)).op, MicroOp::Div { op: DivOp::Remu });
}

#[test]
fn atomics() {
    let lr = dec(lr_w(1, 2));
    assert_eq!(lr.op, MicroOp::Atomic { op: AtomicOp::Lr });
    assert_eq!(lr.rs2, 0);
    let sc = dec(sc_w(1, 2, 3));
    assert_eq!(sc.op, MicroOp::Atomic { op: AtomicOp::Sc });
    assert_eq!((sc.rd, sc.rs1, sc.rs2), (1, 2, 3));
    assert_eq!(dec(amomax_w(1, 2, 3)).op, MicroOp::Atomic { op: AtomicOp::Max });
}

#[test]
fn lr_with_rs2_is_illegal() {
    assert_eq!(decode(lr_w(1, 2) | (3 << 20)), None);
}

// ══════════════════════════════════════════════════════════
// 3. System
// ══════════════════════════════════════════════════════════

#[test]
fn csr_accesses() {
    let d = dec(csrrs(4, 0x300, 5));
    assert_eq!(d.op, MicroOp::Csr { op: CsrOp::Rs, addr: 0x300, src: CsrSource::Reg });
    assert_eq!((d.rd, d.rs1), (4, 5));
    let i = dec(csrrwi(4, 0x341, 17));
    assert_eq!(i.op, MicroOp::Csr { op: CsrOp::Rw, addr: 0x341, src: CsrSource::Imm(17) });
    assert_eq!(i.rs1, 0, "immediate forms read no register");
}

#[test]
fn privileged_instructions() {
    assert_eq!(dec(ecall()).op, MicroOp::System(SystemOp::Ecall));
    assert_eq!(dec(ebreak()).op, MicroOp::System(SystemOp::Ebreak));
    assert_eq!(dec(mret()).op, MicroOp::System(SystemOp::Mret));
    assert_eq!(dec(sret()).op, MicroOp::System(SystemOp::Sret));
    assert_eq!(dec(wfi()).op, MicroOp::System(SystemOp::Wfi));
    let sf = dec(sfence_vma(1, 2));
    assert_eq!(sf.op, MicroOp::System(SystemOp::SfenceVma));
    assert_eq!((sf.rs1, sf.rs2), (1, 2));
}

// ══════════════════════════════════════════════════════════
// 4. Illegal encodings
// ══════════════════════════════════════════════════════════

#[test]
fn illegal_encodings() {
    assert_eq!(decode(0), None);
    assert_eq!(decode(u32::MAX), None);
    assert_eq!(decode(0x0000_4501), None, "compressed instructions are not supported");
    assert_eq!(decode(sub(1, 2, 3) | (1 << 12)), None, "SLL with the SUB funct7");
}

proptest! {
    #[test]
    fn decoded_registers_are_in_range(inst in any::<u32>()) {
        if let Some(d) = decode(inst) {
            prop_assert!(d.rd < 32 && d.rs1 < 32 && d.rs2 < 32);
            if !d.op.writes_rd() {
                prop_assert_eq!(d.rd, 0);
            }
        }
    }
}
