//! Instruction decoder.
//!
//! Maps a 32-bit RV32IMA + Zicsr + Zifencei encoding onto a [`MicroOp`] plus the
//! register indices it reads and writes. Encodings outside that set, including
//! every compressed or floating-point instruction, decode to `None` and become
//! illegal-instruction traps in the decode stage.

use crate::core::pipeline::signals::{
    AluOp, AtomicOp, BranchCond, CsrOp, CsrSource, DivOp, MemWidth, MicroOp, MulOp, Operand,
    SystemOp,
};
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::opcodes as sys;
use crate::isa::rv32a::{self, funct5};
use crate::isa::rv32i::{funct3 as f3, funct7 as f7, opcodes};
use crate::isa::rv32m::{self, funct3 as m3};

/// A decoded instruction: the micro-op and its register interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Operation to perform.
    pub op: MicroOp,
    /// Destination register (0 when the instruction writes none).
    pub rd: usize,
    /// First source register (0 when unused).
    pub rs1: usize,
    /// Second source register (0 when unused).
    pub rs2: usize,
}

impl Decoded {
    /// Builds a decoded instruction that writes `rd` and reads `rs1`/`rs2`.
    const fn new(op: MicroOp, rd: usize, rs1: usize, rs2: usize) -> Self {
        Self { op, rd, rs1, rs2 }
    }
}

/// Decodes one instruction word.
///
/// # Arguments
///
/// * `inst` - The raw 32-bit instruction.
///
/// # Returns
///
/// The decoded instruction, or `None` for an illegal encoding.
pub fn decode(inst: u32) -> Option<Decoded> {
    let rd = inst.rd();
    let rs1 = inst.rs1();
    let rs2 = inst.rs2();

    let decoded = match inst.opcode() {
        opcodes::OP_LUI => Decoded::new(MicroOp::Lui { imm: inst.imm_u() }, rd, 0, 0),
        opcodes::OP_AUIPC => Decoded::new(MicroOp::Auipc { imm: inst.imm_u() }, rd, 0, 0),
        opcodes::OP_JAL => Decoded::new(MicroOp::Jal { offset: inst.imm_j() }, rd, 0, 0),
        opcodes::OP_JALR if inst.funct3() == 0 => {
            Decoded::new(MicroOp::Jalr { offset: inst.imm_i() }, rd, rs1, 0)
        }
        opcodes::OP_BRANCH => {
            let cond = match inst.funct3() {
                f3::BEQ => BranchCond::Eq,
                f3::BNE => BranchCond::Ne,
                f3::BLT => BranchCond::Lt,
                f3::BGE => BranchCond::Ge,
                f3::BLTU => BranchCond::Ltu,
                f3::BGEU => BranchCond::Geu,
                _ => return None,
            };
            Decoded::new(MicroOp::Branch { cond, offset: inst.imm_b() }, 0, rs1, rs2)
        }
        opcodes::OP_LOAD => {
            let (width, unsigned) = match inst.funct3() {
                f3::LB => (MemWidth::Byte, false),
                f3::LH => (MemWidth::Half, false),
                f3::LW => (MemWidth::Word, false),
                f3::LBU => (MemWidth::Byte, true),
                f3::LHU => (MemWidth::Half, true),
                _ => return None,
            };
            let op = MicroOp::Load { width, unsigned, offset: inst.imm_i() };
            Decoded::new(op, rd, rs1, 0)
        }
        opcodes::OP_STORE => {
            let width = match inst.funct3() {
                f3::LB => MemWidth::Byte,
                f3::LH => MemWidth::Half,
                f3::LW => MemWidth::Word,
                _ => return None,
            };
            Decoded::new(MicroOp::Store { width, offset: inst.imm_s() }, 0, rs1, rs2)
        }
        opcodes::OP_IMM => {
            let imm = inst.imm_i();
            let op = match (inst.funct3(), inst.funct7()) {
                (f3::ADD_SUB, _) => AluOp::Add,
                (f3::SLT, _) => AluOp::Slt,
                (f3::SLTU, _) => AluOp::Sltu,
                (f3::XOR, _) => AluOp::Xor,
                (f3::OR, _) => AluOp::Or,
                (f3::AND, _) => AluOp::And,
                (f3::SLL, f7::DEFAULT) => AluOp::Sll,
                (f3::SRL_SRA, f7::DEFAULT) => AluOp::Srl,
                (f3::SRL_SRA, f7::ALT) => AluOp::Sra,
                _ => return None,
            };
            let imm = if matches!(op, AluOp::Sll | AluOp::Srl | AluOp::Sra) {
                imm & 0x1F
            } else {
                imm
            };
            Decoded::new(MicroOp::Alu { op, src2: Operand::Imm(imm) }, rd, rs1, 0)
        }
        opcodes::OP_REG => decode_reg(inst, rd, rs1, rs2)?,
        rv32a::OP_AMO => decode_amo(inst, rd, rs1, rs2)?,
        opcodes::OP_MISC_MEM => match inst.funct3() {
            f3::FENCE => Decoded::default(),
            f3::FENCE_I => Decoded::new(MicroOp::System(SystemOp::FenceI), 0, 0, 0),
            f3::DCACHE_FLUSH => Decoded::new(MicroOp::System(SystemOp::DcacheFlush), 0, 0, 0),
            _ => return None,
        },
        sys::OP_SYSTEM => decode_system(inst, rd, rs1, rs2)?,
        _ => return None,
    };
    Some(decoded)
}

/// Decodes `OP_REG`: base ALU operations and the M extension.
fn decode_reg(inst: u32, rd: usize, rs1: usize, rs2: usize) -> Option<Decoded> {
    let funct7 = inst.funct7();
    let op = if funct7 == rv32m::FUNCT7_MULDIV {
        match inst.funct3() {
            m3::MUL => MicroOp::Mul { op: MulOp::Mul },
            m3::MULH => MicroOp::Mul { op: MulOp::Mulh },
            m3::MULHSU => MicroOp::Mul { op: MulOp::Mulhsu },
            m3::MULHU => MicroOp::Mul { op: MulOp::Mulhu },
            m3::DIV => MicroOp::Div { op: DivOp::Div },
            m3::DIVU => MicroOp::Div { op: DivOp::Divu },
            m3::REM => MicroOp::Div { op: DivOp::Rem },
            _ => MicroOp::Div { op: DivOp::Remu },
        }
    } else {
        let op = match (inst.funct3(), funct7) {
            (f3::ADD_SUB, f7::DEFAULT) => AluOp::Add,
            (f3::ADD_SUB, f7::ALT) => AluOp::Sub,
            (f3::SLL, f7::DEFAULT) => AluOp::Sll,
            (f3::SLT, f7::DEFAULT) => AluOp::Slt,
            (f3::SLTU, f7::DEFAULT) => AluOp::Sltu,
            (f3::XOR, f7::DEFAULT) => AluOp::Xor,
            (f3::SRL_SRA, f7::DEFAULT) => AluOp::Srl,
            (f3::SRL_SRA, f7::ALT) => AluOp::Sra,
            (f3::OR, f7::DEFAULT) => AluOp::Or,
            (f3::AND, f7::DEFAULT) => AluOp::And,
            _ => return None,
        };
        MicroOp::Alu { op, src2: Operand::Reg }
    };
    Some(Decoded::new(op, rd, rs1, rs2))
}

/// Decodes the A extension. Only word width exists on RV32.
fn decode_amo(inst: u32, rd: usize, rs1: usize, rs2: usize) -> Option<Decoded> {
    if inst.funct3() != rv32a::FUNCT3_WORD {
        return None;
    }
    let op = match inst.funct5() {
        funct5::LR if rs2 == 0 => AtomicOp::Lr,
        funct5::SC => AtomicOp::Sc,
        funct5::AMOSWAP => AtomicOp::Swap,
        funct5::AMOADD => AtomicOp::Add,
        funct5::AMOXOR => AtomicOp::Xor,
        funct5::AMOAND => AtomicOp::And,
        funct5::AMOOR => AtomicOp::Or,
        funct5::AMOMIN => AtomicOp::Min,
        funct5::AMOMAX => AtomicOp::Max,
        funct5::AMOMINU => AtomicOp::Minu,
        funct5::AMOMAXU => AtomicOp::Maxu,
        _ => return None,
    };
    let rs2 = if op == AtomicOp::Lr { 0 } else { rs2 };
    Some(Decoded::new(MicroOp::Atomic { op }, rd, rs1, rs2))
}

/// Decodes CSR accesses and the privileged system instructions.
fn decode_system(inst: u32, rd: usize, rs1: usize, rs2: usize) -> Option<Decoded> {
    let csr_op = |op, src| MicroOp::Csr { op, addr: inst.csr(), src };
    let uimm = rs1 as u32;
    let decoded = match inst.funct3() {
        sys::PRIV => {
            let op = match inst {
                sys::ECALL => SystemOp::Ecall,
                sys::EBREAK => SystemOp::Ebreak,
                sys::MRET => SystemOp::Mret,
                sys::SRET => SystemOp::Sret,
                sys::WFI => SystemOp::Wfi,
                _ if inst.funct7() == sys::FUNCT7_SFENCE_VMA && rd == 0 => {
                    return Some(Decoded::new(MicroOp::System(SystemOp::SfenceVma), 0, rs1, rs2));
                }
                _ => return None,
            };
            Decoded::new(MicroOp::System(op), 0, 0, 0)
        }
        sys::CSRRW => Decoded::new(csr_op(CsrOp::Rw, CsrSource::Reg), rd, rs1, 0),
        sys::CSRRS => Decoded::new(csr_op(CsrOp::Rs, CsrSource::Reg), rd, rs1, 0),
        sys::CSRRC => Decoded::new(csr_op(CsrOp::Rc, CsrSource::Reg), rd, rs1, 0),
        sys::CSRRWI => Decoded::new(csr_op(CsrOp::Rw, CsrSource::Imm(uimm)), rd, 0, 0),
        sys::CSRRSI => Decoded::new(csr_op(CsrOp::Rs, CsrSource::Imm(uimm)), rd, 0, 0),
        sys::CSRRCI => Decoded::new(csr_op(CsrOp::Rc, CsrSource::Imm(uimm)), rd, 0, 0),
        _ => return None,
    };
    Some(decoded)
}
