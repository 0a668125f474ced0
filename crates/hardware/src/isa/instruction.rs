//! Instruction field extraction.
//!
//! Provides bit extraction for every RV32 instruction format. Immediates are
//! returned already sign-extended and shifted, as 32-bit two's complement
//! values ready for address arithmetic.

/// Bit mask for extracting the opcode field (bits 6:0).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for a register index field.
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for extracting the funct3 field (bits 14:12).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for extracting the funct7 field (bits 31:25).
pub const FUNCT7_MASK: u32 = 0x7F;
/// Bit mask for extracting the CSR address field (bits 31:20).
pub const CSR_MASK: u32 = 0xFFF;

/// Trait for extracting instruction fields from encoded instructions.
pub trait InstructionBits {
    /// Opcode field (bits 6:0).
    fn opcode(&self) -> u32;

    /// Destination register index (bits 11:7).
    fn rd(&self) -> usize;

    /// First source register index (bits 19:15).
    fn rs1(&self) -> usize;

    /// Second source register index (bits 24:20).
    fn rs2(&self) -> usize;

    /// funct3 field (bits 14:12).
    fn funct3(&self) -> u32;

    /// funct7 field (bits 31:25).
    fn funct7(&self) -> u32;

    /// funct5 field of atomics (bits 31:27).
    fn funct5(&self) -> u32;

    /// CSR address (bits 31:20).
    fn csr(&self) -> u16;

    /// I-type immediate.
    fn imm_i(&self) -> u32;

    /// S-type immediate.
    fn imm_s(&self) -> u32;

    /// B-type immediate (branch offset).
    fn imm_b(&self) -> u32;

    /// U-type immediate, already shifted into bits 31:12.
    fn imm_u(&self) -> u32;

    /// J-type immediate (jump offset).
    fn imm_j(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }

    #[inline(always)]
    fn funct5(&self) -> u32 {
        self >> 27
    }

    #[inline(always)]
    fn csr(&self) -> u16 {
        ((self >> 20) & CSR_MASK) as u16
    }

    fn imm_i(&self) -> u32 {
        ((*self as i32) >> 20) as u32
    }

    fn imm_s(&self) -> u32 {
        let hi = ((*self as i32) >> 25) << 5;
        let lo = ((self >> 7) & 0x1F) as i32;
        (hi | lo) as u32
    }

    fn imm_b(&self) -> u32 {
        let sign = ((*self as i32) >> 31) << 12;
        let b11 = ((self >> 7) & 1) << 11;
        let b10_5 = ((self >> 25) & 0x3F) << 5;
        let b4_1 = ((self >> 8) & 0xF) << 1;
        (sign as u32) | b11 | b10_5 | b4_1
    }

    fn imm_u(&self) -> u32 {
        self & 0xFFFF_F000
    }

    fn imm_j(&self) -> u32 {
        let sign = ((*self as i32) >> 31) << 20;
        let b19_12 = self & 0x000F_F000;
        let b11 = ((self >> 20) & 1) << 11;
        let b10_1 = ((self >> 21) & 0x3FF) << 1;
        (sign as u32) | b19_12 | b11 | b10_1
    }
}
