//! RV32A atomic opcode and function codes.

/// AMO major opcode.
pub const OP_AMO: u32 = 0b010_1111;

/// Word-sized atomics; the only width on RV32.
pub const FUNCT3_WORD: u32 = 0b010;

/// `funct5` values (bits 31:27).
pub mod funct5 {
    /// `AMOADD.W`.
    pub const AMOADD: u32 = 0b00000;
    /// `AMOSWAP.W`.
    pub const AMOSWAP: u32 = 0b00001;
    /// `LR.W`.
    pub const LR: u32 = 0b00010;
    /// `SC.W`.
    pub const SC: u32 = 0b00011;
    /// `AMOXOR.W`.
    pub const AMOXOR: u32 = 0b00100;
    /// `AMOOR.W`.
    pub const AMOOR: u32 = 0b01000;
    /// `AMOAND.W`.
    pub const AMOAND: u32 = 0b01100;
    /// `AMOMIN.W`.
    pub const AMOMIN: u32 = 0b10000;
    /// `AMOMAX.W`.
    pub const AMOMAX: u32 = 0b10100;
    /// `AMOMINU.W`.
    pub const AMOMINU: u32 = 0b11000;
    /// `AMOMAXU.W`.
    pub const AMOMAXU: u32 = 0b11100;
}
