//! RV32I base opcodes and function codes.

/// Major opcodes (bits 6:0).
pub mod opcodes {
    /// `LUI`.
    pub const OP_LUI: u32 = 0b011_0111;
    /// `AUIPC`.
    pub const OP_AUIPC: u32 = 0b001_0111;
    /// `JAL`.
    pub const OP_JAL: u32 = 0b110_1111;
    /// `JALR`.
    pub const OP_JALR: u32 = 0b110_0111;
    /// Conditional branches.
    pub const OP_BRANCH: u32 = 0b110_0011;
    /// Loads.
    pub const OP_LOAD: u32 = 0b000_0011;
    /// Stores.
    pub const OP_STORE: u32 = 0b010_0011;
    /// Register-immediate ALU operations.
    pub const OP_IMM: u32 = 0b001_0011;
    /// Register-register ALU operations (and RV32M).
    pub const OP_REG: u32 = 0b011_0011;
    /// `FENCE`, `FENCE.I` and the data cache flush.
    pub const OP_MISC_MEM: u32 = 0b000_1111;
}

/// `funct3` values.
pub mod funct3 {
    /// `ADD`/`SUB`/`ADDI`, `BEQ`, `LB`/`SB`.
    pub const ADD_SUB: u32 = 0b000;
    /// `SLL`/`SLLI`.
    pub const SLL: u32 = 0b001;
    /// `SLT`/`SLTI`.
    pub const SLT: u32 = 0b010;
    /// `SLTU`/`SLTIU`.
    pub const SLTU: u32 = 0b011;
    /// `XOR`/`XORI`.
    pub const XOR: u32 = 0b100;
    /// `SRL`/`SRA` and immediate forms.
    pub const SRL_SRA: u32 = 0b101;
    /// `OR`/`ORI`.
    pub const OR: u32 = 0b110;
    /// `AND`/`ANDI`.
    pub const AND: u32 = 0b111;

    /// `BEQ`.
    pub const BEQ: u32 = 0b000;
    /// `BNE`.
    pub const BNE: u32 = 0b001;
    /// `BLT`.
    pub const BLT: u32 = 0b100;
    /// `BGE`.
    pub const BGE: u32 = 0b101;
    /// `BLTU`.
    pub const BLTU: u32 = 0b110;
    /// `BGEU`.
    pub const BGEU: u32 = 0b111;

    /// `LB`/`SB`.
    pub const LB: u32 = 0b000;
    /// `LH`/`SH`.
    pub const LH: u32 = 0b001;
    /// `LW`/`SW`.
    pub const LW: u32 = 0b010;
    /// `LBU`.
    pub const LBU: u32 = 0b100;
    /// `LHU`.
    pub const LHU: u32 = 0b101;

    /// `FENCE`.
    pub const FENCE: u32 = 0b000;
    /// `FENCE.I`.
    pub const FENCE_I: u32 = 0b001;
    /// Data cache flush (custom MISC-MEM encoding).
    pub const DCACHE_FLUSH: u32 = 0b101;
}

/// `funct7` values.
pub mod funct7 {
    /// Default encoding.
    pub const DEFAULT: u32 = 0b000_0000;
    /// `SUB` and `SRA`.
    pub const ALT: u32 = 0b010_0000;
}
