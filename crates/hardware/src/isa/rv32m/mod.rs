//! RV32M multiply/divide function codes.

/// `funct7` selecting the M extension within `OP_REG`.
pub const FUNCT7_MULDIV: u32 = 0b000_0001;

/// `funct3` values.
pub mod funct3 {
    /// `MUL`.
    pub const MUL: u32 = 0b000;
    /// `MULH`.
    pub const MULH: u32 = 0b001;
    /// `MULHSU`.
    pub const MULHSU: u32 = 0b010;
    /// `MULHU`.
    pub const MULHU: u32 = 0b011;
    /// `DIV`.
    pub const DIV: u32 = 0b100;
    /// `DIVU`.
    pub const DIVU: u32 = 0b101;
    /// `REM`.
    pub const REM: u32 = 0b110;
    /// `REMU`.
    pub const REMU: u32 = 0b111;
}
