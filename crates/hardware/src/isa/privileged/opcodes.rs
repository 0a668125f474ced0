//! System instruction encodings.

/// System instruction opcode. CSR access, ECALL, EBREAK, xRET, WFI, SFENCE.VMA.
pub const OP_SYSTEM: u32 = 0b111_0011;

/// `ECALL`.
pub const ECALL: u32 = 0x0000_0073;

/// `EBREAK`.
pub const EBREAK: u32 = 0x0010_0073;

/// `MRET`.
pub const MRET: u32 = 0x3020_0073;

/// `SRET`.
pub const SRET: u32 = 0x1020_0073;

/// `WFI`.
pub const WFI: u32 = 0x1050_0073;

/// `funct7` of `SFENCE.VMA`.
pub const FUNCT7_SFENCE_VMA: u32 = 0b000_1001;

/// `funct3` of the non-CSR system instructions.
pub const PRIV: u32 = 0b000;
/// `CSRRW`.
pub const CSRRW: u32 = 0b001;
/// `CSRRS`.
pub const CSRRS: u32 = 0b010;
/// `CSRRC`.
pub const CSRRC: u32 = 0b011;
/// `CSRRWI`.
pub const CSRRWI: u32 = 0b101;
/// `CSRRSI`.
pub const CSRRSI: u32 = 0b110;
/// `CSRRCI`.
pub const CSRRCI: u32 = 0b111;

/// `FENCE.I`.
pub const FENCE_I: u32 = 0x0000_100F;

/// Data cache flush: MISC-MEM with `funct3 = 5`.
pub const DCACHE_FLUSH: u32 = 0x0000_500F;
