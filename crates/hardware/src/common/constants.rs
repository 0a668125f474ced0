//! Global constants.
//!
//! This module collects the numbers several subsystems must agree on:
//! 1. **Memory Constants:** Page size and Sv32 field widths.
//! 2. **Instruction Constants:** Instruction size and the canonical NOP.
//! 3. **Interrupt Constants:** Bit positions shared by `mip`, `mie` and `mideleg`.

/// Page size in bytes (4 KiB).
pub const PAGE_SIZE: u32 = 4096;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u32 = 12;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: u32 = PAGE_SIZE - 1;

/// Width mask of one Sv32 VPN field (10 bits).
pub const VPN_FIELD_MASK: u32 = 0x3FF;

/// Size of a page-table entry in bytes.
pub const PTE_SIZE: u32 = 4;

/// Size of an instruction in bytes. Compressed instructions are not supported.
pub const INSTRUCTION_SIZE: u32 = 4;

/// `addi x0, x0, 0`.
pub const NOP: u32 = 0x0000_0013;

/// Bit set in `mcause`/`scause` for interrupts.
pub const CAUSE_INTERRUPT_BIT: u32 = 1 << 31;

/// Supervisor software interrupt bit in `mip`/`mie`.
pub const SSIP_BIT: u32 = 1;

/// Machine software interrupt bit in `mip`/`mie`.
pub const MSIP_BIT: u32 = 3;

/// Supervisor timer interrupt bit in `mip`/`mie`.
pub const STIP_BIT: u32 = 5;

/// Machine timer interrupt bit in `mip`/`mie`.
pub const MTIP_BIT: u32 = 7;

/// Supervisor external interrupt bit in `mip`/`mie`.
pub const SEIP_BIT: u32 = 9;

/// Machine external interrupt bit in `mip`/`mie`.
pub const MEIP_BIT: u32 = 11;

/// Number of general purpose registers.
pub const GPR_COUNT: usize = 32;
