//! Load/Store Unit (LSU) helpers.
//!
//! Pure functions shared by the memory stage and the data cache:
//! - alignment checks,
//! - byte-lane masks and store data placement for partial-word writes,
//! - extraction and extension of partial-word loads,
//! - [`atomic`]: the read-modify-write ALU for the A extension.

/// Atomic memory operation ALU (RISC-V A extension).
pub mod atomic;

use crate::core::pipeline::signals::MemWidth;

/// Returns true if `addr` is naturally aligned for `width`.
pub const fn is_aligned(addr: u32, width: MemWidth) -> bool {
    addr & (width.bytes() - 1) == 0
}

/// Byte-enable mask (bit per byte of the word) for an access.
///
/// # Examples
///
/// ```
/// use vexsim_core::core::units::lsu::byte_mask;
/// use vexsim_core::core::pipeline::signals::MemWidth;
///
/// assert_eq!(byte_mask(0x1003, MemWidth::Byte), 0b1000);
/// assert_eq!(byte_mask(0x1002, MemWidth::Half), 0b1100);
/// assert_eq!(byte_mask(0x1000, MemWidth::Word), 0b1111);
/// ```
pub const fn byte_mask(addr: u32, width: MemWidth) -> u8 {
    let base: u8 = match width {
        MemWidth::Byte => 0b0001,
        MemWidth::Half => 0b0011,
        MemWidth::Word => 0b1111,
    };
    base << (addr & 3)
}

/// Replicates store data into the lanes selected by the address.
pub const fn store_lanes(addr: u32, width: MemWidth, data: u32) -> u32 {
    match width {
        MemWidth::Byte => (data & 0xFF) << ((addr & 3) * 8),
        MemWidth::Half => (data & 0xFFFF) << ((addr & 2) * 8),
        MemWidth::Word => data,
    }
}

/// Extracts and extends a load result from the containing word.
///
/// # Arguments
///
/// * `word` - The aligned 32-bit word holding the datum.
/// * `addr` - The byte address of the access.
/// * `width` - Access width.
/// * `unsigned` - Zero-extend instead of sign-extend.
pub const fn extract_load(word: u32, addr: u32, width: MemWidth, unsigned: bool) -> u32 {
    let shifted = word >> ((addr & 3) * 8);
    match (width, unsigned) {
        (MemWidth::Byte, false) => shifted as u8 as i8 as i32 as u32,
        (MemWidth::Byte, true) => shifted & 0xFF,
        (MemWidth::Half, false) => shifted as u16 as i16 as i32 as u32,
        (MemWidth::Half, true) => shifted & 0xFFFF,
        (MemWidth::Word, _) => word,
    }
}

/// Expands a byte mask into a 32-bit bit mask.
pub const fn expand_mask(mask: u8) -> u32 {
    let mut bits = 0u32;
    let mut i = 0;
    while i < 4 {
        if mask & (1 << i) != 0 {
            bits |= 0xFF << (i * 8);
        }
        i += 1;
    }
    bits
}

/// Merges masked write data into an existing word.
pub const fn merge_word(old: u32, data: u32, mask: u8) -> u32 {
    let bits = expand_mask(mask);
    (old & !bits) | (data & bits)
}
