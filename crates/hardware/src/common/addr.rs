//! Physical and virtual address types.
//!
//! The core is 32 bits wide on both sides of the MMU. Keeping the two address
//! spaces as separate types stops an untranslated address from reaching a cache
//! or the bus by accident.

use std::fmt;

use super::constants::{PAGE_OFFSET_MASK, PAGE_SHIFT, VPN_FIELD_MASK};

/// A virtual address as produced by the program counter or an effective-address
/// computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u32);

/// A physical address, valid on the memory bus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u32);

impl VirtAddr {
    /// Creates a new virtual address.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Byte offset within a 4 KiB page.
    pub const fn page_offset(self) -> u32 {
        self.0 & PAGE_OFFSET_MASK
    }

    /// Full 20-bit virtual page number.
    pub const fn vpn(self) -> u32 {
        self.0 >> PAGE_SHIFT
    }

    /// Sv32 level-1 index (bits 31:22).
    pub const fn vpn1(self) -> u32 {
        (self.0 >> 22) & VPN_FIELD_MASK
    }

    /// Sv32 level-0 index (bits 21:12).
    pub const fn vpn0(self) -> u32 {
        (self.0 >> PAGE_SHIFT) & VPN_FIELD_MASK
    }
}

impl PhysAddr {
    /// Creates a new physical address.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Rounds the address down to the start of a line of `line_bytes`.
    ///
    /// # Arguments
    ///
    /// * `line_bytes` - Line size, a power of two.
    pub const fn line_base(self, line_bytes: u32) -> Self {
        Self(self.0 & !(line_bytes - 1))
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v:{:#010x}", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p:{:#010x}", self.0)
    }
}
