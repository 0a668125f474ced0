//! Translation lookaside buffer.
//!
//! A small fully associative table of Sv32 translations, one per MMU port.
//! Entries hold either a leaf translation (4 KiB page or 4 MiB superpage) or
//! a fault recorded by the walker, so a faulting access retires its trap
//! without walking again. Replacement is round-robin.

use crate::common::{PAGE_SHIFT, VirtAddr};

/// Fault recorded in an entry by the walker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryFault {
    /// A usable translation.
    #[default]
    None,
    /// The walk ended on a malformed or invalid entry.
    Page,
    /// A page-table read returned a bus error.
    Access,
}

/// One TLB entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TlbEntry {
    /// Entry holds a translation or a fault.
    pub valid: bool,
    /// Fault recorded for this page.
    pub fault: EntryFault,
    /// Maps a 4 MiB superpage; only `vpn[19:10]` is compared.
    pub superpage: bool,
    /// Virtual page number (20 bits).
    pub vpn: u32,
    /// Physical page number (22 bits).
    pub ppn: u32,
    /// Readable.
    pub r: bool,
    /// Writable.
    pub w: bool,
    /// Executable.
    pub x: bool,
    /// User accessible.
    pub u: bool,
    /// Accessed.
    pub a: bool,
    /// Dirty.
    pub d: bool,
}

impl TlbEntry {
    /// An entry recording `fault` for the page of `va`.
    pub const fn faulting(va: VirtAddr, fault: EntryFault) -> Self {
        Self {
            valid: true,
            fault,
            superpage: false,
            vpn: va.vpn(),
            ppn: 0,
            r: false,
            w: false,
            x: false,
            u: false,
            a: false,
            d: false,
        }
    }

    /// Returns true if this entry translates `vpn`.
    pub const fn matches(&self, vpn: u32) -> bool {
        if !self.valid {
            return false;
        }
        if self.superpage {
            (self.vpn >> 10) == (vpn >> 10)
        } else {
            self.vpn == vpn
        }
    }

    /// Physical address for `va`, computed wide and truncated to 32 bits.
    pub const fn physical(&self, va: VirtAddr) -> u32 {
        let pa = if self.superpage {
            (((self.ppn >> 10) as u64) << 22) | (va.val() & 0x003F_FFFF) as u64
        } else {
            ((self.ppn as u64) << PAGE_SHIFT) | va.page_offset() as u64
        };
        pa as u32
    }

    fn overlaps(&self, other: &Self) -> bool {
        if !self.valid || !other.valid {
            return false;
        }
        if self.superpage || other.superpage {
            (self.vpn >> 10) == (other.vpn >> 10)
        } else {
            self.vpn == other.vpn
        }
    }
}

/// A fully associative TLB with round-robin replacement.
#[derive(Clone, Debug)]
pub struct Tlb {
    entries: Vec<TlbEntry>,
    next: usize,
}

impl Tlb {
    /// Creates an empty TLB.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of entries; at least one is always allocated.
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![TlbEntry::default(); size.max(1)],
            next: 0,
        }
    }

    /// Finds the entry translating `va`.
    pub fn lookup(&self, va: VirtAddr) -> Option<&TlbEntry> {
        let vpn = va.vpn();
        self.entries.iter().find(|e| e.matches(vpn))
    }

    /// Installs an entry, replacing any overlapping one so that at most one
    /// entry matches an address.
    pub fn insert(&mut self, entry: TlbEntry) {
        for e in &mut self.entries {
            if e.overlaps(&entry) {
                e.valid = false;
            }
        }
        self.entries[self.next] = entry;
        self.next = (self.next + 1) % self.entries.len();
    }

    /// Invalidates every entry.
    pub fn flush(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
        self.next = 0;
    }

    /// Number of valid entries.
    pub fn occupancy(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }
}
