//! Memory Management Unit.
//!
//! Two translation ports, fetch and data, each with its own TLB, share one
//! page-table walker. It provides:
//! 1. **Translation:** Bare mode passthrough or an Sv32 TLB lookup.
//! 2. **Permission checks:** Run on every lookup, since privilege and the
//!    `SUM`/`MXR` bits may change after an entry is installed.
//! 3. **Refill:** Walk requests with the data port taking priority, and
//!    installation of the finished walk into the requesting port's TLB.
//! 4. **Invalidation:** `satp` writes and `SFENCE.VMA` clear both TLBs and
//!    discard a walk in flight.

/// Shared page-table walker.
pub mod ptw;

/// Translation lookaside buffer.
pub mod tlb;

use self::ptw::{PageTableWalker, WalkResult};
use self::tlb::{EntryFault, Tlb, TlbEntry};
use crate::common::{AccessType, PhysAddr, Trap, VirtAddr};
use crate::core::arch::csr::{Csrs, MSTATUS_MPP, MSTATUS_MPP_SHIFT, MSTATUS_MPRV, MSTATUS_MXR, MSTATUS_SUM};
use crate::core::arch::mode::PrivilegeMode;

/// An MMU translation port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MmuPort {
    /// Instruction fetch.
    Fetch,
    /// Loads, stores and atomics.
    Data,
}

/// Translation context captured from the CSRs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranslationContext {
    /// Effective privilege of the access.
    pub privilege: PrivilegeMode,
    /// `satp.MODE` selects Sv32.
    pub paging: bool,
    /// Root page table PPN from `satp`.
    pub root_ppn: u32,
    /// `mstatus.SUM`.
    pub sum: bool,
    /// `mstatus.MXR`.
    pub mxr: bool,
}

impl TranslationContext {
    /// Context for instruction fetch at `privilege`.
    pub fn fetch(csrs: &Csrs, privilege: PrivilegeMode) -> Self {
        Self {
            privilege,
            paging: csrs.paging_enabled(),
            root_ppn: csrs.root_ppn(),
            sum: csrs.status(MSTATUS_SUM),
            mxr: csrs.status(MSTATUS_MXR),
        }
    }

    /// Context for data accesses; `MPRV` substitutes the `MPP` privilege.
    pub fn data(csrs: &Csrs, privilege: PrivilegeMode) -> Self {
        let effective = if csrs.status(MSTATUS_MPRV) {
            PrivilegeMode::from_bits((csrs.mstatus & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT)
        } else {
            privilege
        };
        Self::fetch(csrs, effective)
    }

    /// Returns true if addresses are translated.
    pub fn translates(&self) -> bool {
        self.paging && self.privilege < PrivilegeMode::Machine
    }
}

/// Outcome of a translation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Translation {
    /// The physical address.
    Hit(PhysAddr),
    /// The access traps.
    Fault(Trap),
    /// No TLB entry; a walk is needed.
    Miss,
}

const fn page_fault(access: AccessType, va: VirtAddr) -> Trap {
    match access {
        AccessType::Fetch => Trap::InstructionPageFault(va.val()),
        AccessType::Read => Trap::LoadPageFault(va.val()),
        AccessType::Write => Trap::StorePageFault(va.val()),
    }
}

const fn access_fault(access: AccessType, va: VirtAddr) -> Trap {
    match access {
        AccessType::Fetch => Trap::InstructionAccessFault(va.val()),
        AccessType::Read => Trap::LoadAccessFault(va.val()),
        AccessType::Write => Trap::StoreAccessFault(va.val()),
    }
}

/// Checks an entry against the access and produces the physical address.
///
/// # Returns
///
/// The physical address, or the page or access fault the access raises.
pub fn check_entry(
    entry: &TlbEntry,
    va: VirtAddr,
    access: AccessType,
    ctx: &TranslationContext,
) -> Result<PhysAddr, Trap> {
    match entry.fault {
        EntryFault::Page => return Err(page_fault(access, va)),
        EntryFault::Access => return Err(access_fault(access, va)),
        EntryFault::None => {}
    }
    let privilege_ok = match ctx.privilege {
        PrivilegeMode::User => entry.u,
        PrivilegeMode::Supervisor => !entry.u || (ctx.sum && access != AccessType::Fetch),
        PrivilegeMode::Machine => true,
    };
    let permission_ok = match access {
        AccessType::Fetch => entry.x,
        AccessType::Read => entry.r || (ctx.mxr && entry.x),
        AccessType::Write => entry.w,
    };
    let ad_ok = entry.a && (access != AccessType::Write || entry.d);
    if privilege_ok && permission_ok && ad_ok {
        Ok(PhysAddr::new(entry.physical(va)))
    } else {
        Err(page_fault(access, va))
    }
}

/// The MMU: per-port TLBs and the shared walker.
#[derive(Clone, Debug)]
pub struct Mmu {
    itlb: Tlb,
    dtlb: Tlb,
    /// Shared page-table walker.
    pub walker: PageTableWalker,
}

impl Mmu {
    /// Creates an MMU with `tlb_entries` entries per port.
    pub fn new(tlb_entries: usize) -> Self {
        Self {
            itlb: Tlb::new(tlb_entries),
            dtlb: Tlb::new(tlb_entries),
            walker: PageTableWalker::new(),
        }
    }

    /// The TLB serving `port`.
    pub const fn tlb(&self, port: MmuPort) -> &Tlb {
        match port {
            MmuPort::Fetch => &self.itlb,
            MmuPort::Data => &self.dtlb,
        }
    }

    /// Translates `va` for an access on `port`.
    ///
    /// Combinational: a miss does not start a walk; the caller requests one
    /// through [`Mmu::request_walk`] in the commit phase.
    pub fn translate(
        &self,
        port: MmuPort,
        va: VirtAddr,
        access: AccessType,
        ctx: &TranslationContext,
    ) -> Translation {
        if !ctx.translates() {
            return Translation::Hit(PhysAddr::new(va.val()));
        }
        match self.tlb(port).lookup(va) {
            Some(entry) => match check_entry(entry, va, access, ctx) {
                Ok(pa) => Translation::Hit(pa),
                Err(trap) => Translation::Fault(trap),
            },
            None => Translation::Miss,
        }
    }

    /// Asks the walker to resolve `va` for `port`.
    ///
    /// # Returns
    ///
    /// `true` if the walker was free and granted the request.
    pub fn request_walk(&mut self, port: MmuPort, va: VirtAddr, root_ppn: u32) -> bool {
        self.walker.request(port, va, root_ppn)
    }

    /// Installs a finished walk.
    pub fn install(&mut self, result: WalkResult) {
        match result.port {
            MmuPort::Fetch => self.itlb.insert(result.entry),
            MmuPort::Data => self.dtlb.insert(result.entry),
        }
    }

    /// Clears both TLBs and discards any walk in flight.
    pub fn invalidate(&mut self) {
        self.itlb.flush();
        self.dtlb.flush();
        self.walker.cancel();
    }

    /// Returns the MMU to its reset state.
    pub fn reset(&mut self) {
        self.itlb.flush();
        self.dtlb.flush();
        self.walker.reset();
    }
}
