//! Shared Sv32 page-table walker.
//!
//! One walk is in flight at a time. The walker owns the request token: a port
//! that finds it busy retries later. Each level issues a single-word read on
//! the data bus and classifies the entry it receives:
//!
//! | Level | Entry                                 | Outcome                   |
//! |-------|---------------------------------------|---------------------------|
//! | 1     | `V=0`, or `W` without `R`             | page fault                |
//! | 1     | leaf with `PPN[0] != 0`               | page fault (misaligned)   |
//! | 1     | leaf                                  | superpage translation     |
//! | 1     | pointer                               | continue at level 0       |
//! | 0     | `V=0`, `W` without `R`, or pointer    | page fault                |
//! | 0     | leaf                                  | 4 KiB translation         |
//!
//! A bus error at either level records an access fault.

use tracing::debug;

use super::MmuPort;
use super::tlb::{EntryFault, TlbEntry};
use crate::common::constants::PTE_SIZE;
use crate::common::{PAGE_SHIFT, VirtAddr};
use crate::soc::{BusCommand, BusResponse};

const PTE_V: u32 = 1;
const PTE_R: u32 = 1 << 1;
const PTE_W: u32 = 1 << 2;
const PTE_X: u32 = 1 << 3;
const PTE_U: u32 = 1 << 4;
const PTE_A: u32 = 1 << 6;
const PTE_D: u32 = 1 << 7;
const PTE_PPN_SHIFT: u32 = 10;

/// Walker state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalkState {
    /// No walk in flight.
    #[default]
    Idle,
    /// Level-1 read waiting for the bus.
    L1Command,
    /// Level-1 read in flight.
    L1Response,
    /// Level-0 read waiting for the bus.
    L0Command,
    /// Level-0 read in flight.
    L0Response,
}

/// A finished walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkResult {
    /// Port whose TLB receives the entry.
    pub port: MmuPort,
    /// Translation or fault entry.
    pub entry: TlbEntry,
}

/// The page-table walker.
#[derive(Clone, Debug, Default)]
pub struct PageTableWalker {
    state: WalkState,
    port: Option<MmuPort>,
    vaddr: VirtAddr,
    /// Physical page number of the table being read.
    table_ppn: u32,
    cancelled: bool,
    /// Walks started since reset.
    pub walks: u64,
}

impl PageTableWalker {
    /// Creates an idle walker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub const fn state(&self) -> WalkState {
        self.state
    }

    /// Returns true when a request would be granted.
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, WalkState::Idle)
    }

    /// Port and virtual address of the walk in flight.
    pub const fn current(&self) -> Option<(MmuPort, VirtAddr)> {
        match self.port {
            Some(port) if !self.is_idle() => Some((port, self.vaddr)),
            _ => None,
        }
    }

    /// Starts a walk for `va` on behalf of `port`.
    ///
    /// # Returns
    ///
    /// `true` if the walker was idle and took the request.
    pub fn request(&mut self, port: MmuPort, va: VirtAddr, root_ppn: u32) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.state = WalkState::L1Command;
        self.port = Some(port);
        self.vaddr = va;
        self.table_ppn = root_ppn;
        self.cancelled = false;
        self.walks += 1;
        debug!(?port, va = %va, "page walk start");
        true
    }

    fn pte_addr(&self, index: u32) -> u32 {
        let addr = (u64::from(self.table_ppn) << PAGE_SHIFT) + u64::from(index * PTE_SIZE);
        addr as u32
    }

    /// The page-table read waiting for the bus.
    pub fn bus_command(&self) -> Option<BusCommand> {
        match self.state {
            WalkState::L1Command => Some(BusCommand::read(self.pte_addr(self.vaddr.vpn1()), 1)),
            WalkState::L0Command => Some(BusCommand::read(self.pte_addr(self.vaddr.vpn0()), 1)),
            _ => None,
        }
    }

    /// Records acceptance of the page-table read.
    pub fn command_accepted(&mut self) {
        self.state = match self.state {
            WalkState::L1Command => WalkState::L1Response,
            WalkState::L0Command => WalkState::L0Response,
            other => other,
        };
    }

    /// Discards the result of the walk in flight. The bus transaction still
    /// completes, so the walker stays busy until it does.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            self.cancelled = true;
        }
    }

    /// Accepts the page-table read response.
    ///
    /// # Returns
    ///
    /// The entry to install once the walk finishes, unless it was cancelled.
    pub fn receive(&mut self, rsp: BusResponse) -> Option<WalkResult> {
        let level1 = match self.state {
            WalkState::L1Response => true,
            WalkState::L0Response => false,
            _ => return None,
        };
        let entry = if rsp.error {
            TlbEntry::faulting(self.vaddr, EntryFault::Access)
        } else {
            match self.classify(rsp.data, level1) {
                Some(entry) => entry,
                None => {
                    self.table_ppn = rsp.data >> PTE_PPN_SHIFT;
                    self.state = WalkState::L0Command;
                    return None;
                }
            }
        };
        self.finish(entry)
    }

    /// Turns a PTE into a TLB entry, or `None` for a level-1 pointer.
    fn classify(&self, pte: u32, level1: bool) -> Option<TlbEntry> {
        let page_fault = TlbEntry::faulting(self.vaddr, EntryFault::Page);
        if pte & PTE_V == 0 || (pte & PTE_W != 0 && pte & PTE_R == 0) {
            return Some(page_fault);
        }
        let ppn = pte >> PTE_PPN_SHIFT;
        let leaf = pte & (PTE_R | PTE_X) != 0;
        if !leaf {
            return if level1 { None } else { Some(page_fault) };
        }
        if level1 && ppn & 0x3FF != 0 {
            return Some(page_fault);
        }
        Some(TlbEntry {
            valid: true,
            fault: EntryFault::None,
            superpage: level1,
            vpn: self.vaddr.vpn(),
            ppn,
            r: pte & PTE_R != 0,
            w: pte & PTE_W != 0,
            x: pte & PTE_X != 0,
            u: pte & PTE_U != 0,
            a: pte & PTE_A != 0,
            d: pte & PTE_D != 0,
        })
    }

    fn finish(&mut self, entry: TlbEntry) -> Option<WalkResult> {
        let port = self.port.take();
        let cancelled = self.cancelled;
        self.state = WalkState::Idle;
        self.cancelled = false;
        if cancelled {
            debug!(va = %self.vaddr, "page walk discarded");
            return None;
        }
        debug!(?port, va = %self.vaddr, fault = ?entry.fault, superpage = entry.superpage, "page walk done");
        port.map(|port| WalkResult { port, entry })
    }

    /// Abandons any walk. Reset only.
    pub fn reset(&mut self) {
        self.state = WalkState::Idle;
        self.port = None;
        self.cancelled = false;
    }
}
