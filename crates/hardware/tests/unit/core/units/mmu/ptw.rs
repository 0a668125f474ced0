//! Page-Table Walker Tests.
//!
//! Drives the walker by hand: each level issues one word read, and the PTE
//! fed back decides whether the walk descends, finishes or faults.

use vexsim_core::common::VirtAddr;
use vexsim_core::core::units::mmu::MmuPort;
use vexsim_core::core::units::mmu::ptw::{PageTableWalker, WalkResult, WalkState};
use vexsim_core::core::units::mmu::tlb::EntryFault;
use vexsim_core::soc::{BusCommand, BusResponse};

// ══════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════

const PTE_V: u32 = 1;
const PTE_R: u32 = 1 << 1;
const PTE_W: u32 = 1 << 2;
const PTE_X: u32 = 1 << 3;
const PTE_U: u32 = 1 << 4;
const PTE_A: u32 = 1 << 6;
const PTE_D: u32 = 1 << 7;

const ROOT_PPN: u32 = 0x40100;
const VA: u32 = 0x0040_3123;

fn pte(ppn: u32, flags: u32) -> u32 {
    (ppn << 10) | flags
}

fn ok(data: u32) -> BusResponse {
    BusResponse { data, error: false }
}

/// Accepts the pending command and answers it.
fn answer(walker: &mut PageTableWalker, rsp: BusResponse) -> Option<WalkResult> {
    assert!(walker.bus_command().is_some());
    walker.command_accepted();
    walker.receive(rsp)
}

fn started() -> PageTableWalker {
    let mut walker = PageTableWalker::new();
    assert!(walker.request(MmuPort::Data, VirtAddr::new(VA), ROOT_PPN));
    walker
}

// ══════════════════════════════════════════════════════════
// 1. Successful walks
// ══════════════════════════════════════════════════════════

#[test]
fn two_level_walk_reads_both_levels() {
    let mut walker = started();
    // vpn1 = 1, vpn0 = 3
    assert_eq!(walker.bus_command(), Some(BusCommand::read((ROOT_PPN << 12) + 4, 1)));
    assert!(answer(&mut walker, ok(pte(0x40200, PTE_V))).is_none());
    assert_eq!(walker.state(), WalkState::L0Command);
    assert_eq!(walker.bus_command(), Some(BusCommand::read((0x40200 << 12) + 12, 1)));

    let result = answer(&mut walker, ok(pte(0x40333, PTE_V | PTE_R | PTE_W | PTE_U | PTE_A | PTE_D)))
        .expect("walk finishes");
    assert_eq!(result.port, MmuPort::Data);
    assert_eq!(result.entry.fault, EntryFault::None);
    assert!(!result.entry.superpage);
    assert_eq!(result.entry.physical(VirtAddr::new(VA)), 0x4033_3123);
    assert!(result.entry.r && result.entry.w && result.entry.u && result.entry.d);
    assert!(!result.entry.x);
    assert!(walker.is_idle());
    assert_eq!(walker.walks, 1);
}

#[test]
fn level1_leaf_is_superpage() {
    let mut walker = started();
    let result = answer(&mut walker, ok(pte(0x1000, PTE_V | PTE_X | PTE_A)))
        .expect("superpage");
    assert!(result.entry.superpage);
    assert!(result.entry.x);
}

// ══════════════════════════════════════════════════════════
// 2. Faults
// ══════════════════════════════════════════════════════════

#[test]
fn invalid_pte_faults() {
    let mut walker = started();
    let result = answer(&mut walker, ok(0)).expect("fault result");
    assert_eq!(result.entry.fault, EntryFault::Page);
}

#[test]
fn write_without_read_faults() {
    let mut walker = started();
    let result = answer(&mut walker, ok(pte(0x1000, PTE_V | PTE_W))).expect("fault result");
    assert_eq!(result.entry.fault, EntryFault::Page);
}

#[test]
fn misaligned_superpage_faults() {
    let mut walker = started();
    let result = answer(&mut walker, ok(pte(0x1001, PTE_V | PTE_R | PTE_A))).expect("fault result");
    assert_eq!(result.entry.fault, EntryFault::Page);
}

#[test]
fn pointer_at_level0_faults() {
    let mut walker = started();
    assert!(answer(&mut walker, ok(pte(0x40200, PTE_V))).is_none());
    let result = answer(&mut walker, ok(pte(0x40300, PTE_V))).expect("fault result");
    assert_eq!(result.entry.fault, EntryFault::Page);
}

#[test]
fn bus_error_is_access_fault() {
    let mut walker = started();
    assert!(answer(&mut walker, ok(pte(0x40200, PTE_V))).is_none());
    let result = answer(&mut walker, BusResponse { data: 0, error: true }).expect("fault result");
    assert_eq!(result.entry.fault, EntryFault::Access);
}

// ══════════════════════════════════════════════════════════
// 3. Token and cancellation
// ══════════════════════════════════════════════════════════

#[test]
fn busy_walker_refuses_requests() {
    let mut walker = started();
    assert!(!walker.request(MmuPort::Fetch, VirtAddr::new(0x1000), ROOT_PPN));
    assert_eq!(walker.current(), Some((MmuPort::Data, VirtAddr::new(VA))));
}

#[test]
fn cancelled_walk_finishes_without_result() {
    let mut walker = started();
    walker.command_accepted();
    walker.cancel();
    assert!(walker.receive(ok(pte(0x1000, PTE_V | PTE_R | PTE_A))).is_none());
    assert!(walker.is_idle());
    assert!(walker.request(MmuPort::Fetch, VirtAddr::new(0x1000), ROOT_PPN));
}

#[test]
fn response_without_command_is_ignored() {
    let mut walker = started();
    assert!(walker.receive(ok(0)).is_none());
    assert_eq!(walker.state(), WalkState::L1Command);
}
