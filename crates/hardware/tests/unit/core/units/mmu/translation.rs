//! Translation Tests.
//!
//! Permission checks run on every lookup against the current context, so
//! privilege, `SUM` and `MXR` changes apply to entries already in a TLB.

use proptest::prelude::*;
use rstest::rstest;
use vexsim_core::common::{AccessType, PhysAddr, Trap, VirtAddr};
use vexsim_core::core::arch::csr::{
    Csrs, MSTATUS_MPP_SHIFT, MSTATUS_MPRV, SATP_MODE_SV32,
};
use vexsim_core::core::arch::mode::PrivilegeMode;
use vexsim_core::core::units::mmu::tlb::{EntryFault, TlbEntry};
use vexsim_core::core::units::mmu::ptw::WalkResult;
use vexsim_core::core::units::mmu::{Mmu, MmuPort, Translation, TranslationContext, check_entry};
use vexsim_core::soc::BusResponse;

// ══════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════

const VA: u32 = 0x0001_2345;

fn ctx(privilege: PrivilegeMode, sum: bool, mxr: bool) -> TranslationContext {
    TranslationContext {
        privilege,
        paging: true,
        root_ppn: 0,
        sum,
        mxr,
    }
}

fn entry(r: bool, w: bool, x: bool, u: bool) -> TlbEntry {
    TlbEntry {
        valid: true,
        vpn: VA >> 12,
        ppn: 0x40055,
        r,
        w,
        x,
        u,
        a: true,
        d: true,
        ..TlbEntry::default()
    }
}

fn check(e: &TlbEntry, access: AccessType, c: &TranslationContext) -> Result<PhysAddr, Trap> {
    check_entry(e, VirtAddr::new(VA), access, c)
}

// ══════════════════════════════════════════════════════════
// 1. Permission checks
// ══════════════════════════════════════════════════════════

#[test]
fn permitted_access_translates() {
    let e = entry(true, true, false, true);
    let c = ctx(PrivilegeMode::User, false, false);
    assert_eq!(check(&e, AccessType::Read, &c), Ok(PhysAddr::new(0x4005_5345)));
    assert_eq!(check(&e, AccessType::Write, &c), Ok(PhysAddr::new(0x4005_5345)));
}

#[rstest]
#[case(AccessType::Fetch, Trap::InstructionPageFault(VA))]
#[case(AccessType::Read, Trap::LoadPageFault(VA))]
#[case(AccessType::Write, Trap::StorePageFault(VA))]
fn user_cannot_touch_supervisor_pages(#[case] access: AccessType, #[case] trap: Trap) {
    let e = entry(true, true, true, false);
    assert_eq!(check(&e, access, &ctx(PrivilegeMode::User, false, false)), Err(trap));
}

#[test]
fn supervisor_needs_sum_for_user_data() {
    let e = entry(true, true, true, true);
    assert!(check(&e, AccessType::Read, &ctx(PrivilegeMode::Supervisor, false, false)).is_err());
    assert!(check(&e, AccessType::Read, &ctx(PrivilegeMode::Supervisor, true, false)).is_ok());
    assert!(
        check(&e, AccessType::Fetch, &ctx(PrivilegeMode::Supervisor, true, false)).is_err(),
        "SUM never permits fetching user pages"
    );
}

#[test]
fn mxr_makes_executable_readable() {
    let e = entry(false, false, true, false);
    let s = PrivilegeMode::Supervisor;
    assert!(check(&e, AccessType::Read, &ctx(s, false, false)).is_err());
    assert!(check(&e, AccessType::Read, &ctx(s, false, true)).is_ok());
}

#[test]
fn write_requires_dirty_and_access_requires_accessed() {
    let s = ctx(PrivilegeMode::Supervisor, false, false);
    let clean = TlbEntry { d: false, ..entry(true, true, false, false) };
    assert!(check(&clean, AccessType::Read, &s).is_ok());
    assert_eq!(check(&clean, AccessType::Write, &s), Err(Trap::StorePageFault(VA)));
    let unaccessed = TlbEntry { a: false, ..entry(true, true, false, false) };
    assert_eq!(check(&unaccessed, AccessType::Read, &s), Err(Trap::LoadPageFault(VA)));
}

#[test]
fn recorded_faults_replay() {
    let s = ctx(PrivilegeMode::Supervisor, false, false);
    let page = TlbEntry::faulting(VirtAddr::new(VA), EntryFault::Page);
    let access = TlbEntry::faulting(VirtAddr::new(VA), EntryFault::Access);
    assert_eq!(check(&page, AccessType::Fetch, &s), Err(Trap::InstructionPageFault(VA)));
    assert_eq!(check(&access, AccessType::Write, &s), Err(Trap::StoreAccessFault(VA)));
}

// ══════════════════════════════════════════════════════════
// 2. Context
// ══════════════════════════════════════════════════════════

#[test]
fn machine_mode_bypasses_translation() {
    let mmu = Mmu::new(4);
    let c = ctx(PrivilegeMode::Machine, false, false);
    assert!(!c.translates());
    assert_eq!(
        mmu.translate(MmuPort::Data, VirtAddr::new(VA), AccessType::Read, &c),
        Translation::Hit(PhysAddr::new(VA))
    );
}

#[test]
fn mprv_applies_to_data_only() {
    let mut csrs = Csrs::new();
    csrs.satp = SATP_MODE_SV32;
    csrs.mstatus = MSTATUS_MPRV | (PrivilegeMode::User.to_bits() << MSTATUS_MPP_SHIFT);
    let data = TranslationContext::data(&csrs, PrivilegeMode::Machine);
    let fetch = TranslationContext::fetch(&csrs, PrivilegeMode::Machine);
    assert_eq!(data.privilege, PrivilegeMode::User);
    assert!(data.translates());
    assert!(!fetch.translates());
}

#[test]
fn tlb_miss_then_install() {
    let mut mmu = Mmu::new(4);
    let c = ctx(PrivilegeMode::Supervisor, false, false);
    let va = VirtAddr::new(VA);
    assert_eq!(mmu.translate(MmuPort::Data, va, AccessType::Read, &c), Translation::Miss);

    mmu.install(WalkResult {
        port: MmuPort::Data,
        entry: entry(true, false, false, false),
    });
    assert_eq!(
        mmu.translate(MmuPort::Data, va, AccessType::Read, &c),
        Translation::Hit(PhysAddr::new(0x4005_5345))
    );
    assert_eq!(
        mmu.translate(MmuPort::Fetch, va, AccessType::Fetch, &c),
        Translation::Miss,
        "ports keep separate TLBs"
    );

    mmu.invalidate();
    assert_eq!(mmu.translate(MmuPort::Data, va, AccessType::Read, &c), Translation::Miss);
}

// ══════════════════════════════════════════════════════════
// 3. Invalidation
// ══════════════════════════════════════════════════════════

fn leaf(vpn: u32, superpage: bool) -> TlbEntry {
    TlbEntry {
        valid: true,
        superpage,
        vpn,
        ppn: if superpage { 0x40000 } else { 0x40055 },
        r: true,
        w: true,
        x: true,
        a: true,
        d: true,
        ..TlbEntry::default()
    }
}

fn install_strategy() -> impl Strategy<Value = (bool, u32, bool)> {
    (any::<bool>(), 0u32..0x40, prop::bool::weighted(0.2))
}

proptest! {
    #[test]
    fn invalidate_leaves_no_translation(
        installs in prop::collection::vec(install_strategy(), 1..16),
        probes in prop::collection::vec(0u32..0x40, 1..16),
    ) {
        let mut mmu = Mmu::new(4);
        let c = ctx(PrivilegeMode::Supervisor, false, false);
        for &(fetch, vpn, superpage) in &installs {
            let port = if fetch { MmuPort::Fetch } else { MmuPort::Data };
            mmu.install(WalkResult { port, entry: leaf(vpn, superpage) });
        }
        mmu.invalidate();
        for vpn in probes {
            let va = VirtAddr::new(vpn << 12);
            prop_assert_eq!(mmu.translate(MmuPort::Data, va, AccessType::Read, &c), Translation::Miss);
            prop_assert_eq!(mmu.translate(MmuPort::Fetch, va, AccessType::Fetch, &c), Translation::Miss);
        }
    }

    #[test]
    fn latest_install_wins(installs in prop::collection::vec(install_strategy(), 1..16)) {
        let mut mmu = Mmu::new(4);
        for &(_, vpn, superpage) in &installs {
            mmu.install(WalkResult { port: MmuPort::Data, entry: leaf(vpn, superpage) });
        }
        let &(_, vpn, superpage) = installs.last().expect("non-empty");
        let hit = mmu.tlb(MmuPort::Data).lookup(VirtAddr::new(vpn << 12)).copied();
        prop_assert_eq!(hit, Some(leaf(vpn, superpage)));
    }
}

#[test]
fn invalidate_discards_walk_in_flight() {
    let mut mmu = Mmu::new(4);
    let va = VirtAddr::new(VA);
    assert!(mmu.request_walk(MmuPort::Data, va, 0x40200));
    mmu.walker.command_accepted();
    mmu.invalidate();
    assert!(!mmu.walker.is_idle(), "the read is still on the bus");

    let superpage = (0x40000 << 10) | 0xCF;
    assert_eq!(mmu.walker.receive(BusResponse { data: superpage, error: false }), None);
    assert!(mmu.walker.is_idle());
    let c = ctx(PrivilegeMode::Supervisor, false, false);
    assert_eq!(mmu.translate(MmuPort::Data, va, AccessType::Read, &c), Translation::Miss);
}
