//! Arbitration Network Tests.
//!
//! Stalls propagate to younger stages, flushes remove a stage and everything
//! younger, and the next-cycle validity of each latch follows from who fires.

use vexsim_core::common::SimError;
use vexsim_core::core::pipeline::arbitration::{Arbitration, Stage};

fn full() -> Arbitration {
    Arbitration::new([true; 5])
}

// ══════════════════════════════════════════════════════════
// 1. Stalls
// ══════════════════════════════════════════════════════════

#[test]
fn everything_fires_when_nothing_halts() {
    let arb = full();
    for stage in Stage::ALL {
        assert!(arb.is_firing(stage), "{stage:?}");
        assert!(arb.next_valid(stage) || stage == Stage::Fetch);
    }
    assert!(arb.check(0).is_ok());
}

#[test]
fn halt_stalls_younger_stages() {
    let mut arb = full();
    arb.halt(Stage::Memory);
    assert!(arb.is_stuck(Stage::Fetch));
    assert!(arb.is_stuck(Stage::Execute));
    assert!(arb.is_stuck(Stage::Memory));
    assert!(!arb.is_stuck(Stage::WriteBack));
    assert!(arb.keeps(Stage::Memory));
    assert!(!arb.next_valid(Stage::WriteBack), "write-back drains into a bubble");
    assert!(arb.check(1).is_ok());
}

#[test]
fn halt_of_empty_stage_does_not_stall() {
    let mut arb = Arbitration::new([true, true, false, true, true]);
    arb.halt(Stage::Execute);
    assert!(!arb.is_stuck(Stage::Decode));
    assert!(arb.is_firing(Stage::Decode));
    assert!(arb.next_valid(Stage::Execute));
}

#[test]
fn hold_counts_as_stall() {
    let mut arb = full();
    arb.hold(Stage::Decode);
    assert!(arb.is_stuck(Stage::Fetch));
    assert!(!arb.is_firing(Stage::Decode));
    assert!(arb.is_firing(Stage::Execute));
    assert!(!arb.next_valid(Stage::Execute));
}

// ══════════════════════════════════════════════════════════
// 2. Flushes
// ══════════════════════════════════════════════════════════

#[test]
fn flush_it_removes_stage_and_younger() {
    let mut arb = full();
    arb.flush_it(Stage::Memory);
    assert!(arb.is_removed(Stage::Memory));
    assert!(arb.is_removed(Stage::Fetch));
    assert!(!arb.is_removed(Stage::WriteBack));
    assert!(!arb.next_valid(Stage::WriteBack));
    assert!(!arb.next_valid(Stage::Memory));
}

#[test]
fn flush_next_spares_the_stage() {
    let mut arb = full();
    arb.flush_next(Stage::Execute);
    assert!(arb.is_firing(Stage::Execute));
    assert!(arb.next_valid(Stage::Memory));
    assert!(arb.is_removed(Stage::Decode));
    assert!(!arb.next_valid(Stage::Execute));
}

#[test]
fn flush_overrides_stall() {
    let mut arb = full();
    arb.halt(Stage::Decode);
    arb.flush_next(Stage::Execute);
    assert!(!arb.keeps(Stage::Decode));
    assert!(!arb.next_valid(Stage::Decode));
    assert!(arb.check(2).is_ok());
}

// ══════════════════════════════════════════════════════════
// 3. Consistency
// ══════════════════════════════════════════════════════════

#[test]
fn derived_flags_never_fire_into_a_kept_stage() {
    // Every combination of validity, halts and flushes below write-back.
    for bits in 0u32..(1 << 17) {
        let valid = std::array::from_fn(|i| bits & (1 << i) != 0);
        let mut arb = Arbitration::new(valid);
        for (i, stage) in Stage::ALL[..4].iter().enumerate() {
            if bits & (1 << (5 + i)) != 0 {
                arb.halt(*stage);
            }
            if bits & (1 << (9 + i)) != 0 {
                arb.flush_it(*stage);
            }
            if bits & (1 << (13 + i)) != 0 {
                arb.flush_next(*stage);
            }
        }
        assert!(arb.check(u64::from(bits)).is_ok(), "bits {bits:#x}");
        for pair in Stage::ALL.windows(2) {
            assert!(!(arb.is_firing(pair[0]) && arb.keeps(pair[1])));
        }
    }
}

#[test]
fn stuck_writeback_is_inconsistent() {
    let mut arb = full();
    arb.halt(Stage::WriteBack);
    match arb.check(9) {
        Err(SimError::ArbitrationInconsistency { cycle, successor, .. }) => {
            assert_eq!(cycle, 9);
            assert_eq!(successor, "writeback");
        }
        other => panic!("expected inconsistency, got {other:?}"),
    }
}
