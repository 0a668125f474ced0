//! Forwarding Tests.
//!
//! The youngest pending writer of a register wins; a writer whose value is not
//! ready yet stalls the reader even if an older writer has a value.

use vexsim_core::common::Trap;
use vexsim_core::core::pipeline::hazards::{Forward, PendingWrite, forwarding_lookup, pending_write};
use vexsim_core::core::pipeline::latches::ExMemEntry;
use vexsim_core::core::pipeline::signals::{AluOp, MemWidth, MicroOp, MulOp, Operand};

fn ready(rd: usize, value: u32) -> PendingWrite {
    PendingWrite { rd, value: Some(value) }
}

fn not_ready(rd: usize) -> PendingWrite {
    PendingWrite { rd, value: None }
}

// ══════════════════════════════════════════════════════════
// 1. Lookup
// ══════════════════════════════════════════════════════════

#[test]
fn no_writer_reads_register_file() {
    assert_eq!(forwarding_lookup(5, &[ready(6, 1)]), Forward::None);
    assert_eq!(forwarding_lookup(5, &[]), Forward::None);
}

#[test]
fn x0_never_forwards() {
    assert_eq!(forwarding_lookup(0, &[ready(0, 42)]), Forward::None);
}

#[test]
fn youngest_writer_wins() {
    // Oldest first: write-back, memory, execute.
    let writers = [ready(3, 1), ready(3, 2), ready(4, 9)];
    assert_eq!(forwarding_lookup(3, &writers), Forward::Ready(2));

    let writers = [ready(3, 1), ready(3, 2), ready(3, 3)];
    assert_eq!(forwarding_lookup(3, &writers), Forward::Ready(3));
}

#[test]
fn young_unready_writer_shadows_older_value() {
    let writers = [ready(7, 100), not_ready(7)];
    assert_eq!(forwarding_lookup(7, &writers), Forward::NotReady);
}

#[test]
fn young_ready_writer_shadows_older_unready() {
    let writers = [not_ready(7), ready(7, 5)];
    assert_eq!(forwarding_lookup(7, &writers), Forward::Ready(5));
}

// ══════════════════════════════════════════════════════════
// 2. Pending writes from latch entries
// ══════════════════════════════════════════════════════════

fn entry(op: MicroOp, rd: usize) -> ExMemEntry {
    ExMemEntry {
        op,
        rd,
        result: 0xABCD,
        ..ExMemEntry::default()
    }
}

#[test]
fn alu_results_forward_from_execute() {
    let e = entry(MicroOp::Alu { op: AluOp::Add, src2: Operand::Reg }, 4);
    assert_eq!(pending_write(&e), Some(ready(4, 0xABCD)));
}

#[test]
fn late_results_are_not_ready() {
    let load = entry(
        MicroOp::Load {
            width: MemWidth::Word,
            unsigned: false,
            offset: 0,
        },
        4,
    );
    assert_eq!(pending_write(&load), Some(not_ready(4)));
    let mul = entry(MicroOp::Mul { op: MulOp::Mul }, 4);
    assert_eq!(pending_write(&mul), Some(not_ready(4)));
}

#[test]
fn trapping_or_non_writing_entries_are_ignored() {
    let mut e = entry(MicroOp::Alu { op: AluOp::Add, src2: Operand::Reg }, 4);
    e.trap = Some(Trap::IllegalInstruction(0));
    assert_eq!(pending_write(&e), None);

    let to_x0 = entry(MicroOp::Alu { op: AluOp::Add, src2: Operand::Reg }, 0);
    assert_eq!(pending_write(&to_x0), None);

    let store = entry(
        MicroOp::Store {
            width: MemWidth::Word,
            offset: 0,
        },
        4,
    );
    assert_eq!(pending_write(&store), None);
}
