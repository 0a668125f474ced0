//! Memory Stage Tests.
//!
//! The stage is evaluated directly on a prepared core, so a fill can be put in
//! flight under an instruction that the in-order flow rarely lines up with it.
//! Read-modify-write accesses to the filling line take the redo path; a plain
//! store to it holds.

use pretty_assertions::assert_eq;
use rstest::rstest;
use vexsim_core::config::Config;
use vexsim_core::core::Cpu;
use vexsim_core::core::pipeline::latches::ExMemEntry;
use vexsim_core::core::pipeline::signals::{AtomicOp, MemWidth, MicroOp};
use vexsim_core::core::pipeline::stages::memory;
use vexsim_core::soc::BusCommand;

const LINE: u32 = 0x4001_0000;
const OTHER_LINE: u32 = 0x4001_0100;

fn at(addr: u32, op: MicroOp) -> ExMemEntry {
    ExMemEntry {
        pc: 0x4000_0040,
        op,
        rd: 5,
        rs1: 6,
        addr,
        operand: 0x1234_5678,
        ..ExMemEntry::default()
    }
}

fn core_filling(line: u32) -> Cpu {
    let mut cpu = Cpu::new(&Config::default());
    assert!(cpu.dcache.start_fill(line));
    assert!(cpu.dcache.fill_in_flight(line));
    cpu.reservation = true;
    cpu
}

// ══════════════════════════════════════════════════════════
// 1. Collision with an in-flight fill
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::sc(AtomicOp::Sc)]
#[case::amoadd(AtomicOp::Add)]
#[case::amoswap(AtomicOp::Swap)]
#[case::amomax(AtomicOp::Max)]
fn atomic_on_filling_line_redoes(#[case] op: AtomicOp) {
    let mut cpu = core_filling(LINE);
    cpu.ex_mem = Some(at(LINE + 8, MicroOp::Atomic { op }));

    let out = memory::evaluate(&cpu, None);
    assert!(out.redo);
    assert_eq!(out.command, None, "nothing reaches the bus");
    assert_eq!(out.entry, None);
    assert_eq!(out.fill, None, "the running fill is not restarted");
}

#[test]
fn store_on_filling_line_holds() {
    let mut cpu = core_filling(LINE);
    cpu.ex_mem = Some(at(
        LINE + 4,
        MicroOp::Store {
            width: MemWidth::Word,
            offset: 0,
        },
    ));

    let out = memory::evaluate(&cpu, None);
    assert!(!out.redo);
    assert!(out.halt);
    assert_eq!(out.command, None);
}

// ══════════════════════════════════════════════════════════
// 2. Fill to a different line
// ══════════════════════════════════════════════════════════

#[test]
fn sc_elsewhere_issues_its_write() {
    let mut cpu = core_filling(OTHER_LINE);
    cpu.ex_mem = Some(at(LINE, MicroOp::Atomic { op: AtomicOp::Sc }));

    let out = memory::evaluate(&cpu, None);
    assert!(!out.redo);
    assert_eq!(out.command.map(|(cmd, _)| cmd), Some(BusCommand::write(LINE, 0x1234_5678, 0b1111)));
}
