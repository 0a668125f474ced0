//! Memory Access (MEM) Stage.
//!
//! This module implements the fourth stage of the pipeline. It performs the following:
//! 1. **Translation:** Data-port TLB lookup; a miss requests the walker and redoes the
//!    instruction once the walker accepts.
//! 2. **Cached access:** Loads and LR read the data cache; a miss starts a line fill and
//!    redoes. Stores, SC and AMOs write through to the bus and merge into a hit line.
//! 3. **Uncached access:** Addresses in the IO window go straight to the bus.
//! 4. **Long-latency completion:** Multiply partial products are summed; the divider
//!    steps once per cycle while the stage holds.
//!
//! Bus writes and uncached reads are only issued when write-back holds nothing
//! that could still flush this instruction.

use crate::common::{AccessType, Trap, VirtAddr};
use crate::core::Cpu;
use crate::core::pipeline::latches::{ExMemEntry, MemPhase, MemWbEntry};
use crate::core::pipeline::signals::{AtomicOp, MemWidth, MicroOp};
use crate::core::units::cache::CacheLookup;
use crate::core::units::lsu::atomic::atomic_alu;
use crate::core::units::lsu::{byte_mask, extract_load, store_lanes};
use crate::core::units::mmu::{MmuPort, Translation, TranslationContext};
use crate::soc::{BusCommand, BusResponse};
use crate::stats::StallCause;

/// Full word byte enables.
const WORD_MASK: u8 = 0b1111;

/// What the memory stage wants this cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryOutput {
    /// The stage holds its instruction.
    pub halt: bool,
    /// Flush this instruction and everything younger, then refetch it.
    pub redo: bool,
    /// Entry for write-back when the stage completes.
    pub entry: Option<MemWbEntry>,
    /// Replacement latch content while the stage holds.
    pub latch: Option<ExMemEntry>,
    /// Data cache line to fill.
    pub fill: Option<u32>,
    /// Virtual address needing a walk.
    pub walk: Option<VirtAddr>,
    /// Bus command to issue and the phase to enter once accepted.
    pub command: Option<(BusCommand, MemPhase)>,
    /// Masked write to merge into the data cache on completion.
    pub cache_write: Option<(u32, u32, u8)>,
    /// Stall reason when halted.
    pub stall: Option<StallCause>,
    /// The access went through the DTLB.
    pub translated: bool,
    /// Data cache outcome: `Some(true)` hit, `Some(false)` miss.
    pub cache_hit: Option<bool>,
}

impl MemoryOutput {
    const fn hold(&mut self, cause: StallCause) {
        self.halt = true;
        self.stall = Some(cause);
    }
}

/// Builds the write-back entry for `ex` with `result`.
const fn complete(ex: &ExMemEntry, result: u32) -> MemWbEntry {
    MemWbEntry {
        pc: ex.pc,
        inst: ex.inst,
        op: ex.op,
        rd: ex.rd,
        rs1: ex.rs1,
        result,
        product: 0,
        operand: ex.operand,
        trap: ex.trap,
        injected: ex.injected,
    }
}

const fn with_trap(ex: &ExMemEntry, trap: Trap) -> MemWbEntry {
    let mut entry = complete(ex, 0);
    entry.trap = Some(trap);
    entry
}

/// Evaluates the memory stage.
///
/// # Arguments
///
/// * `cpu` - Core state at the start of the cycle.
/// * `rsp` - Data bus beat for a transaction this stage owns.
pub fn evaluate(cpu: &Cpu, rsp: Option<BusResponse>) -> MemoryOutput {
    let mut out = MemoryOutput::default();
    let Some(ex) = cpu.ex_mem else {
        return out;
    };
    if ex.trap.is_some() {
        out.entry = Some(complete(&ex, 0));
        return out;
    }

    match ex.phase {
        MemPhase::WaitAck {
            pa,
            data,
            mask,
            cached,
            old,
        } => {
            match rsp {
                None => out.hold(StallCause::Memory),
                Some(r) if r.error => out.entry = Some(with_trap(&ex, Trap::StoreAccessFault(ex.addr))),
                Some(_) => {
                    out.entry = Some(complete(&ex, old));
                    if cached {
                        out.cache_write = Some((pa, data, mask));
                    }
                }
            }
            return out;
        }
        MemPhase::WaitRead => {
            match rsp {
                None => out.hold(StallCause::Memory),
                Some(r) if r.error => out.entry = Some(with_trap(&ex, Trap::LoadAccessFault(ex.addr))),
                Some(r) => {
                    let value = match ex.op {
                        MicroOp::Load { width, unsigned, .. } => extract_load(r.data, ex.addr, width, unsigned),
                        _ => r.data,
                    };
                    out.entry = Some(complete(&ex, value));
                }
            }
            return out;
        }
        MemPhase::Start => {}
    }

    match ex.op {
        MicroOp::Load { width, unsigned, .. } => load(cpu, &ex, width, unsigned, &mut out),
        MicroOp::Store { width, .. } => store(cpu, &ex, width, &mut out),
        MicroOp::Atomic { op: AtomicOp::Lr } => load_reserved(cpu, &ex, &mut out),
        MicroOp::Atomic { op: AtomicOp::Sc } => store_conditional(cpu, &ex, &mut out),
        MicroOp::Atomic { op } => amo(cpu, &ex, op, &mut out),
        MicroOp::Mul { .. } => {
            let mut entry = complete(&ex, 0);
            entry.product = ex.mul.sum();
            out.entry = Some(entry);
        }
        MicroOp::Div { .. } if !ex.div.done() => {
            out.hold(StallCause::Divide);
            out.latch = Some(ExMemEntry {
                div: ex.div.step(),
                ..ex
            });
        }
        MicroOp::Div { .. } => out.entry = Some(complete(&ex, ex.div.result())),
        _ => out.entry = Some(complete(&ex, ex.result)),
    }
    out
}

/// Write-back holds a trap or a serialising instruction that could still
/// flush this one, so no side effect may leave the core yet.
fn side_effects_blocked(cpu: &Cpu) -> bool {
    cpu.mem_wb.is_some_and(|wb| wb.may_flush())
}

/// Translates the access; `None` when the outcome is already in `out`.
fn translate(cpu: &Cpu, ex: &ExMemEntry, access: AccessType, out: &mut MemoryOutput) -> Option<u32> {
    let va = VirtAddr::new(ex.addr);
    let ctx = TranslationContext::data(&cpu.csrs, cpu.privilege);
    out.translated = ctx.translates();
    match cpu.mmu.translate(MmuPort::Data, va, access, &ctx) {
        Translation::Hit(pa) => Some(pa.val()),
        Translation::Fault(trap) => {
            out.entry = Some(with_trap(ex, trap));
            None
        }
        Translation::Miss => {
            if cpu.mmu.walker.is_idle() {
                out.walk = Some(va);
                out.redo = true;
            } else {
                out.hold(StallCause::Memory);
            }
            None
        }
    }
}

/// A data cache miss: start the fill and redo, or wait for the loader.
fn cache_miss(cpu: &Cpu, pa: u32, out: &mut MemoryOutput) {
    out.cache_hit = Some(false);
    if cpu.dcache.can_start_fill() {
        out.fill = Some(pa);
        out.redo = true;
    } else {
        out.hold(StallCause::Memory);
    }
}

/// Issues a bus write if nothing older can still flush the instruction.
fn issue_write(cpu: &Cpu, pa: u32, data: u32, mask: u8, cached: bool, old: u32, out: &mut MemoryOutput) {
    out.hold(StallCause::Memory);
    if !side_effects_blocked(cpu) {
        let phase = MemPhase::WaitAck {
            pa,
            data,
            mask,
            cached,
            old,
        };
        out.command = Some((BusCommand::write(pa, data, mask), phase));
    }
}

fn load(cpu: &Cpu, ex: &ExMemEntry, width: MemWidth, unsigned: bool, out: &mut MemoryOutput) {
    let Some(pa) = translate(cpu, ex, AccessType::Read, out) else {
        return;
    };
    if cpu.io_window.contains(pa) {
        out.hold(StallCause::Memory);
        if !side_effects_blocked(cpu) {
            out.command = Some((BusCommand::read(pa, 1), MemPhase::WaitRead));
        }
        return;
    }
    match cpu.dcache.lookup(pa) {
        CacheLookup::Hit(word) => {
            out.cache_hit = Some(true);
            out.entry = Some(complete(ex, extract_load(word, ex.addr, width, unsigned)));
        }
        CacheLookup::Error => out.entry = Some(with_trap(ex, Trap::LoadAccessFault(ex.addr))),
        CacheLookup::Miss => cache_miss(cpu, pa, out),
    }
}

fn store(cpu: &Cpu, ex: &ExMemEntry, width: MemWidth, out: &mut MemoryOutput) {
    let Some(pa) = translate(cpu, ex, AccessType::Write, out) else {
        return;
    };
    let mask = byte_mask(ex.addr, width);
    let data = store_lanes(ex.addr, width, ex.operand);
    let cached = !cpu.io_window.contains(pa);
    if cached && cpu.dcache.fill_in_flight(pa) {
        out.hold(StallCause::Memory);
        return;
    }
    issue_write(cpu, pa, data, mask, cached, 0, out);
}

fn load_reserved(cpu: &Cpu, ex: &ExMemEntry, out: &mut MemoryOutput) {
    let Some(pa) = translate(cpu, ex, AccessType::Read, out) else {
        return;
    };
    if cpu.io_window.contains(pa) {
        out.entry = Some(with_trap(ex, Trap::LoadAccessFault(ex.addr)));
        return;
    }
    match cpu.dcache.lookup(pa) {
        CacheLookup::Hit(word) => {
            out.cache_hit = Some(true);
            out.entry = Some(complete(ex, word));
        }
        CacheLookup::Error => out.entry = Some(with_trap(ex, Trap::LoadAccessFault(ex.addr))),
        CacheLookup::Miss => cache_miss(cpu, pa, out),
    }
}

/// The reservation as it will stand once write-back retires.
const fn reservation_after_writeback(cpu: &Cpu) -> bool {
    match cpu.mem_wb {
        Some(wb) if wb.trap.is_none() => match wb.op {
            MicroOp::Atomic { op: AtomicOp::Lr } => true,
            MicroOp::Store { .. } | MicroOp::Atomic { .. } => false,
            _ => cpu.reservation,
        },
        _ => cpu.reservation,
    }
}

fn store_conditional(cpu: &Cpu, ex: &ExMemEntry, out: &mut MemoryOutput) {
    let Some(pa) = translate(cpu, ex, AccessType::Write, out) else {
        return;
    };
    if cpu.io_window.contains(pa) {
        out.entry = Some(with_trap(ex, Trap::StoreAccessFault(ex.addr)));
        return;
    }
    if !reservation_after_writeback(cpu) {
        out.entry = Some(complete(ex, 1));
        return;
    }
    if cpu.dcache.fill_in_flight(pa) {
        out.redo = true;
        return;
    }
    issue_write(cpu, pa, ex.operand, WORD_MASK, true, 0, out);
}

fn amo(cpu: &Cpu, ex: &ExMemEntry, op: AtomicOp, out: &mut MemoryOutput) {
    let Some(pa) = translate(cpu, ex, AccessType::Write, out) else {
        return;
    };
    if cpu.io_window.contains(pa) {
        out.entry = Some(with_trap(ex, Trap::StoreAccessFault(ex.addr)));
        return;
    }
    if cpu.dcache.fill_in_flight(pa) {
        out.redo = true;
        return;
    }
    match cpu.dcache.lookup(pa) {
        CacheLookup::Hit(old) => {
            out.cache_hit = Some(true);
            let new = atomic_alu(op, old, ex.operand);
            issue_write(cpu, pa, new, WORD_MASK, true, old, out);
        }
        CacheLookup::Error => out.entry = Some(with_trap(ex, Trap::StoreAccessFault(ex.addr))),
        CacheLookup::Miss => cache_miss(cpu, pa, out),
    }
}
