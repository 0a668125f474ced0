//! Instruction Fetch (IF) Stage.
//!
//! Translates the program counter through the fetch port of the MMU, looks the
//! physical address up in the instruction cache and produces one `IfIdEntry`.
//! A TLB miss requests the walker and halts; a cache miss starts a line fill
//! and halts. Translation and access faults become a trapping entry, after
//! which fetch stays idle until the pipeline redirects it.

use crate::common::{AccessType, Trap, VirtAddr};
use crate::core::Cpu;
use crate::core::pipeline::latches::IfIdEntry;
use crate::core::units::cache::CacheLookup;
use crate::core::units::mmu::{MmuPort, Translation, TranslationContext};

/// What the fetch stage wants this cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchOutput {
    /// Fetch is running (the stage's `isValid`).
    pub active: bool,
    /// Fetch waits for a fill or a walk.
    pub halt: bool,
    /// The fetched entry, present when not halted.
    pub entry: Option<IfIdEntry>,
    /// Instruction cache line to fill.
    pub fill: Option<u32>,
    /// Virtual address needing a walk.
    pub walk: Option<VirtAddr>,
    /// The access went through the ITLB.
    pub translated: bool,
    /// The access hit in the instruction cache.
    pub cache_hit: bool,
}

/// Evaluates the fetch stage.
///
/// # Arguments
///
/// * `cpu` - Core state at the start of the cycle.
pub fn evaluate(cpu: &Cpu) -> FetchOutput {
    let mut out = FetchOutput::default();
    if cpu.fetch_blocked || cpu.wfi || cpu.debug.halt || cpu.debug.reset {
        return out;
    }
    out.active = true;

    let pc = cpu.pc;
    let va = VirtAddr::new(pc);
    let ctx = TranslationContext::fetch(&cpu.csrs, cpu.privilege);
    out.translated = ctx.translates();

    let trapped = |trap| IfIdEntry {
        pc,
        inst: 0,
        trap: Some(trap),
        injected: false,
    };

    let pa = match cpu.mmu.translate(MmuPort::Fetch, va, AccessType::Fetch, &ctx) {
        Translation::Hit(pa) => pa.val(),
        Translation::Fault(trap) => {
            out.entry = Some(trapped(trap));
            return out;
        }
        Translation::Miss => {
            out.halt = true;
            if cpu.mmu.walker.is_idle() {
                out.walk = Some(va);
            }
            return out;
        }
    };

    match cpu.icache.lookup(pa) {
        CacheLookup::Hit(inst) => {
            out.cache_hit = true;
            out.entry = Some(IfIdEntry {
                pc,
                inst,
                trap: None,
                injected: false,
            });
        }
        CacheLookup::Error => out.entry = Some(trapped(Trap::InstructionAccessFault(pc))),
        CacheLookup::Miss => {
            out.halt = true;
            if cpu.icache.can_start_fill() {
                out.fill = Some(pa);
            }
        }
    }
    out
}
