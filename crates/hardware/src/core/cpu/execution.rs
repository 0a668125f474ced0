//! Main Execution Loop.
//!
//! This module implements one clock cycle of the core as two phases. It performs the following:
//! 1. **Compute:** Every stage evaluates against the state at the start of the cycle,
//!    write-back first so its pending write reaches the forwarding network.
//! 2. **Arbitration:** Stage halts, redos, traps, interrupts, debug requests and
//!    predictions become halt and flush flags, and the single fetch redirect is chosen.
//! 3. **Commit:** Bus responses are routed, write-back effects applied, latches moved,
//!    the PC updated and new bus commands issued.
//! 4. **Housekeeping:** Interrupt lines are sampled, flush sweeps advance and counters update.
//!
//! Nothing is written during the compute phase, so no stage observes another
//! stage's output of the same cycle except through the returned values.

use tracing::trace;

use super::Cpu;
use super::bus::BusClient;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::{SimError, Trap};
use crate::core::arch::trap::select_interrupt;
use crate::core::pipeline::arbitration::{Arbitration, Stage};
use crate::core::pipeline::hazards::{PendingWrite, pending_write};
use crate::core::pipeline::latches::IfIdEntry;
use crate::core::pipeline::signals::{AtomicOp, MicroOp};
use crate::core::pipeline::stages::{
    DecodeOutput, ExecuteOutput, FetchOutput, MemoryOutput, WbAction, WritebackOutput, decode,
    execute, fetch, memory, writeback,
};
use crate::core::units::mmu::MmuPort;
use crate::soc::{Bus, BusPort, BusResponse};
use crate::stats::StallCause;

/// Everything the compute phase produced for one cycle.
struct CycleOutputs {
    fetch: FetchOutput,
    decode: DecodeOutput,
    execute: ExecuteOutput,
    memory: MemoryOutput,
    writeback: Option<WritebackOutput>,
    /// Interrupt the core will take this cycle.
    interrupt: Option<Trap>,
    /// Interrupt selected but waiting for execute, memory and write-back to drain.
    interrupt_pending: bool,
    /// Decode is rewound for a debug halt or breakpoint.
    debug_rewind: bool,
    /// Redirect chosen below write-back and interrupts.
    redirect: Option<u32>,
}

impl Cpu {
    /// Advances the core by one clock cycle.
    ///
    /// # Arguments
    ///
    /// * `bus` - The memory environment. The caller ticks it after the core.
    ///
    /// # Errors
    ///
    /// [`SimError::ArbitrationInconsistency`] if the arbitration network lets
    /// two instructions claim the same latch.
    pub fn tick(&mut self, bus: &mut dyn Bus) -> Result<(), SimError> {
        if self.debug.reset {
            self.reset();
            self.drain_responses(bus);
            self.stats.cycles += 1;
            return Ok(());
        }

        let irsp = if self.ibus.is_busy() {
            bus.response(BusPort::Instruction)
        } else {
            None
        };
        let drsp = if self.dbus.is_busy() {
            bus.response(BusPort::Data)
        } else {
            None
        };
        let mem_rsp = drsp.filter(|_| self.dbus.owner() == Some(BusClient::MemoryStage));

        let mut out = self.compute(mem_rsp);
        let arb = self.arbitrate(&mut out);
        arb.check(self.stats.cycles)?;

        self.route_responses(irsp, drsp);
        // The bus already holds the write, so the line follows it even if M is flushed.
        if let Some((pa, data, mask)) = out.memory.cache_write {
            self.dcache.write_hit(pa, data, mask);
        }
        self.request_fills(&arb, &out);
        let redirect = self.commit_writeback(&out);
        self.move_latches(&arb, &out, redirect);
        self.issue_bus(bus, &arb, &out);
        self.housekeeping(&arb, &out, redirect);
        Ok(())
    }

    /// Drops response beats of transactions abandoned by a reset.
    fn drain_responses(&mut self, bus: &mut dyn Bus) {
        if self.ibus.is_busy() && bus.response(BusPort::Instruction).is_some() {
            let _ = self.ibus.route();
        }
        if self.dbus.is_busy() && bus.response(BusPort::Data).is_some() {
            let _ = self.dbus.route();
        }
    }

    /// Compute phase: evaluates every stage on the current state.
    fn compute(&self, mem_rsp: Option<BusResponse>) -> CycleOutputs {
        let wb = writeback::evaluate(self);
        let mem = memory::evaluate(self, mem_rsp);
        let ex = execute::evaluate(self);

        let writers: Vec<PendingWrite> = [
            wb.and_then(|w| w.pending_write()),
            self.ex_mem.as_ref().and_then(pending_write),
            ex.entry.as_ref().and_then(pending_write),
        ]
        .into_iter()
        .flatten()
        .collect();
        let dec = decode::evaluate(self, &writers);
        let fet = fetch::evaluate(self);

        let selected = if self.debug.allows_interrupts() {
            select_interrupt(
                self.pending_interrupts(),
                self.csrs.mideleg,
                self.csrs.mstatus,
                self.privilege,
            )
        } else {
            None
        };
        let drained = self.id_ex.is_none() && self.ex_mem.is_none() && self.mem_wb.is_none();

        CycleOutputs {
            fetch: fet,
            decode: dec,
            execute: ex,
            memory: mem,
            writeback: wb,
            interrupt: selected.filter(|_| drained),
            interrupt_pending: selected.is_some() && !drained,
            debug_rewind: false,
            redirect: None,
        }
    }

    /// Turns the stage outputs into arbitration flags and picks the redirect.
    fn arbitrate(&self, out: &mut CycleOutputs) -> Arbitration {
        let mut arb = Arbitration::new([
            out.fetch.active,
            self.if_id.is_some(),
            self.id_ex.is_some(),
            self.ex_mem.is_some(),
            self.mem_wb.is_some(),
        ]);

        if out.fetch.halt {
            arb.halt(Stage::Fetch);
        }
        if out.decode.halt {
            arb.halt(Stage::Decode);
        }
        if out.interrupt_pending {
            arb.hold(Stage::Decode);
        }
        if out.memory.halt {
            arb.halt(Stage::Memory);
        }
        if out.memory.redo {
            arb.flush_it(Stage::Memory);
        }
        if out.writeback.is_some_and(|w| w.action.flushes()) {
            arb.flush_next(Stage::WriteBack);
        }
        if out.interrupt.is_some() {
            arb.flush_it(Stage::Decode);
        }
        let mispredict = out.execute.mispredict.filter(|_| arb.is_firing(Stage::Execute));
        if mispredict.is_some() {
            arb.flush_next(Stage::Execute);
        }

        let rewind_pc = self
            .if_id
            .filter(|e| !e.injected)
            .filter(|_| self.debug.halt || out.decode.breakpoint)
            .filter(|_| !arb.is_flushed_by_older(Stage::Decode))
            .map(|e| e.pc);
        if rewind_pc.is_some() {
            arb.flush_it(Stage::Decode);
            out.debug_rewind = true;
        }

        let prediction = out.decode.redirect.filter(|_| arb.is_firing(Stage::Decode));
        if prediction.is_some() {
            arb.flush_next(Stage::Decode);
        }

        let redo_pc = self
            .ex_mem
            .filter(|_| out.memory.redo && !arb.is_flushed_by_older(Stage::Memory))
            .map(|e| e.pc);
        out.redirect = redo_pc.or(mispredict).or(rewind_pc).or(prediction);
        arb
    }

    /// Hands response beats to the unit that owns each port's transaction.
    fn route_responses(&mut self, irsp: Option<BusResponse>, drsp: Option<BusResponse>) {
        if let Some(rsp) = irsp {
            if self.ibus.route() == Some(BusClient::InstructionCache) {
                self.icache.receive(rsp);
            }
        }
        if let Some(rsp) = drsp {
            match self.dbus.route() {
                Some(BusClient::DataCache) => self.dcache.receive(rsp),
                Some(BusClient::Walker) => {
                    if let Some(result) = self.mmu.walker.receive(rsp) {
                        self.mmu.install(result);
                    }
                }
                _ => {}
            }
        }
    }

    /// Starts the fills and walks the stages asked for. The data port is
    /// served first at the walker.
    fn request_fills(&mut self, arb: &Arbitration, out: &CycleOutputs) {
        let root = self.csrs.root_ppn();
        if !arb.is_flushed_by_older(Stage::Memory) {
            if let Some(pa) = out.memory.fill {
                if self.dcache.start_fill(pa) {
                    self.stats.dcache_misses += 1;
                }
            }
            if let Some(va) = out.memory.walk {
                if self.mmu.request_walk(MmuPort::Data, va, root) {
                    self.stats.tlb_misses += 1;
                }
            }
        }
        if !arb.is_flushed_by_older(Stage::Fetch) {
            if let Some(pa) = out.fetch.fill {
                if self.icache.start_fill(pa) {
                    self.stats.icache_misses += 1;
                }
            }
            if let Some(va) = out.fetch.walk {
                if self.mmu.request_walk(MmuPort::Fetch, va, root) {
                    self.stats.tlb_misses += 1;
                }
            }
        }
    }

    /// Applies the write-back stage and takes a pending interrupt.
    ///
    /// # Returns
    ///
    /// The redirect for fetch, write-back and interrupts taking precedence
    /// over the one chosen during arbitration.
    fn commit_writeback(&mut self, out: &CycleOutputs) -> Option<u32> {
        self.csrs.mcycle = self.csrs.mcycle.wrapping_add(1);

        let Some(wb) = out.writeback else {
            if let Some(irq) = out.interrupt {
                let epc = self.if_id.map_or(self.pc, |e| e.pc);
                return Some(self.commit_trap(irq, epc));
            }
            return out.redirect;
        };
        let entry = wb.entry;

        if let WbAction::Trap(trap) = wb.action {
            return Some(self.commit_trap(trap, entry.pc));
        }

        if let Some((rd, value)) = wb.rd_write {
            self.regs.write(rd, value);
            if entry.injected {
                self.debug.inject_result = value;
            }
        }
        self.csrs.minstret = self.csrs.minstret.wrapping_add(1);
        self.stats.instructions_retired += 1;
        match entry.op {
            MicroOp::Atomic { op: AtomicOp::Lr } => self.reservation = true,
            MicroOp::Store { .. } | MicroOp::Atomic { .. } => self.reservation = false,
            _ => {}
        }
        if !entry.injected {
            self.debug.last_pc = entry.pc;
            self.debug.last_inst = entry.inst;
        }
        if self.trace {
            trace!(
                pc = format_args!("{:#010x}", entry.pc),
                inst = format_args!("{:#010x}", entry.inst),
                rd = ?wb.rd_write,
                "retire"
            );
        }

        let restart = if entry.injected {
            entry.pc
        } else {
            entry.pc.wrapping_add(INSTRUCTION_SIZE)
        };
        match wb.action {
            WbAction::Retire | WbAction::Trap(_) => out.redirect,
            WbAction::Csr { addr, value } => {
                if let Some(value) = value {
                    self.csr_write(addr, value);
                }
                Some(restart)
            }
            WbAction::Mret => Some(self.mret()),
            WbAction::Sret => Some(self.sret()),
            WbAction::Wfi => {
                self.wfi = true;
                Some(restart)
            }
            WbAction::SfenceVma => {
                self.mmu.invalidate();
                Some(restart)
            }
            WbAction::FenceI => {
                self.icache.request_flush();
                Some(restart)
            }
            WbAction::DcacheFlush => {
                self.dcache.request_flush();
                Some(restart)
            }
        }
    }

    /// Moves every latch according to the arbitration and updates the PC.
    fn move_latches(&mut self, arb: &Arbitration, out: &CycleOutputs, redirect: Option<u32>) {
        let decode_issued = arb.is_firing(Stage::Decode) && self.if_id.is_some_and(|e| !e.injected);
        let breakpoint = out.debug_rewind && out.decode.breakpoint;
        let break_pc = self.if_id.map_or(self.pc, |e| e.pc);
        // An injected word cannot be refetched, so a redo hands it back to the debug unit.
        let requeue = self
            .ex_mem
            .filter(|e| e.injected && out.memory.redo && !arb.is_flushed_by_older(Stage::Memory))
            .map(|e| e.inst);

        self.mem_wb = if arb.is_firing(Stage::Memory) {
            out.memory.entry
        } else {
            None
        };
        self.ex_mem = if arb.is_firing(Stage::Execute) {
            out.execute.entry
        } else if arb.keeps(Stage::Memory) {
            out.memory.latch.or(self.ex_mem)
        } else {
            None
        };
        self.id_ex = if arb.is_firing(Stage::Decode) {
            out.decode.entry
        } else if arb.keeps(Stage::Execute) {
            self.id_ex
        } else {
            None
        };
        self.if_id = if arb.is_firing(Stage::Fetch) {
            out.fetch.entry
        } else if arb.keeps(Stage::Decode) {
            self.if_id
        } else {
            None
        };

        if let Some(target) = redirect {
            self.pc = target;
            self.fetch_blocked = false;
        } else if arb.is_firing(Stage::Fetch) {
            self.pc = self.pc.wrapping_add(INSTRUCTION_SIZE);
            if out.fetch.entry.is_some_and(|e| e.trap.is_some()) {
                self.fetch_blocked = true;
            }
        }

        if decode_issued {
            self.debug.instruction_issued();
        }
        if breakpoint {
            self.debug.enter_breakpoint(break_pc);
        }
        if let Some(inst) = requeue {
            self.debug.inject = Some(inst);
        }
        if self.if_id.is_none() && self.debug.halt {
            if let Some(inst) = self.debug.inject.take() {
                trace!(pc = format_args!("{:#010x}", self.pc), inst = format_args!("{inst:#010x}"), "inject");
                self.if_id = Some(IfIdEntry {
                    pc: self.pc,
                    inst,
                    trap: None,
                    injected: true,
                });
            }
        }
    }

    /// Issues new bus commands on idle ports. On the data port the line
    /// loader beats the walker, which beats the memory stage.
    fn issue_bus(&mut self, bus: &mut dyn Bus, arb: &Arbitration, out: &CycleOutputs) {
        if !self.ibus.is_busy() {
            if let Some(cmd) = self.icache.bus_command() {
                if bus.issue(BusPort::Instruction, cmd) {
                    self.icache.command_accepted();
                    self.ibus.accept(BusClient::InstructionCache, cmd.beats());
                }
            }
        }

        if self.dbus.is_busy() {
            return;
        }
        if let Some(cmd) = self.dcache.bus_command() {
            if bus.issue(BusPort::Data, cmd) {
                self.dcache.command_accepted();
                self.dbus.accept(BusClient::DataCache, cmd.beats());
            }
        } else if let Some(cmd) = self.mmu.walker.bus_command() {
            if bus.issue(BusPort::Data, cmd) {
                self.mmu.walker.command_accepted();
                self.dbus.accept(BusClient::Walker, cmd.beats());
            }
        } else if let Some((cmd, phase)) = out.memory.command.filter(|_| arb.keeps(Stage::Memory)) {
            if bus.issue(BusPort::Data, cmd) {
                self.dbus.accept(BusClient::MemoryStage, cmd.beats());
                if let Some(entry) = self.ex_mem.as_mut() {
                    entry.phase = phase;
                }
            }
        }
    }

    /// End-of-cycle bookkeeping.
    fn housekeeping(&mut self, arb: &Arbitration, out: &CycleOutputs, redirect: Option<u32>) {
        self.csrs.irq_pending = self.irq_lines;
        self.icache.tick_flush();
        self.dcache.tick_flush();
        if self.wfi && self.pending_interrupts() != 0 {
            self.wfi = false;
        }

        let stats = &mut self.stats;
        stats.cycles += 1;
        if redirect.is_some() {
            stats.flushes += 1;
        }
        if arb.is_valid(Stage::Fetch) && out.fetch.halt {
            stats.record_stall(StallCause::Fetch);
        }
        if arb.is_valid(Stage::Decode) && out.decode.halt {
            stats.record_stall(StallCause::Hazard);
        }
        if out.interrupt_pending {
            stats.record_stall(StallCause::Interrupt);
        }
        if let Some(cause) = out.memory.stall {
            stats.record_stall(cause);
        }
        if out.memory.redo && !arb.is_flushed_by_older(Stage::Memory) {
            stats.redo_count += 1;
        }
        if arb.is_firing(Stage::Execute) {
            if let Some((pc, taken)) = out.execute.branch {
                self.predictor.update(pc, taken);
                stats.branch_predictions += 1;
            }
            if out.execute.mispredict.is_some() {
                stats.branch_mispredictions += 1;
            }
        }
        if arb.is_firing(Stage::Fetch) {
            stats.icache_hits += u64::from(out.fetch.cache_hit);
            stats.tlb_hits += u64::from(out.fetch.translated);
        }
        if arb.is_firing(Stage::Memory) {
            stats.dcache_hits += u64::from(out.memory.cache_hit == Some(true));
            stats.tlb_hits += u64::from(out.memory.translated && out.memory.entry.is_some());
        }
        stats.icache_fills = self.icache.fills;
        stats.dcache_fills = self.dcache.fills;
        stats.walks = self.mmu.walker.walks;
    }
}
