//! CPU core definition and initialization.
//!
//! This module defines the central `Cpu` structure, the container for the
//! whole processor state. It coordinates the following:
//! 1. **State Management:** Registers, program counter, privilege and the LR/SC reservation.
//! 2. **Pipeline Control:** The four inter-stage latches and the fetch redirect state.
//! 3. **Memory Hierarchy:** Instruction and data caches, the MMU and bus port ownership.
//! 4. **External Control:** Interrupt lines, the reset vector and the debug unit.
//!
//! The memory environment is not owned by the core; [`Cpu::tick`] borrows it
//! through the [`Bus`](crate::soc::Bus) trait.

/// Bus port ownership.
pub mod bus;

/// Privileged CSR access.
pub mod csr;

/// Debug control unit.
pub mod debug;

/// Cycle orchestration: compute and commit phases.
pub mod execution;

/// Trap entry and return.
pub mod trap;

use tracing::debug;

use self::bus::PortState;
use self::debug::DebugUnit;
use crate::config::{Config, Region};
use crate::core::arch::csr::Csrs;
use crate::core::arch::gpr::Gpr;
use crate::core::arch::mode::PrivilegeMode;
use crate::core::pipeline::latches::{ExMemEntry, IdExEntry, IfIdEntry, MemWbEntry};
use crate::core::units::bru::BranchPredictor;
use crate::core::units::cache::Cache;
use crate::core::units::mmu::Mmu;
use crate::stats::SimStats;

/// The processor core.
#[derive(Clone, Debug)]
pub struct Cpu {
    /// General-purpose registers.
    pub regs: Gpr,
    /// Fetch program counter.
    pub pc: u32,
    /// Control and status registers.
    pub csrs: Csrs,
    /// Current privilege mode.
    pub privilege: PrivilegeMode,
    /// LR/SC reservation.
    pub reservation: bool,
    /// Waiting for an interrupt after `WFI`.
    pub wfi: bool,

    /// Fetch to decode latch.
    pub if_id: Option<IfIdEntry>,
    /// Decode to execute latch.
    pub id_ex: Option<IdExEntry>,
    /// Execute to memory latch.
    pub ex_mem: Option<ExMemEntry>,
    /// Memory to write-back latch.
    pub mem_wb: Option<MemWbEntry>,
    /// Fetch produced a trapping entry and waits for a redirect.
    pub(crate) fetch_blocked: bool,

    /// Instruction cache.
    pub icache: Cache,
    /// Data cache.
    pub dcache: Cache,
    /// TLBs and page-table walker.
    pub mmu: Mmu,
    /// Decode-stage branch predictor.
    pub predictor: BranchPredictor,
    /// Uncached data window.
    pub io_window: Region,
    pub(crate) ibus: PortState,
    pub(crate) dbus: PortState,

    /// Debug control unit.
    pub debug: DebugUnit,
    irq_lines: u32,
    timer_irq: bool,
    software_irq: bool,
    reset_vector: u32,

    /// Emit per-stage trace events.
    pub trace: bool,
    /// Performance counters.
    pub stats: SimStats,
}

impl Cpu {
    /// Builds a core in its reset state.
    ///
    /// # Arguments
    ///
    /// * `config` - Model configuration; geometry is assumed validated.
    pub fn new(config: &Config) -> Self {
        let mut cpu = Self {
            regs: Gpr::new(),
            pc: config.general.reset_vector,
            csrs: Csrs::new(),
            privilege: PrivilegeMode::Machine,
            reservation: false,
            wfi: false,
            if_id: None,
            id_ex: None,
            ex_mem: None,
            mem_wb: None,
            fetch_blocked: false,
            icache: Cache::new(&config.cache.icache),
            dcache: Cache::new(&config.cache.dcache),
            mmu: Mmu::new(config.mmu.tlb_entries),
            predictor: BranchPredictor::new(&config.pipeline),
            io_window: config.memory.io_region(),
            ibus: PortState::default(),
            dbus: PortState::default(),
            debug: DebugUnit::new(),
            irq_lines: 0,
            timer_irq: false,
            software_irq: false,
            reset_vector: config.general.reset_vector,
            trace: config.general.trace,
            stats: SimStats::default(),
        };
        cpu.reset();
        cpu
    }

    /// Returns the core to its reset state.
    ///
    /// Registers other than the CSRs keep their values. Bus transactions in
    /// flight are drained and their beats dropped.
    pub fn reset(&mut self) {
        debug!(vector = format_args!("{:#010x}", self.reset_vector), "core reset");
        self.pc = self.reset_vector;
        self.privilege = PrivilegeMode::Machine;
        self.csrs = Csrs::new();
        self.reservation = false;
        self.wfi = false;
        self.if_id = None;
        self.id_ex = None;
        self.ex_mem = None;
        self.mem_wb = None;
        self.fetch_blocked = false;
        self.icache.invalidate_all();
        self.dcache.invalidate_all();
        self.mmu.reset();
        self.predictor.reset();
        self.ibus.abandon();
        self.dbus.abandon();
        self.debug.inject = None;
    }

    /// Sets the address execution starts from after reset.
    pub fn set_reset_vector(&mut self, vector: u32) {
        self.reset_vector = vector & !3;
    }

    /// The configured reset vector.
    pub const fn reset_vector(&self) -> u32 {
        self.reset_vector
    }

    /// Drives the external interrupt vector; sampled at the end of each cycle.
    pub fn set_irq_lines(&mut self, lines: u32) {
        self.irq_lines = lines;
    }

    /// Drives the machine timer interrupt line.
    pub fn set_timer_irq(&mut self, level: bool) {
        self.timer_irq = level;
    }

    /// Drives the machine software interrupt line.
    pub fn set_software_irq(&mut self, level: bool) {
        self.software_irq = level;
    }

    /// Returns true if any latch holds an instruction.
    pub const fn is_busy(&self) -> bool {
        self.if_id.is_some() || self.id_ex.is_some() || self.ex_mem.is_some() || self.mem_wb.is_some()
    }

    /// Reads a debug register.
    pub fn debug_read(&self, addr: u32) -> u32 {
        self.debug.read(addr, self.is_busy())
    }

    /// Writes a debug register.
    pub fn debug_write(&mut self, addr: u32, value: u32) {
        self.debug.write(addr, value);
    }

    /// Register value by index, for inspection.
    pub fn reg(&self, idx: usize) -> u32 {
        self.regs.read(idx)
    }
}
