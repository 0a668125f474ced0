//! Simulator: owns the core and its memory environment side by side.
//!
//! The core borrows the environment through the [`Bus`] trait on every tick,
//! so neither owns the other.

use std::path::Path;

use tracing::debug;

use super::loader;
use crate::common::SimError;
use crate::config::Config;
use crate::core::Cpu;
use crate::soc::{Bus, MemoryBus};
use crate::stats::SimStats;

/// Top-level simulator: core plus memory environment.
#[derive(Debug)]
pub struct Simulator {
    /// The processor core.
    pub cpu: Cpu,
    /// RAM, IO window and error windows behind the bus contract.
    pub bus: MemoryBus,
    max_cycles: u64,
}

impl Simulator {
    /// Builds a simulator from a configuration.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] if the configuration fails validation.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            cpu: Cpu::new(config),
            bus: MemoryBus::new(&config.memory),
            max_cycles: config.general.max_cycles,
        })
    }

    /// Builds a simulator from a JSON configuration document.
    ///
    /// # Errors
    ///
    /// As [`Config::from_json`].
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Self::new(&Config::from_json(json)?)
    }

    /// Loads an ELF file and restarts the core at its entry point.
    ///
    /// # Errors
    ///
    /// As [`loader::load_elf_file`].
    pub fn load_elf(&mut self, path: &Path) -> Result<u32, SimError> {
        let entry = loader::load_elf_file(&mut self.bus, path)?;
        self.restart_at(entry);
        Ok(entry)
    }

    /// Loads an in-memory ELF image and restarts the core at its entry point.
    ///
    /// # Errors
    ///
    /// As [`loader::load_elf`].
    pub fn load_elf_bytes(&mut self, image: &[u8]) -> Result<u32, SimError> {
        let entry = loader::load_elf(&mut self.bus, image)?;
        self.restart_at(entry);
        Ok(entry)
    }

    /// Loads a raw binary at `addr`. The reset vector is left unchanged.
    ///
    /// # Errors
    ///
    /// As [`loader::load_binary`].
    pub fn load_binary(&mut self, path: &Path, addr: u32) -> Result<usize, SimError> {
        loader::load_binary(&mut self.bus, path, addr)
    }

    /// Writes instruction or data words to RAM starting at `addr`.
    ///
    /// # Errors
    ///
    /// [`SimError::Load`] if the words do not fit in RAM.
    pub fn load_words(&mut self, addr: u32, words: &[u32]) -> Result<(), SimError> {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        if self.bus.load_bytes(addr, &bytes) {
            Ok(())
        } else {
            Err(SimError::Load(format!("{} words do not fit in RAM at {addr:#010x}", words.len())))
        }
    }

    fn restart_at(&mut self, entry: u32) {
        debug!(entry = format_args!("{entry:#010x}"), "restarting core");
        self.cpu.set_reset_vector(entry);
        self.cpu.reset();
    }

    /// Advances the core and then the memory environment by one cycle.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError::ArbitrationInconsistency`] from the core.
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.cpu.tick(&mut self.bus)?;
        self.bus.tick();
        Ok(())
    }

    /// Runs exactly `cycles` cycles.
    ///
    /// # Errors
    ///
    /// As [`Simulator::tick`].
    pub fn run(&mut self, cycles: u64) -> Result<(), SimError> {
        for _ in 0..cycles {
            self.tick()?;
        }
        Ok(())
    }

    /// Runs until `done` returns true, checked after every cycle.
    ///
    /// # Returns
    ///
    /// The number of cycles run.
    ///
    /// # Errors
    ///
    /// [`SimError::Timeout`] once the configured cycle limit passes, or an
    /// error from [`Simulator::tick`].
    pub fn run_until(&mut self, mut done: impl FnMut(&Cpu) -> bool) -> Result<u64, SimError> {
        for cycle in 1..=self.max_cycles {
            self.tick()?;
            if done(&self.cpu) {
                return Ok(cycle);
            }
        }
        Err(SimError::Timeout(self.max_cycles))
    }

    /// Overrides the cycle limit used by [`Simulator::run_until`].
    pub fn set_max_cycles(&mut self, max_cycles: u64) {
        self.max_cycles = max_cycles;
    }

    /// Performance counters.
    pub const fn stats(&self) -> &SimStats {
        &self.cpu.stats
    }
}
