//! Configuration for the core model and its memory environment.
//!
//! This module defines every parameter of the model. It provides:
//! 1. **Defaults:** Baseline constants for the memory map, cache geometry and bus timing.
//! 2. **Structures:** Hierarchical config for general, cache, MMU, pipeline and memory settings.
//! 3. **Validation:** Geometry checks run before a core is built.
//!
//! Configuration is deserialised from JSON with `serde_json`, or built with
//! `Config::default()`. Missing fields take their defaults.

use serde::Deserialize;

use crate::common::SimError;

/// Default configuration constants.
mod defaults {
    /// Base address of main RAM.
    pub const RAM_BASE: u32 = 0x4000_0000;

    /// Size of main RAM (4 MiB).
    pub const RAM_SIZE: u32 = 4 * 1024 * 1024;

    /// Reset vector. Execution starts at the bottom of RAM.
    pub const RESET_VECTOR: u32 = RAM_BASE;

    /// Base of the uncached IO window.
    pub const IO_BASE: u32 = 0xE000_0000;

    /// Size of the uncached IO window.
    pub const IO_SIZE: u32 = 0x1000_0000;

    /// Cycles from command acceptance to the first response beat.
    pub const BUS_LATENCY: u64 = 2;

    /// Instruction cache size in bytes (4 KiB).
    pub const ICACHE_SIZE: u32 = 4096;

    /// Data cache size in bytes (4 KiB).
    pub const DCACHE_SIZE: u32 = 4096;

    /// Cache line size in bytes: eight-beat bursts.
    pub const CACHE_LINE: u32 = 32;

    /// TLB entries per MMU port.
    pub const TLB_ENTRIES: usize = 4;

    /// Branch history table entries.
    pub const BHT_ENTRIES: usize = 256;

    /// Cycle limit for `Simulator::run_until`.
    pub const MAX_CYCLES: u64 = 1_000_000;
}

/// Decode-stage branch prediction scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictor {
    /// Predict every conditional branch not taken. `JAL` is still redirected.
    Static,
    /// Two-bit saturating counters indexed by PC.
    #[default]
    #[serde(alias = "BHT")]
    Bht,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use vexsim_core::config::{BranchPredictor, Config};
///
/// let json = r#"{
///     "general": { "reset_vector": 1073741824, "trace": true },
///     "cache": { "dcache": { "size_bytes": 8192, "line_bytes": 32 } },
///     "pipeline": { "branch_predictor": "Static" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(config.general.trace);
/// assert_eq!(config.cache.dcache.size_bytes, 8192);
/// assert_eq!(config.cache.icache.size_bytes, 4096);
/// assert_eq!(config.pipeline.branch_predictor, BranchPredictor::Static);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Cache geometry.
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
    /// Address translation settings.
    #[serde(default)]
    pub mmu: MmuConfig,
    /// Pipeline and branch predictor settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Memory environment settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a JSON configuration document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigParse`] for malformed JSON and
    /// [`SimError::Config`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cache geometry and window sizes.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] naming the first bad value.
    pub fn validate(&self) -> Result<(), SimError> {
        self.cache.icache.validate("icache")?;
        self.cache.dcache.validate("dcache")?;
        if self.mmu.tlb_entries == 0 {
            return Err(SimError::Config("mmu.tlb_entries must be at least 1".into()));
        }
        if !self.pipeline.bht_entries.is_power_of_two() {
            return Err(SimError::Config(format!(
                "pipeline.bht_entries must be a power of two, got {}",
                self.pipeline.bht_entries
            )));
        }
        if self.memory.ram_size == 0 || self.memory.ram_size % 4 != 0 {
            return Err(SimError::Config("memory.ram_size must be a non-zero multiple of 4".into()));
        }
        if self.general.reset_vector % 4 != 0 {
            return Err(SimError::Config("general.reset_vector must be word aligned".into()));
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Address of the first instruction after reset.
    #[serde(default = "GeneralConfig::default_reset_vector")]
    pub reset_vector: u32,

    /// Emit per-cycle pipeline events at `trace` level.
    #[serde(default)]
    pub trace: bool,

    /// Cycle limit for `Simulator::run_until`.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default reset vector.
    const fn default_reset_vector() -> u32 {
        defaults::RESET_VECTOR
    }

    /// Returns the default cycle limit.
    const fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            reset_vector: defaults::RESET_VECTOR,
            trace: false,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Geometry of one direct-mapped cache.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    /// Total capacity in bytes.
    pub size_bytes: u32,
    /// Line size in bytes; also the burst length in bytes.
    #[serde(default = "CacheConfig::default_line_bytes")]
    pub line_bytes: u32,
}

impl CacheConfig {
    /// Returns the default line size.
    const fn default_line_bytes() -> u32 {
        defaults::CACHE_LINE
    }

    /// Number of lines.
    pub const fn lines(&self) -> usize {
        (self.size_bytes / self.line_bytes) as usize
    }

    /// Words per line, which is the fill burst length.
    pub const fn words_per_line(&self) -> usize {
        (self.line_bytes / 4) as usize
    }

    fn validate(&self, name: &str) -> Result<(), SimError> {
        if !self.line_bytes.is_power_of_two() || self.line_bytes < 4 {
            return Err(SimError::Config(format!(
                "{name}.line_bytes must be a power of two of at least 4, got {}",
                self.line_bytes
            )));
        }
        if !self.size_bytes.is_power_of_two() || self.size_bytes < self.line_bytes {
            return Err(SimError::Config(format!(
                "{name}.size_bytes must be a power of two no smaller than a line, got {}",
                self.size_bytes
            )));
        }
        Ok(())
    }
}

/// Instruction and data cache geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheHierarchyConfig {
    /// Instruction cache.
    #[serde(default = "CacheHierarchyConfig::default_icache")]
    pub icache: CacheConfig,
    /// Data cache.
    #[serde(default = "CacheHierarchyConfig::default_dcache")]
    pub dcache: CacheConfig,
}

impl CacheHierarchyConfig {
    /// Returns the default instruction cache geometry.
    const fn default_icache() -> CacheConfig {
        CacheConfig {
            size_bytes: defaults::ICACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
        }
    }

    /// Returns the default data cache geometry.
    const fn default_dcache() -> CacheConfig {
        CacheConfig {
            size_bytes: defaults::DCACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
        }
    }
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            icache: Self::default_icache(),
            dcache: Self::default_dcache(),
        }
    }
}

/// Address translation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MmuConfig {
    /// Entries in each port's TLB.
    #[serde(default = "MmuConfig::default_tlb_entries")]
    pub tlb_entries: usize,
}

impl MmuConfig {
    /// Returns the default TLB size.
    const fn default_tlb_entries() -> usize {
        defaults::TLB_ENTRIES
    }
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self {
            tlb_entries: defaults::TLB_ENTRIES,
        }
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Decode-stage predictor.
    #[serde(default)]
    pub branch_predictor: BranchPredictor,
    /// Branch history table size; a power of two.
    #[serde(default = "PipelineConfig::default_bht_entries")]
    pub bht_entries: usize,
}

impl PipelineConfig {
    /// Returns the default branch history table size.
    const fn default_bht_entries() -> usize {
        defaults::BHT_ENTRIES
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            branch_predictor: BranchPredictor::default(),
            bht_entries: defaults::BHT_ENTRIES,
        }
    }
}

/// An address range `[base, base + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Region {
    /// First address.
    pub base: u32,
    /// Length in bytes.
    pub size: u32,
}

impl Region {
    /// Returns true if `addr` falls inside the region.
    pub const fn contains(&self, addr: u32) -> bool {
        addr >= self.base && (addr - self.base) < self.size
    }
}

/// Memory environment settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// RAM base address.
    #[serde(default = "MemoryConfig::default_ram_base")]
    pub ram_base: u32,

    /// RAM size in bytes.
    #[serde(default = "MemoryConfig::default_ram_size")]
    pub ram_size: u32,

    /// Uncached IO window base. Data accesses here bypass the data cache.
    #[serde(default = "MemoryConfig::default_io_base")]
    pub io_base: u32,

    /// Uncached IO window size.
    #[serde(default = "MemoryConfig::default_io_size")]
    pub io_size: u32,

    /// Cycles from command acceptance to the first response beat.
    #[serde(default = "MemoryConfig::default_latency")]
    pub latency: u64,

    /// Ranges that answer every access with a bus error.
    #[serde(default)]
    pub error_regions: Vec<Region>,
}

impl MemoryConfig {
    /// Returns the default RAM base.
    const fn default_ram_base() -> u32 {
        defaults::RAM_BASE
    }

    /// Returns the default RAM size.
    const fn default_ram_size() -> u32 {
        defaults::RAM_SIZE
    }

    /// Returns the default IO window base.
    const fn default_io_base() -> u32 {
        defaults::IO_BASE
    }

    /// Returns the default IO window size.
    const fn default_io_size() -> u32 {
        defaults::IO_SIZE
    }

    /// Returns the default bus latency.
    const fn default_latency() -> u64 {
        defaults::BUS_LATENCY
    }

    /// The uncached IO window as a region.
    pub const fn io_region(&self) -> Region {
        Region {
            base: self.io_base,
            size: self.io_size,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ram_base: defaults::RAM_BASE,
            ram_size: defaults::RAM_SIZE,
            io_base: defaults::IO_BASE,
            io_size: defaults::IO_SIZE,
            latency: defaults::BUS_LATENCY,
            error_regions: Vec::new(),
        }
    }
}
