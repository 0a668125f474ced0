//! Direct-mapped line cache.
//!
//! This module implements the instruction and data caches. It provides:
//! 1. **Lookup:** Combinational tag compare returning data, an error or a miss.
//! 2. **Fill:** A single line loader; a line becomes valid only once its whole burst lands.
//! 3. **Writes:** Byte-masked merges into a hit line (the data cache writes through).
//! 4. **Flush:** A sweep invalidating one line per cycle, started once the loader is idle.

/// Burst fill state machine.
pub mod loader;

use tracing::debug;

pub use self::loader::{LineFill, LineLoader};
use crate::config::CacheConfig;
use crate::core::units::lsu::merge_word;
use crate::soc::{BusCommand, BusResponse};

/// Result of a cache lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheLookup {
    /// The line is present; the addressed word.
    Hit(u32),
    /// The line is present but its fill reported a bus error.
    Error,
    /// The line is absent, or a flush is in progress.
    Miss,
}

/// Tag store entry.
#[derive(Clone, Copy, Debug, Default)]
struct Line {
    valid: bool,
    error: bool,
    tag: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum FlushState {
    #[default]
    Idle,
    /// Requested; waits for the loader to finish.
    Pending,
    /// Invalidating the line at this index.
    Sweeping(usize),
}

/// A direct-mapped cache with one line loader.
#[derive(Clone, Debug)]
pub struct Cache {
    lines: Vec<Line>,
    data: Vec<u32>,
    line_bytes: u32,
    words_per_line: usize,
    loader: LineLoader,
    flush: FlushState,
    /// Lines installed since reset.
    pub fills: u64,
}

impl Cache {
    /// Creates an empty cache with the configured geometry.
    pub fn new(config: &CacheConfig) -> Self {
        let lines = config.lines().max(1);
        let words_per_line = config.words_per_line().max(1);
        Self {
            lines: vec![Line::default(); lines],
            data: vec![0; lines * words_per_line],
            line_bytes: config.line_bytes,
            words_per_line,
            loader: LineLoader::new(words_per_line),
            flush: FlushState::Idle,
            fills: 0,
        }
    }

    /// Base address of the line holding `pa`.
    pub const fn line_base(&self, pa: u32) -> u32 {
        pa & !(self.line_bytes - 1)
    }

    fn index(&self, pa: u32) -> usize {
        (pa / self.line_bytes) as usize & (self.lines.len() - 1)
    }

    fn word_slot(&self, pa: u32) -> usize {
        self.index(pa) * self.words_per_line + ((pa & (self.line_bytes - 1)) >> 2) as usize
    }

    /// Looks up the word containing `pa`.
    pub fn lookup(&self, pa: u32) -> CacheLookup {
        if self.flush != FlushState::Idle {
            return CacheLookup::Miss;
        }
        let line = self.lines[self.index(pa)];
        if !line.valid || line.tag != self.line_base(pa) {
            CacheLookup::Miss
        } else if line.error {
            CacheLookup::Error
        } else {
            CacheLookup::Hit(self.data[self.word_slot(pa)])
        }
    }

    /// Returns true if a new fill could start this cycle.
    pub fn can_start_fill(&self) -> bool {
        self.loader.is_idle() && self.flush == FlushState::Idle
    }

    /// Starts filling the line holding `pa` if the loader is free.
    ///
    /// # Returns
    ///
    /// `true` if the fill started.
    pub fn start_fill(&mut self, pa: u32) -> bool {
        if !self.can_start_fill() {
            return false;
        }
        self.loader.start(self.line_base(pa));
        true
    }

    /// Returns true if the loader is filling the line holding `pa`.
    pub fn fill_in_flight(&self, pa: u32) -> bool {
        self.loader.target() == Some(self.line_base(pa))
    }

    /// Returns true when the loader is idle.
    pub const fn loader_idle(&self) -> bool {
        self.loader.is_idle()
    }

    /// The fill burst waiting for the bus.
    pub const fn bus_command(&self) -> Option<BusCommand> {
        self.loader.pending_command()
    }

    /// Records acceptance of the fill burst.
    pub fn command_accepted(&mut self) {
        self.loader.command_accepted();
    }

    /// Feeds a fill beat to the loader, installing the line when complete.
    pub fn receive(&mut self, rsp: BusResponse) {
        if let Some(fill) = self.loader.receive(rsp) {
            self.install(&fill);
        }
    }

    fn install(&mut self, fill: &LineFill) {
        let index = self.index(fill.base);
        let start = index * self.words_per_line;
        self.data[start..start + self.words_per_line].copy_from_slice(&fill.words);
        self.lines[index] = Line {
            valid: true,
            error: fill.error,
            tag: fill.base,
        };
        self.fills += 1;
        debug!(base = format_args!("{:#010x}", fill.base), error = fill.error, "line fill complete");
    }

    /// Merges a masked store into the line holding `pa` if it is present.
    pub fn write_hit(&mut self, pa: u32, data: u32, mask: u8) {
        let line = self.lines[self.index(pa)];
        if line.valid && !line.error && line.tag == self.line_base(pa) {
            let slot = self.word_slot(pa);
            self.data[slot] = merge_word(self.data[slot], data, mask);
        }
    }

    /// Requests a flush sweep.
    pub fn request_flush(&mut self) {
        if self.flush == FlushState::Idle {
            self.flush = FlushState::Pending;
        }
    }

    /// Returns true while a flush is pending or sweeping.
    pub fn flush_active(&self) -> bool {
        self.flush != FlushState::Idle
    }

    /// Returns true while a fill or a flush is in progress.
    pub fn is_busy(&self) -> bool {
        !self.loader.is_idle() || self.flush_active()
    }

    /// Advances the flush sweep by one line.
    pub fn tick_flush(&mut self) {
        self.flush = match self.flush {
            FlushState::Idle => FlushState::Idle,
            FlushState::Pending if self.loader.is_idle() => FlushState::Sweeping(0),
            FlushState::Pending => FlushState::Pending,
            FlushState::Sweeping(i) => {
                self.lines[i].valid = false;
                if i + 1 == self.lines.len() {
                    FlushState::Idle
                } else {
                    FlushState::Sweeping(i + 1)
                }
            }
        };
    }

    /// Invalidates every line and abandons any fill. Reset only.
    pub fn invalidate_all(&mut self) {
        self.lines.fill(Line::default());
        self.loader.reset();
        self.flush = FlushState::Idle;
    }

    /// Number of lines.
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }
}
