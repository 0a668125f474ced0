//! Branch history table.
//!
//! A direct-mapped array of two-bit saturating counters indexed by word PC.
//! Counters start weakly not-taken.

/// Counter value at or above which a branch is predicted taken.
const TAKEN_THRESHOLD: u8 = 2;

/// Saturation limit of a counter.
const COUNTER_MAX: u8 = 3;

/// Reset value: weakly not taken.
const COUNTER_RESET: u8 = 1;

/// Two-bit saturating counter table.
#[derive(Clone, Debug)]
pub struct BranchHistoryTable {
    counters: Vec<u8>,
    mask: usize,
}

impl BranchHistoryTable {
    /// Creates a table of `entries` counters.
    ///
    /// # Arguments
    ///
    /// * `entries` - Number of counters (rounded up to a power of two).
    pub fn new(entries: usize) -> Self {
        let size = entries.max(1).next_power_of_two();
        Self {
            counters: vec![COUNTER_RESET; size],
            mask: size - 1,
        }
    }

    const fn index(&self, pc: u32) -> usize {
        ((pc >> 2) as usize) & self.mask
    }

    /// Returns true if the branch at `pc` is predicted taken.
    pub fn predict(&self, pc: u32) -> bool {
        self.counters[self.index(pc)] >= TAKEN_THRESHOLD
    }

    /// Moves the counter for `pc` towards the observed outcome.
    pub fn update(&mut self, pc: u32, taken: bool) {
        let idx = self.index(pc);
        let c = &mut self.counters[idx];
        *c = if taken {
            (*c + 1).min(COUNTER_MAX)
        } else {
            c.saturating_sub(1)
        };
    }

    /// Returns every counter to weakly not-taken.
    pub fn reset(&mut self) {
        self.counters.fill(COUNTER_RESET);
    }
}
