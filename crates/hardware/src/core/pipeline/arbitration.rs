//! Stage arbitration network.
//!
//! Every stage publishes five flags per cycle and the network derives the
//! rest. It provides:
//! 1. **Stall propagation:** A stage is stuck if it halts or any older stage is stuck.
//! 2. **Flush propagation:** `flush_it` removes a stage and everything younger;
//!    `flush_next` removes only the younger stages.
//! 3. **Hand-off:** A stage fires when valid, not stuck and not removed, and the
//!    next-cycle validity of every latch follows from that.
//! 4. **Consistency check:** Firing into a stuck, unremoved successor is reported
//!    as [`SimError::ArbitrationInconsistency`].
//!
//! Stages are indexed oldest-last: `Fetch` is the youngest, `WriteBack` the oldest.

use crate::common::SimError;

/// Pipeline stages in program order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Instruction fetch.
    Fetch = 0,
    /// Decode and operand read.
    Decode = 1,
    /// Execute.
    Execute = 2,
    /// Data memory.
    Memory = 3,
    /// Commit point.
    WriteBack = 4,
}

impl Stage {
    /// All stages, youngest first.
    pub const ALL: [Self; 5] = [
        Self::Fetch,
        Self::Decode,
        Self::Execute,
        Self::Memory,
        Self::WriteBack,
    ];

    /// Stage name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Decode => "decode",
            Self::Execute => "execute",
            Self::Memory => "memory",
            Self::WriteBack => "writeback",
        }
    }
}

/// The stored flags of one stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageFlags {
    /// The stage holds an instruction.
    pub is_valid: bool,
    /// The stage cannot complete this cycle.
    pub halt_itself: bool,
    /// Another unit holds the stage.
    pub halt_by_other: bool,
    /// Remove this stage and every younger one.
    pub flush_it: bool,
    /// Remove every younger stage.
    pub flush_next: bool,
}

/// Arbitration state for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Arbitration {
    flags: [StageFlags; 5],
}

impl Arbitration {
    /// Creates an arbitration with the given validity per stage, youngest first.
    pub fn new(valid: [bool; 5]) -> Self {
        let mut arb = Self::default();
        for (flags, v) in arb.flags.iter_mut().zip(valid) {
            flags.is_valid = v;
        }
        arb
    }

    /// Flags of `stage`.
    pub const fn flags(&self, stage: Stage) -> StageFlags {
        self.flags[stage as usize]
    }

    /// Mutable flags of `stage`.
    pub fn flags_mut(&mut self, stage: Stage) -> &mut StageFlags {
        &mut self.flags[stage as usize]
    }

    /// Sets `halt_itself` on `stage`.
    pub fn halt(&mut self, stage: Stage) {
        self.flags_mut(stage).halt_itself = true;
    }

    /// Sets `halt_by_other` on `stage`.
    pub fn hold(&mut self, stage: Stage) {
        self.flags_mut(stage).halt_by_other = true;
    }

    /// Sets `flush_it` on `stage`.
    pub fn flush_it(&mut self, stage: Stage) {
        self.flags_mut(stage).flush_it = true;
    }

    /// Sets `flush_next` on `stage`.
    pub fn flush_next(&mut self, stage: Stage) {
        self.flags_mut(stage).flush_next = true;
    }

    /// Returns true if `stage` holds an instruction.
    pub const fn is_valid(&self, stage: Stage) -> bool {
        self.flags[stage as usize].is_valid
    }

    /// A stage is stuck if it halts, or an older stage is stuck.
    pub fn is_stuck(&self, stage: Stage) -> bool {
        self.flags[stage as usize..]
            .iter()
            .any(|f| f.is_valid && (f.halt_itself || f.halt_by_other))
    }

    /// A stage is flushed by its own or an older `flush_it`, or by an older `flush_next`.
    pub fn is_flushed(&self, stage: Stage) -> bool {
        let k = stage as usize;
        self.flags[k].flush_it || self.is_flushed_by_older(stage)
    }

    /// Flushed by an older stage only; the stage's own `flush_it` is ignored.
    pub fn is_flushed_by_older(&self, stage: Stage) -> bool {
        self.flags[stage as usize + 1..]
            .iter()
            .any(|f| f.flush_it || f.flush_next)
    }

    /// `removeIt`: the stage's contents are discarded this cycle.
    pub fn is_removed(&self, stage: Stage) -> bool {
        self.is_flushed(stage)
    }

    /// The stage hands its instruction to the next one.
    pub fn is_firing(&self, stage: Stage) -> bool {
        self.is_valid(stage) && !self.is_stuck(stage) && !self.is_removed(stage)
    }

    /// The stage would advance if it held an instruction.
    pub fn is_moving(&self, stage: Stage) -> bool {
        !self.is_stuck(stage) && !self.is_removed(stage)
    }

    /// The stage keeps its instruction into the next cycle.
    pub fn keeps(&self, stage: Stage) -> bool {
        self.is_valid(stage) && self.is_stuck(stage) && !self.is_removed(stage)
    }

    /// Next-cycle validity of `stage`'s input latch.
    pub fn next_valid(&self, stage: Stage) -> bool {
        let fed = match stage {
            Stage::Fetch => false,
            _ => self.is_firing(Stage::ALL[stage as usize - 1]),
        };
        self.keeps(stage) || fed
    }

    /// Checks that no stage fires into a stuck successor that keeps its
    /// instruction, and that the commit point never stalls.
    ///
    /// # Errors
    ///
    /// [`SimError::ArbitrationInconsistency`] naming the two stages.
    pub fn check(&self, cycle: u64) -> Result<(), SimError> {
        for pair in Stage::ALL.windows(2) {
            let (stage, successor) = (pair[0], pair[1]);
            if self.is_firing(stage) && self.keeps(successor) {
                return Err(SimError::ArbitrationInconsistency {
                    cycle,
                    stage: stage.name(),
                    successor: successor.name(),
                });
            }
        }
        if self.is_stuck(Stage::WriteBack) {
            return Err(SimError::ArbitrationInconsistency {
                cycle,
                stage: Stage::Memory.name(),
                successor: Stage::WriteBack.name(),
            });
        }
        Ok(())
    }
}
