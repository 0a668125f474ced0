//! Branch resolution unit (BRU).
//!
//! Execute-stage condition evaluation plus the decode-stage predictor that
//! proposes the next fetch address. A prediction is a guess only; execute
//! re-checks it and flushes the wrong path on mismatch.

/// Two-bit saturating branch history table.
pub mod bht;

use self::bht::BranchHistoryTable;
use crate::config::{BranchPredictor as BpType, PipelineConfig};
use crate::core::pipeline::signals::BranchCond;

/// Evaluates a branch condition.
///
/// # Arguments
///
/// * `cond` - The comparison.
/// * `a` - `rs1` value.
/// * `b` - `rs2` value.
pub const fn branch_taken(cond: BranchCond, a: u32, b: u32) -> bool {
    match cond {
        BranchCond::Eq => a == b,
        BranchCond::Ne => a != b,
        BranchCond::Lt => (a as i32) < (b as i32),
        BranchCond::Ge => (a as i32) >= (b as i32),
        BranchCond::Ltu => a < b,
        BranchCond::Geu => a >= b,
    }
}

/// Decode-stage direction predictor for conditional branches.
#[derive(Clone, Debug)]
pub enum BranchPredictor {
    /// Always not taken.
    Static,
    /// History-table driven.
    Bht(BranchHistoryTable),
}

impl BranchPredictor {
    /// Builds the predictor selected by the configuration.
    pub fn new(config: &PipelineConfig) -> Self {
        match config.branch_predictor {
            BpType::Static => Self::Static,
            BpType::Bht => Self::Bht(BranchHistoryTable::new(config.bht_entries)),
        }
    }

    /// Predicts whether the conditional branch at `pc` is taken.
    pub fn predict(&self, pc: u32) -> bool {
        match self {
            Self::Static => false,
            Self::Bht(bht) => bht.predict(pc),
        }
    }

    /// Trains the predictor with a resolved outcome.
    pub fn update(&mut self, pc: u32, taken: bool) {
        if let Self::Bht(bht) = self {
            bht.update(pc, taken);
        }
    }

    /// Returns every counter to its reset state.
    pub fn reset(&mut self) {
        if let Self::Bht(bht) = self {
            bht.reset();
        }
    }
}
