//! Data hazard detection and operand forwarding.
//!
//! This module resolves read-after-write hazards for the decode stage. It provides:
//! 1. **Pending writers:** One record per older in-flight instruction that will write a register.
//! 2. **Forwarding lookup:** The youngest pending writer of a register supplies its value.
//! 3. **Hazard detection:** A writer whose value is not produced yet stalls decode.
//!
//! Execute and memory can bypass only results that are final at the end of
//! execute (ALU, upper-immediate and link values). Loads, multiplies, divides
//! and CSR reads are bypassed from write-back only.

use crate::core::pipeline::latches::ExMemEntry;

/// An older instruction that will write `rd`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingWrite {
    /// Destination register, never 0.
    pub rd: usize,
    /// The value, if it is already known.
    pub value: Option<u32>,
}

/// Result of a forwarding lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Forward {
    /// No in-flight writer; read the register file.
    None,
    /// The youngest writer's value.
    Ready(u32),
    /// The youngest writer has not produced its value; stall.
    NotReady,
}

/// Finds the value of `reg` among in-flight writers.
///
/// # Arguments
///
/// * `reg` - Register being read.
/// * `writers` - Pending writers ordered oldest first (write-back, memory, execute).
///
/// # Returns
///
/// The youngest matching writer's value, [`Forward::NotReady`] if that writer
/// has no value yet, or [`Forward::None`] if no writer matches.
///
/// # Examples
///
/// ```
/// use vexsim_core::core::pipeline::hazards::{forwarding_lookup, Forward, PendingWrite};
///
/// let writers = [
///     PendingWrite { rd: 5, value: Some(1) },
///     PendingWrite { rd: 5, value: Some(2) },
///     PendingWrite { rd: 6, value: None },
/// ];
/// assert_eq!(forwarding_lookup(5, &writers), Forward::Ready(2));
/// assert_eq!(forwarding_lookup(6, &writers), Forward::NotReady);
/// assert_eq!(forwarding_lookup(7, &writers), Forward::None);
/// assert_eq!(forwarding_lookup(0, &writers), Forward::None);
/// ```
pub fn forwarding_lookup(reg: usize, writers: &[PendingWrite]) -> Forward {
    if reg == 0 {
        return Forward::None;
    }
    writers
        .iter()
        .rev()
        .find(|w| w.rd == reg)
        .map_or(Forward::None, |w| w.value.map_or(Forward::NotReady, Forward::Ready))
}

/// Pending write of an execute-stage result or a memory-stage entry.
///
/// Trapping entries never write, so they are not writers.
pub fn pending_write(entry: &ExMemEntry) -> Option<PendingWrite> {
    if entry.trap.is_some() || entry.rd == 0 || !entry.op.writes_rd() {
        return None;
    }
    Some(PendingWrite {
        rd: entry.rd,
        value: entry.op.result_in_execute().then_some(entry.result),
    })
}
