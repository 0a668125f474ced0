//! Atomic memory operation ALU.
//!
//! Computes the value an AMO writes back from the value read and the `rs2`
//! operand. LR and SC carry no arithmetic and never reach this function.

use crate::core::pipeline::signals::AtomicOp;

/// Performs the read-modify-write arithmetic of an AMO.
///
/// # Arguments
///
/// * `op`      - The atomic operation.
/// * `mem_val` - The word read from memory.
/// * `reg_val` - The `rs2` operand.
///
/// # Returns
///
/// The word to store. LR/SC return `reg_val`, which is what SC stores.
pub const fn atomic_alu(op: AtomicOp, mem_val: u32, reg_val: u32) -> u32 {
    let a = mem_val as i32;
    let b = reg_val as i32;
    match op {
        AtomicOp::Lr | AtomicOp::Sc | AtomicOp::Swap => reg_val,
        AtomicOp::Add => mem_val.wrapping_add(reg_val),
        AtomicOp::Xor => mem_val ^ reg_val,
        AtomicOp::And => mem_val & reg_val,
        AtomicOp::Or => mem_val | reg_val,
        AtomicOp::Min => (if a < b { a } else { b }) as u32,
        AtomicOp::Max => (if a > b { a } else { b }) as u32,
        AtomicOp::Minu => if mem_val < reg_val { mem_val } else { reg_val },
        AtomicOp::Maxu => if mem_val > reg_val { mem_val } else { reg_val },
    }
}
