//! Arithmetic Logic Unit (ALU).
//!
//! Combinational integer operations of the execute stage: add/subtract,
//! comparisons, bitwise logic and the barrel shifter. Multiplication and
//! division live in [`muldiv`](crate::core::units::muldiv) because they span
//! several stages.

use crate::core::pipeline::signals::AluOp;

/// Arithmetic Logic Unit for RV32I operations.
#[derive(Clone, Copy, Debug)]
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The ALU operation to perform.
    /// * `a`  - First operand.
    /// * `b`  - Second operand; only the low five bits are used as a shift amount.
    ///
    /// # Returns
    ///
    /// The 32-bit result.
    ///
    /// # Examples
    ///
    /// ```
    /// use vexsim_core::core::units::alu::Alu;
    /// use vexsim_core::core::pipeline::signals::AluOp;
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, 0xFFFF_FFFF, 1), 0);
    /// assert_eq!(Alu::execute(AluOp::Sra, 0x8000_0000, 4), 0xF800_0000);
    /// assert_eq!(Alu::execute(AluOp::Slt, -5_i32 as u32, 10), 1);
    /// assert_eq!(Alu::execute(AluOp::Sltu, -5_i32 as u32, 10), 0);
    /// ```
    pub const fn execute(op: AluOp, a: u32, b: u32) -> u32 {
        let shamt = b & 0x1F;
        match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Sll => a << shamt,
            AluOp::Slt => ((a as i32) < (b as i32)) as u32,
            AluOp::Sltu => (a < b) as u32,
            AluOp::Xor => a ^ b,
            AluOp::Srl => a >> shamt,
            AluOp::Sra => ((a as i32) >> shamt) as u32,
            AluOp::Or => a | b,
            AluOp::And => a & b,
        }
    }
}
