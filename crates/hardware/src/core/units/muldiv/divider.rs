//! Iterative restoring divider.
//!
//! Works on magnitudes and fixes signs at the end. One quotient bit is
//! produced per step, so every division takes exactly [`DIV_STEPS`] cycles in
//! the memory stage. Division by zero needs no special case: the restoring
//! loop yields an all-ones quotient and the dividend as remainder, as the ISA
//! requires. Signed overflow (`i32::MIN / -1`) also falls out of the sign fix.

use crate::core::pipeline::signals::DivOp;

/// Number of iterations of one division.
pub const DIV_STEPS: u8 = 32;

/// In-flight state of a division, carried in the memory-stage latch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DivState {
    /// Steps completed.
    pub step: u8,
    /// Partial remainder.
    remainder: u64,
    /// Dividend bits being shifted out, quotient bits shifted in.
    quotient: u32,
    /// Divisor magnitude.
    divisor: u32,
    /// Negate the quotient at the end.
    negate_quotient: bool,
    /// Negate the remainder at the end.
    negate_remainder: bool,
    /// Return the remainder instead of the quotient.
    want_remainder: bool,
}

impl DivState {
    /// Latches operands at the start of a division (execute stage).
    ///
    /// # Arguments
    ///
    /// * `op` - Division variant.
    /// * `a` - Dividend (`rs1`).
    /// * `b` - Divisor (`rs2`).
    pub const fn start(op: DivOp, a: u32, b: u32) -> Self {
        let signed = matches!(op, DivOp::Div | DivOp::Rem);
        let a_neg = signed && (a as i32) < 0;
        let b_neg = signed && (b as i32) < 0;
        Self {
            step: 0,
            remainder: 0,
            quotient: if a_neg { a.wrapping_neg() } else { a },
            divisor: if b_neg { b.wrapping_neg() } else { b },
            negate_quotient: a_neg != b_neg && b != 0,
            negate_remainder: a_neg,
            want_remainder: matches!(op, DivOp::Rem | DivOp::Remu),
        }
    }

    /// Returns true once every step has run.
    pub const fn done(&self) -> bool {
        self.step >= DIV_STEPS
    }

    /// Performs one restoring step.
    #[must_use]
    pub const fn step(mut self) -> Self {
        if self.done() {
            return self;
        }
        self.remainder = (self.remainder << 1) | (self.quotient >> 31) as u64;
        self.quotient <<= 1;
        if self.remainder >= self.divisor as u64 {
            self.remainder -= self.divisor as u64;
            self.quotient |= 1;
        }
        self.step += 1;
        self
    }

    /// The architectural result. Only meaningful once [`done`](Self::done).
    pub const fn result(&self) -> u32 {
        if self.want_remainder {
            let r = self.remainder as u32;
            if self.negate_remainder { r.wrapping_neg() } else { r }
        } else if self.negate_quotient {
            self.quotient.wrapping_neg()
        } else {
            self.quotient
        }
    }
}
