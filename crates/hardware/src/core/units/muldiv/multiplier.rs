//! Partial-product multiplier.
//!
//! Each operand is widened to 33 bits (signed or zero-extended per the
//! variant) and split into an unsigned low half and a signed 17-bit high half.
//! The four cross products fit the narrow hardware multipliers; their shifted
//! sum is the full 64-bit product.

use crate::core::pipeline::signals::MulOp;

/// The four partial products computed in the execute stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MulPartials {
    /// low(a) x low(b).
    pub ll: i64,
    /// low(a) x high(b).
    pub lh: i64,
    /// high(a) x low(b).
    pub hl: i64,
    /// high(a) x high(b).
    pub hh: i64,
}

/// Widens an operand and splits it into (low 16 bits unsigned, high 17 bits signed).
const fn split(val: u32, signed: bool) -> (i64, i64) {
    let wide = if signed { val as i32 as i64 } else { val as i64 };
    (wide & 0xFFFF, wide >> 16)
}

impl MulPartials {
    /// Computes the partial products of `a * b` for the given variant.
    ///
    /// # Arguments
    ///
    /// * `op` - Selects which operands are treated as signed.
    /// * `a` - `rs1` value.
    /// * `b` - `rs2` value.
    pub const fn compute(op: MulOp, a: u32, b: u32) -> Self {
        let (a_signed, b_signed) = match op {
            MulOp::Mul | MulOp::Mulhu => (false, false),
            MulOp::Mulh => (true, true),
            MulOp::Mulhsu => (true, false),
        };
        let (al, ah) = split(a, a_signed);
        let (bl, bh) = split(b, b_signed);
        Self {
            ll: al * bl,
            lh: al * bh,
            hl: ah * bl,
            hh: ah * bh,
        }
    }

    /// Sums the partial products into the 64-bit product (memory stage).
    pub const fn sum(&self) -> i64 {
        self.ll
            .wrapping_add(self.lh.wrapping_shl(16))
            .wrapping_add(self.hl.wrapping_shl(16))
            .wrapping_add(self.hh.wrapping_shl(32))
    }
}

/// Selects the result word from the summed product (write-back stage).
pub const fn select_product(op: MulOp, product: i64) -> u32 {
    match op {
        MulOp::Mul => product as u32,
        MulOp::Mulh | MulOp::Mulhsu | MulOp::Mulhu => (product >> 32) as u32,
    }
}
