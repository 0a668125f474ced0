//! Multiply and divide units.
//!
//! Both units spread one instruction over several pipeline stages:
//! 1. **Multiplier:** Four partial products in execute, summed in memory, the
//!    high or low word selected in write-back.
//! 2. **Divider:** A 32-step restoring divider that holds the memory stage
//!    until the quotient and remainder are ready.

/// Iterative restoring divider.
pub mod divider;

/// Partial-product multiplier.
pub mod multiplier;

pub use divider::DivState;
pub use multiplier::{MulPartials, select_product};
