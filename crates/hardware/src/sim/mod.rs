//! Simulation shell and program loading.
//!
//! Provides the [`Simulator`] that pairs a core with its memory environment,
//! and the loaders that place program images into RAM.

/// ELF and raw binary loaders.
pub mod loader;

/// Core plus memory environment, ticked together.
pub mod simulator;

pub use simulator::Simulator;
