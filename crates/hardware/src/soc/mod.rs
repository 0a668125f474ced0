//! Memory environment of the core.
//!
//! The core talks to the outside world through two bus ports, one for
//! instruction fetch and one for data. This module defines that contract and a
//! model environment implementing it:
//! 1. **Traits:** The `Bus` trait with its command and response beats.
//! 2. **Memory:** Word-addressed backing storage.
//! 3. **Interconnect:** `MemoryBus`, mapping RAM, an IO scratch window and
//!    error regions behind a fixed access latency.

/// Split-port bus routing with latency and error windows.
pub mod interconnect;

/// Backing storage for RAM and IO regions.
pub mod memory;

/// Bus contract between the core and its environment.
pub mod traits;

pub use interconnect::MemoryBus;
pub use traits::{Bus, BusCommand, BusPort, BusResponse};
