/// Stall and flush propagation in the arbitration network.
pub mod arbitration;

/// Youngest-writer forwarding lookup.
pub mod forwarding;

/// Memory-stage decisions against in-flight fills.
pub mod memory;

/// Random programs compared against a sequential interpreter.
pub mod transparency;
