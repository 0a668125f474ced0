//! Bus port ownership.
//!
//! Each bus port carries one transaction at a time. The owner of the
//! transaction in flight is recorded when the command is accepted so that
//! response beats reach the unit that asked for them. On the data port the
//! loader, the walker and the memory stage compete; the arbitration itself
//! lives in the commit phase of [`Cpu::tick`](crate::core::Cpu::tick).

/// A unit that can own a bus transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusClient {
    /// Instruction cache line loader.
    InstructionCache,
    /// Data cache line loader.
    DataCache,
    /// Page-table walker.
    Walker,
    /// Memory stage: stores, AMOs, SC and uncached IO.
    MemoryStage,
    /// Beats of a transaction abandoned by a reset.
    Discard,
}

/// Ownership of one bus port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PortState {
    owner: Option<BusClient>,
    beats_left: usize,
}

impl PortState {
    /// Returns true if a transaction is in flight.
    pub const fn is_busy(&self) -> bool {
        self.owner.is_some()
    }

    /// Owner of the transaction in flight.
    pub const fn owner(&self) -> Option<BusClient> {
        self.owner
    }

    /// Records an accepted command producing `beats` response beats.
    pub fn accept(&mut self, client: BusClient, beats: usize) {
        self.owner = Some(client);
        self.beats_left = beats.max(1);
    }

    /// Routes one response beat, releasing the port after the last one.
    pub fn route(&mut self) -> Option<BusClient> {
        let owner = self.owner?;
        self.beats_left = self.beats_left.saturating_sub(1);
        if self.beats_left == 0 {
            self.owner = None;
        }
        Some(owner)
    }

    /// Keeps draining the transaction in flight but drops its beats.
    pub fn abandon(&mut self) {
        if self.owner.is_some() {
            self.owner = Some(BusClient::Discard);
        }
    }
}
