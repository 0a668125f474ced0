//! Bus contract between the core and its memory environment.
//!
//! Each port carries at most one transaction at a time. A read of
//! `burst_len` words returns `burst_len` response beats, one per cycle at
//! most; a write returns a single acknowledge beat. Latency is unbounded but
//! every transaction eventually answers, possibly with the error flag set.

/// The two request ports of the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusPort {
    /// Instruction fetch (instruction cache fills).
    Instruction,
    /// Data side: data cache fills, page-table reads, stores, AMOs and IO.
    Data,
}

/// A request offered on a bus port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusCommand {
    /// Word-aligned start address.
    pub addr: u32,
    /// True for a write.
    pub write: bool,
    /// Write data (ignored for reads).
    pub data: u32,
    /// Byte enables of a write.
    pub mask: u8,
    /// Number of words to read; 1 for writes.
    pub burst_len: usize,
}

impl BusCommand {
    /// A read burst of `burst_len` words starting at `addr`.
    pub const fn read(addr: u32, burst_len: usize) -> Self {
        Self {
            addr: addr & !3,
            write: false,
            data: 0,
            mask: 0,
            burst_len,
        }
    }

    /// A single-beat masked write.
    pub const fn write(addr: u32, data: u32, mask: u8) -> Self {
        Self {
            addr: addr & !3,
            write: true,
            data,
            mask,
            burst_len: 1,
        }
    }

    /// Number of response beats the command produces.
    pub const fn beats(&self) -> usize {
        if self.write { 1 } else { self.burst_len }
    }
}

/// One response beat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusResponse {
    /// Read data; zero for write acknowledges.
    pub data: u32,
    /// The access failed.
    pub error: bool,
}

/// The memory environment seen by the core.
pub trait Bus {
    /// Offers a command on `port`.
    ///
    /// # Returns
    ///
    /// `true` if the command was accepted. A port with a transaction still in
    /// flight refuses new commands.
    fn issue(&mut self, port: BusPort, cmd: BusCommand) -> bool;

    /// Takes the response beat available this cycle on `port`, if any.
    fn response(&mut self, port: BusPort) -> Option<BusResponse>;

    /// Advances the environment by one cycle.
    fn tick(&mut self);
}
