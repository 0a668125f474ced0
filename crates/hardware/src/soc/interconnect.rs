//! Split-port memory bus.
//!
//! This module implements the environment the core is connected to. It provides:
//! 1. **Address routing:** RAM, the IO scratch window and configured error regions.
//! 2. **Timing:** A fixed latency from acceptance to the first beat, then one beat per cycle.
//! 3. **Loader access:** Untimed reads and writes for program loading and inspection.

use std::collections::VecDeque;

use tracing::trace;

use super::memory::Memory;
use super::traits::{Bus, BusCommand, BusPort, BusResponse};
use crate::config::{MemoryConfig, Region};

/// Size of the backing store placed behind the IO window. Accesses beyond it
/// inside the window read zero and drop writes.
const IO_SCRATCH_BYTES: u32 = 0x1000;

/// A response beat waiting for its cycle.
#[derive(Clone, Copy, Debug)]
struct PendingBeat {
    ready_at: u64,
    rsp: BusResponse,
}

/// The model memory environment.
///
/// Reads snapshot their data and writes take effect when the command is
/// accepted; only the responses are delayed. Each port holds one transaction
/// at a time.
#[derive(Debug)]
pub struct MemoryBus {
    ram: Memory,
    io: Memory,
    io_window: Region,
    error_regions: Vec<Region>,
    latency: u64,
    now: u64,
    ibus: VecDeque<PendingBeat>,
    dbus: VecDeque<PendingBeat>,
    /// Commands accepted on each port, instruction then data.
    pub commands: [u64; 2],
}

impl MemoryBus {
    /// Builds the environment described by `config`.
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            ram: Memory::new(config.ram_base, config.ram_size),
            io: Memory::new(config.io_base, IO_SCRATCH_BYTES.min(config.io_size)),
            io_window: config.io_region(),
            error_regions: config.error_regions.clone(),
            latency: config.latency.max(1),
            now: 0,
            ibus: VecDeque::new(),
            dbus: VecDeque::new(),
            commands: [0; 2],
        }
    }

    /// Current environment cycle.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Returns true when neither port has a transaction in flight.
    pub fn is_idle(&self) -> bool {
        self.ibus.is_empty() && self.dbus.is_empty()
    }

    fn queue_mut(&mut self, port: BusPort) -> &mut VecDeque<PendingBeat> {
        match port {
            BusPort::Instruction => &mut self.ibus,
            BusPort::Data => &mut self.dbus,
        }
    }

    fn is_error(&self, addr: u32) -> bool {
        self.error_regions.iter().any(|r| r.contains(addr))
    }

    /// Untimed word read, as the bus would return it.
    ///
    /// # Returns
    ///
    /// `None` for error regions and unmapped addresses.
    pub fn read_word(&self, addr: u32) -> Option<u32> {
        if self.is_error(addr) {
            return None;
        }
        if self.ram.contains(addr) {
            return self.ram.read_word(addr);
        }
        if self.io_window.contains(addr) {
            return Some(self.io.read_word(addr).unwrap_or(0));
        }
        None
    }

    /// Untimed masked word write.
    ///
    /// # Returns
    ///
    /// `false` for error regions and unmapped addresses. Writes anywhere in
    /// the IO window succeed.
    pub fn write_word(&mut self, addr: u32, data: u32, mask: u8) -> bool {
        if self.is_error(addr) {
            return false;
        }
        if self.ram.contains(addr) {
            return self.ram.write_word(addr, data, mask);
        }
        if self.io_window.contains(addr) {
            // The window past the scratch reads as zero and absorbs writes.
            if !self.io.write_word(addr, data, mask) {
                trace!(addr = format_args!("{addr:#010x}"), "io write past scratch dropped");
            }
            return true;
        }
        false
    }

    /// Copies a byte image into RAM.
    ///
    /// # Returns
    ///
    /// `false` if the image does not fit inside RAM.
    pub fn load_bytes(&mut self, addr: u32, data: &[u8]) -> bool {
        self.ram.load(addr, data)
    }

    /// RAM base address.
    pub const fn ram_base(&self) -> u32 {
        self.ram.base()
    }
}

impl Bus for MemoryBus {
    fn issue(&mut self, port: BusPort, cmd: BusCommand) -> bool {
        if !self.queue_mut(port).is_empty() {
            return false;
        }
        let start = self.now + self.latency;
        let beats: Vec<PendingBeat> = if cmd.write {
            let ok = self.write_word(cmd.addr, cmd.data, cmd.mask);
            vec![PendingBeat {
                ready_at: start,
                rsp: BusResponse { data: 0, error: !ok },
            }]
        } else {
            (0..cmd.burst_len.max(1))
                .map(|i| {
                    let addr = cmd.addr.wrapping_add(4 * i as u32);
                    let word = self.read_word(addr);
                    PendingBeat {
                        ready_at: start + i as u64,
                        rsp: BusResponse {
                            data: word.unwrap_or(0),
                            error: word.is_none(),
                        },
                    }
                })
                .collect()
        };
        trace!(?port, addr = format_args!("{:#010x}", cmd.addr), write = cmd.write, beats = beats.len(), "bus command");
        self.commands[port as usize] += 1;
        self.queue_mut(port).extend(beats);
        true
    }

    fn response(&mut self, port: BusPort) -> Option<BusResponse> {
        let now = self.now;
        let queue = self.queue_mut(port);
        if queue.front().is_some_and(|b| b.ready_at <= now) {
            queue.pop_front().map(|b| b.rsp)
        } else {
            None
        }
    }

    fn tick(&mut self) {
        self.now += 1;
    }
}
