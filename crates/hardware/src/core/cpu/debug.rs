//! Debug control unit.
//!
//! External halt, resume, single-step, hardware breakpoints and instruction
//! injection, reached through a small register file separate from the memory
//! map. It provides:
//! 1. **Run control:** Halt stops fetch and rewinds the decode stage; older
//!    stages drain normally, so a halt never splits an instruction.
//! 2. **Stepping:** With the step bit set, resuming lets one instruction leave
//!    decode before the core halts again. Breakpoints and interrupts are ignored
//!    while stepping.
//! 3. **Breakpoints:** Four PC comparators checked in decode.
//! 4. **Injection:** While halted, a written instruction enters decode at the
//!    current PC and executes without moving the PC.
//!
//! | Offset        | Write                                   | Read                         |
//! |---------------|-----------------------------------------|------------------------------|
//! | `0x00`        | control (step, set/clear reset and halt)| status                       |
//! | `0x04`        | inject an instruction                   | last injected `rd` value     |
//! | `0x08`        |                                         | last retired PC              |
//! | `0x0C`        |                                         | last retired instruction     |
//! | `0x40 + 4*i`  | breakpoint `i` (`pc \| enable`)         | breakpoint `i`               |

use tracing::{debug, warn};

/// Control/status register offset.
pub const DEBUG_CTRL: u32 = 0x00;
/// Instruction injection / injected result offset.
pub const DEBUG_INJECT: u32 = 0x04;
/// Last retired PC offset.
pub const DEBUG_LAST_PC: u32 = 0x08;
/// Last retired instruction offset.
pub const DEBUG_LAST_INST: u32 = 0x0C;
/// First breakpoint register offset.
pub const DEBUG_BREAKPOINT_BASE: u32 = 0x40;
/// Number of hardware breakpoints.
pub const BREAKPOINT_COUNT: usize = 4;

/// Control write: step bit (sticky).
pub const CTRL_STEP: u32 = 1 << 4;
/// Control write: assert reset.
pub const CTRL_SET_RESET: u32 = 1 << 16;
/// Control write: assert halt.
pub const CTRL_SET_HALT: u32 = 1 << 17;
/// Control write: release reset.
pub const CTRL_CLEAR_RESET: u32 = 1 << 24;
/// Control write: release halt.
pub const CTRL_CLEAR_HALT: u32 = 1 << 25;

/// Status read: reset asserted.
pub const STATUS_RESET: u32 = 1 << 0;
/// Status read: halted.
pub const STATUS_HALT: u32 = 1 << 1;
/// Status read: instructions still in flight.
pub const STATUS_BUSY: u32 = 1 << 2;
/// Status read: halted by a breakpoint.
pub const STATUS_HALTED_BY_BREAK: u32 = 1 << 3;
/// Status read: step bit.
pub const STATUS_STEP: u32 = 1 << 4;

/// State of the debug unit.
#[derive(Clone, Debug, Default)]
pub struct DebugUnit {
    /// Core held in reset.
    pub reset: bool,
    /// Core halted.
    pub halt: bool,
    /// The current halt came from a breakpoint.
    pub halted_by_break: bool,
    /// Halt again after the next instruction leaves decode.
    pub stepping: bool,
    breakpoints: [u32; BREAKPOINT_COUNT],
    /// Instruction waiting to enter decode.
    pub inject: Option<u32>,
    /// Last `rd` value written by an injected instruction.
    pub inject_result: u32,
    /// PC of the last retired instruction.
    pub last_pc: u32,
    /// Word of the last retired instruction.
    pub last_inst: u32,
}

impl DebugUnit {
    /// Creates a debug unit with the core running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if interrupts may be taken.
    pub const fn allows_interrupts(&self) -> bool {
        !self.halt && !self.stepping && !self.reset
    }

    /// Returns true if an enabled breakpoint matches `pc`. Never while stepping.
    pub fn breakpoint_hit(&self, pc: u32) -> bool {
        !self.stepping
            && self
                .breakpoints
                .iter()
                .any(|&bp| bp & 1 != 0 && bp & !1 == pc)
    }

    /// Halts on a breakpoint.
    pub fn enter_breakpoint(&mut self, pc: u32) {
        debug!(pc = format_args!("{pc:#010x}"), "breakpoint halt");
        self.halt = true;
        self.halted_by_break = true;
    }

    /// Called when a fetched instruction leaves decode.
    pub fn instruction_issued(&mut self) {
        if self.stepping && !self.halt {
            self.halt = true;
        }
    }

    /// Handles a write to the debug register file.
    pub fn write(&mut self, addr: u32, value: u32) {
        match addr {
            DEBUG_CTRL => {
                self.stepping = value & CTRL_STEP != 0;
                if value & CTRL_SET_RESET != 0 {
                    self.reset = true;
                }
                if value & CTRL_CLEAR_RESET != 0 {
                    self.reset = false;
                }
                if value & CTRL_SET_HALT != 0 {
                    self.halt = true;
                }
                if value & CTRL_CLEAR_HALT != 0 {
                    self.halt = false;
                    self.halted_by_break = false;
                }
            }
            DEBUG_INJECT => {
                if self.halt {
                    self.inject = Some(value);
                } else {
                    warn!(inst = format_args!("{value:#010x}"), "injection ignored while running");
                }
            }
            _ => {
                if let Some(i) = breakpoint_index(addr) {
                    self.breakpoints[i] = value;
                }
            }
        }
    }

    /// Handles a read from the debug register file.
    ///
    /// # Arguments
    ///
    /// * `addr` - Register offset.
    /// * `busy` - Whether any instruction is in flight.
    pub fn read(&self, addr: u32, busy: bool) -> u32 {
        match addr {
            DEBUG_CTRL => {
                let mut status = 0;
                if self.reset {
                    status |= STATUS_RESET;
                }
                if self.halt {
                    status |= STATUS_HALT;
                }
                if busy || self.inject.is_some() {
                    status |= STATUS_BUSY;
                }
                if self.halted_by_break {
                    status |= STATUS_HALTED_BY_BREAK;
                }
                if self.stepping {
                    status |= STATUS_STEP;
                }
                status
            }
            DEBUG_INJECT => self.inject_result,
            DEBUG_LAST_PC => self.last_pc,
            DEBUG_LAST_INST => self.last_inst,
            _ => breakpoint_index(addr).map_or(0, |i| self.breakpoints[i]),
        }
    }
}

fn breakpoint_index(addr: u32) -> Option<usize> {
    let offset = addr.checked_sub(DEBUG_BREAKPOINT_BASE)?;
    let index = (offset / 4) as usize;
    (offset % 4 == 0 && index < BREAKPOINT_COUNT).then_some(index)
}
