//! Trap and simulator error definitions.
//!
//! Two kinds of failure exist in the model:
//! 1. **Traps:** Architectural exceptions and interrupts. They are ordinary
//!    values carried down the pipeline and committed at write-back.
//! 2. **Simulator errors:** Conditions that stop the model itself, such as an
//!    unreadable program image or a broken arbitration invariant.

use std::fmt;

use thiserror::Error;

use crate::isa::privileged::cause::{exception, interrupt};

/// RISC-V trap types representing exceptions and interrupts.
///
/// Exception payloads hold the value destined for `xtval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Jump or branch target not aligned to four bytes. Holds the target.
    InstructionAddressMisaligned(u32),
    /// Instruction fetch hit a bus error. Holds the fetch address.
    InstructionAccessFault(u32),
    /// Undecodable or privileged-in-context instruction. Holds the encoding.
    IllegalInstruction(u32),
    /// `EBREAK`. Holds the program counter.
    Breakpoint(u32),
    /// Misaligned load or LR. Holds the effective address.
    LoadAddressMisaligned(u32),
    /// Load hit a bus error or an error-marked line. Holds the effective address.
    LoadAccessFault(u32),
    /// Misaligned store, SC or AMO. Holds the effective address.
    StoreAddressMisaligned(u32),
    /// Store or AMO hit a bus error. Holds the effective address.
    StoreAccessFault(u32),
    /// `ECALL` from user mode.
    EnvironmentCallFromUMode,
    /// `ECALL` from supervisor mode.
    EnvironmentCallFromSMode,
    /// `ECALL` from machine mode.
    EnvironmentCallFromMMode,
    /// Fetch translation failed. Holds the virtual address.
    InstructionPageFault(u32),
    /// Load translation failed. Holds the virtual address.
    LoadPageFault(u32),
    /// Store or AMO translation failed. Holds the virtual address.
    StorePageFault(u32),
    /// Supervisor software interrupt.
    SupervisorSoftwareInterrupt,
    /// Machine software interrupt.
    MachineSoftwareInterrupt,
    /// Supervisor timer interrupt.
    SupervisorTimerInterrupt,
    /// Machine timer interrupt.
    MachineTimerInterrupt,
    /// Supervisor external interrupt.
    SupervisorExternalInterrupt,
    /// Machine external interrupt.
    MachineExternalInterrupt,
}

impl Trap {
    /// Returns true for asynchronous interrupts.
    pub const fn is_interrupt(self) -> bool {
        matches!(
            self,
            Self::SupervisorSoftwareInterrupt
                | Self::MachineSoftwareInterrupt
                | Self::SupervisorTimerInterrupt
                | Self::MachineTimerInterrupt
                | Self::SupervisorExternalInterrupt
                | Self::MachineExternalInterrupt
        )
    }

    /// Exception or interrupt code, without the interrupt bit.
    pub const fn code(self) -> u32 {
        match self {
            Self::InstructionAddressMisaligned(_) => exception::INSTRUCTION_ADDRESS_MISALIGNED,
            Self::InstructionAccessFault(_) => exception::INSTRUCTION_ACCESS_FAULT,
            Self::IllegalInstruction(_) => exception::ILLEGAL_INSTRUCTION,
            Self::Breakpoint(_) => exception::BREAKPOINT,
            Self::LoadAddressMisaligned(_) => exception::LOAD_ADDRESS_MISALIGNED,
            Self::LoadAccessFault(_) => exception::LOAD_ACCESS_FAULT,
            Self::StoreAddressMisaligned(_) => exception::STORE_ADDRESS_MISALIGNED,
            Self::StoreAccessFault(_) => exception::STORE_ACCESS_FAULT,
            Self::EnvironmentCallFromUMode => exception::ENVIRONMENT_CALL_FROM_U_MODE,
            Self::EnvironmentCallFromSMode => exception::ENVIRONMENT_CALL_FROM_S_MODE,
            Self::EnvironmentCallFromMMode => exception::ENVIRONMENT_CALL_FROM_M_MODE,
            Self::InstructionPageFault(_) => exception::INSTRUCTION_PAGE_FAULT,
            Self::LoadPageFault(_) => exception::LOAD_PAGE_FAULT,
            Self::StorePageFault(_) => exception::STORE_PAGE_FAULT,
            Self::SupervisorSoftwareInterrupt => interrupt::SUPERVISOR_SOFTWARE,
            Self::MachineSoftwareInterrupt => interrupt::MACHINE_SOFTWARE,
            Self::SupervisorTimerInterrupt => interrupt::SUPERVISOR_TIMER,
            Self::MachineTimerInterrupt => interrupt::MACHINE_TIMER,
            Self::SupervisorExternalInterrupt => interrupt::SUPERVISOR_EXTERNAL,
            Self::MachineExternalInterrupt => interrupt::MACHINE_EXTERNAL,
        }
    }

    /// Value written to `mcause`/`scause`.
    pub const fn cause(self) -> u32 {
        if self.is_interrupt() {
            crate::common::constants::CAUSE_INTERRUPT_BIT | self.code()
        } else {
            self.code()
        }
    }

    /// Value written to `mtval`/`stval`.
    pub const fn tval(self) -> u32 {
        match self {
            Self::InstructionAddressMisaligned(v)
            | Self::InstructionAccessFault(v)
            | Self::IllegalInstruction(v)
            | Self::Breakpoint(v)
            | Self::LoadAddressMisaligned(v)
            | Self::LoadAccessFault(v)
            | Self::StoreAddressMisaligned(v)
            | Self::StoreAccessFault(v)
            | Self::InstructionPageFault(v)
            | Self::LoadPageFault(v)
            | Self::StorePageFault(v) => v,
            _ => 0,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionAddressMisaligned(a) => write!(f, "InstructionAddressMisaligned({a:#x})"),
            Self::InstructionAccessFault(a) => write!(f, "InstructionAccessFault({a:#x})"),
            Self::IllegalInstruction(i) => write!(f, "IllegalInstruction({i:#010x})"),
            Self::Breakpoint(pc) => write!(f, "Breakpoint({pc:#x})"),
            Self::LoadAddressMisaligned(a) => write!(f, "LoadAddressMisaligned({a:#x})"),
            Self::LoadAccessFault(a) => write!(f, "LoadAccessFault({a:#x})"),
            Self::StoreAddressMisaligned(a) => write!(f, "StoreAddressMisaligned({a:#x})"),
            Self::StoreAccessFault(a) => write!(f, "StoreAccessFault({a:#x})"),
            Self::InstructionPageFault(a) => write!(f, "InstructionPageFault({a:#x})"),
            Self::LoadPageFault(a) => write!(f, "LoadPageFault({a:#x})"),
            Self::StorePageFault(a) => write!(f, "StorePageFault({a:#x})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Failures that stop the simulator rather than the simulated program.
#[derive(Debug, Error)]
pub enum SimError {
    /// A stage handed an instruction to a successor that was stuck and not
    /// being flushed, so two instructions claimed one pipeline slot.
    #[error("arbitration inconsistency at cycle {cycle}: {stage} fired into stuck {successor}")]
    ArbitrationInconsistency {
        /// Cycle on which the inconsistency was detected.
        cycle: u64,
        /// Name of the firing stage.
        stage: &'static str,
        /// Name of the stuck successor.
        successor: &'static str,
    },

    /// A program image could not be read from disk.
    #[error("failed to read {path}")]
    Io {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A program image was not a valid ELF file.
    #[error("malformed ELF image")]
    Elf(#[from] object::Error),

    /// A program image could not be placed in memory.
    #[error("cannot load image: {0}")]
    Load(String),

    /// A configuration document failed to parse.
    #[error("invalid configuration document")]
    ConfigParse(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// `run_until` gave up after the cycle limit.
    #[error("condition not reached after {0} cycles")]
    Timeout(u64),
}
