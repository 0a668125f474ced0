//! RISC-V privilege modes.

use std::fmt;

/// RISC-V privilege mode levels, ordered by privilege.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivilegeMode {
    /// User mode (U-mode).
    User = 0,

    /// Supervisor mode (S-mode).
    Supervisor = 1,

    /// Machine mode (M-mode). The reset mode.
    #[default]
    Machine = 3,
}

impl PrivilegeMode {
    /// Converts the two-bit encoding used by `mstatus.MPP`.
    ///
    /// The reserved encoding 2 is treated as user mode, since `MPP` is WARL and
    /// never holds it.
    pub const fn from_bits(val: u32) -> Self {
        match val & 3 {
            3 => Self::Machine,
            1 => Self::Supervisor,
            _ => Self::User,
        }
    }

    /// Returns the two-bit encoding.
    pub const fn to_bits(self) -> u32 {
        self as u32
    }

    /// Returns the human-readable name of the mode.
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Supervisor => "Supervisor",
            Self::Machine => "Machine",
        }
    }
}

impl fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
