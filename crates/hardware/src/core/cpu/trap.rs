//! Trap entry and return.
//!
//! The single point where a trap becomes architectural. It performs the following:
//! 1. **Delegation:** Picks M or S as the target from `medeleg`/`mideleg` and the current privilege.
//! 2. **Context Saving:** Writes `xepc`, `xcause`, `xtval` and stacks the interrupt enable and privilege.
//! 3. **Vectoring:** Direct or vectored handler address from `xtvec`.
//! 4. **Return Handling:** `MRET` and `SRET` undo exactly that transformation.

use tracing::debug;

use super::Cpu;
use crate::common::Trap;
use crate::core::arch::csr::{
    MSTATUS_MIE, MSTATUS_MPIE, MSTATUS_MPP, MSTATUS_MPP_SHIFT, MSTATUS_MPRV, MSTATUS_SIE,
    MSTATUS_SPIE, MSTATUS_SPP, TVEC_VECTORED,
};
use crate::core::arch::mode::PrivilegeMode;

/// Handler address for `tvec`; vectored mode offsets interrupts by `4 * code`.
const fn vector(tvec: u32, trap: Trap) -> u32 {
    let base = tvec & !3;
    if tvec & TVEC_VECTORED != 0 && trap.is_interrupt() {
        base.wrapping_add(4 * trap.code())
    } else {
        base
    }
}

impl Cpu {
    /// Privilege level that handles `trap` from the current mode.
    pub fn trap_target(&self, trap: Trap) -> PrivilegeMode {
        let deleg = if trap.is_interrupt() {
            self.csrs.mideleg
        } else {
            self.csrs.medeleg
        };
        if self.privilege <= PrivilegeMode::Supervisor && deleg & (1 << trap.code()) != 0 {
            PrivilegeMode::Supervisor
        } else {
            PrivilegeMode::Machine
        }
    }

    /// Takes a trap.
    ///
    /// # Arguments
    ///
    /// * `trap` - The exception or interrupt.
    /// * `epc` - PC of the trapping instruction, or of the next instruction for interrupts.
    ///
    /// # Returns
    ///
    /// The handler address fetch must continue at.
    pub fn commit_trap(&mut self, trap: Trap, epc: u32) -> u32 {
        let target = self.trap_target(trap);
        let status = self.csrs.mstatus;
        let prev = self.privilege.to_bits();
        let handler = match target {
            PrivilegeMode::Supervisor => {
                self.csrs.sepc = epc & !3;
                self.csrs.scause = trap.cause();
                self.csrs.stval = trap.tval();
                let mut s = status & !(MSTATUS_SPIE | MSTATUS_SIE | MSTATUS_SPP);
                if status & MSTATUS_SIE != 0 {
                    s |= MSTATUS_SPIE;
                }
                if prev != 0 {
                    s |= MSTATUS_SPP;
                }
                self.csrs.mstatus = s;
                vector(self.csrs.stvec, trap)
            }
            _ => {
                self.csrs.mepc = epc & !3;
                self.csrs.mcause = trap.cause();
                self.csrs.mtval = trap.tval();
                let mut s = status & !(MSTATUS_MPIE | MSTATUS_MIE | MSTATUS_MPP);
                if status & MSTATUS_MIE != 0 {
                    s |= MSTATUS_MPIE;
                }
                s |= prev << MSTATUS_MPP_SHIFT;
                self.csrs.mstatus = s;
                vector(self.csrs.mtvec, trap)
            }
        };
        debug!(
            %trap,
            epc = format_args!("{epc:#010x}"),
            from = %self.privilege,
            to = %target,
            handler = format_args!("{handler:#010x}"),
            "trap taken"
        );
        self.privilege = target;
        self.reservation = false;
        self.wfi = false;
        if trap.is_interrupt() {
            self.stats.interrupts_taken += 1;
        } else {
            self.stats.traps_taken += 1;
        }
        handler
    }

    /// Returns from a machine-mode trap.
    ///
    /// # Returns
    ///
    /// The saved `mepc`.
    pub fn mret(&mut self) -> u32 {
        let status = self.csrs.mstatus;
        let mpp = PrivilegeMode::from_bits((status & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT);
        let mut s = status & !(MSTATUS_MIE | MSTATUS_MPP);
        if status & MSTATUS_MPIE != 0 {
            s |= MSTATUS_MIE;
        }
        s |= MSTATUS_MPIE;
        if mpp != PrivilegeMode::Machine {
            s &= !MSTATUS_MPRV;
        }
        self.csrs.mstatus = s;
        debug!(to = %mpp, mepc = format_args!("{:#010x}", self.csrs.mepc), "mret");
        self.privilege = mpp;
        self.reservation = false;
        self.csrs.mepc
    }

    /// Returns from a supervisor-mode trap.
    ///
    /// # Returns
    ///
    /// The saved `sepc`.
    pub fn sret(&mut self) -> u32 {
        let status = self.csrs.mstatus;
        let spp = if status & MSTATUS_SPP != 0 {
            PrivilegeMode::Supervisor
        } else {
            PrivilegeMode::User
        };
        let mut s = status & !(MSTATUS_SIE | MSTATUS_SPP | MSTATUS_MPRV);
        if status & MSTATUS_SPIE != 0 {
            s |= MSTATUS_SIE;
        }
        s |= MSTATUS_SPIE;
        self.csrs.mstatus = s;
        debug!(to = %spp, sepc = format_args!("{:#010x}", self.csrs.sepc), "sret");
        self.privilege = spp;
        self.reservation = false;
        self.csrs.sepc
    }
}
