//! Privileged CSR access.
//!
//! This module layers the architectural access rules over the raw CSR file.
//! It performs the following:
//! 1. **Read Operations:** Merges the line-driven pending bits into `mip`.
//! 2. **Access Checks:** Privilege, read-only, counter-enable and `TVM` rules.
//! 3. **Write Side Effects:** A `satp` write invalidates both TLBs.

use tracing::debug;

use super::Cpu;
use crate::common::constants::{MEIP_BIT, MSIP_BIT, MTIP_BIT};
use crate::core::arch::csr::{self, MSTATUS_TVM, is_read_only, required_privilege};
use crate::core::arch::mode::PrivilegeMode;

impl Cpu {
    /// Effective `mip`: software bits plus the external, timer and software lines.
    pub fn mip(&self) -> u32 {
        let mut mip = self.csrs.mip;
        if self.csrs.irq_pending & self.csrs.irq_mask != 0 {
            mip |= 1 << MEIP_BIT;
        }
        if self.timer_irq {
            mip |= 1 << MTIP_BIT;
        }
        if self.software_irq {
            mip |= 1 << MSIP_BIT;
        }
        mip
    }

    /// Interrupts that are both pending and enabled, before global enables.
    pub fn pending_interrupts(&self) -> u32 {
        self.mip() & self.csrs.mie
    }

    /// Reads a CSR for an instruction, enforcing the access rules.
    ///
    /// # Arguments
    ///
    /// * `addr` - CSR address.
    /// * `write` - Whether the instruction will also write the CSR.
    ///
    /// # Returns
    ///
    /// The current value, or `None` if the access is illegal.
    pub fn csr_read_checked(&self, addr: u16, write: bool) -> Option<u32> {
        let privilege = self.privilege;
        if required_privilege(addr) > privilege.to_bits() {
            return None;
        }
        if write && is_read_only(addr) {
            return None;
        }
        if !self.counter_enabled(addr) {
            return None;
        }
        if addr == csr::SATP && privilege == PrivilegeMode::Supervisor && self.csrs.status(MSTATUS_TVM) {
            return None;
        }
        match addr {
            csr::MIP => Some(self.mip()),
            _ => self.csrs.read(addr),
        }
    }

    /// Counter CSRs below M are gated by `mcounteren`, and in U also by `scounteren`.
    fn counter_enabled(&self, addr: u16) -> bool {
        if !matches!(addr, csr::CYCLE | csr::INSTRET | csr::CYCLEH | csr::INSTRETH) {
            return true;
        }
        let bit = 1 << (addr & 0x1F);
        match self.privilege {
            PrivilegeMode::Machine => true,
            PrivilegeMode::Supervisor => self.csrs.mcounteren & bit != 0,
            PrivilegeMode::User => self.csrs.mcounteren & bit != 0 && self.csrs.scounteren & bit != 0,
        }
    }

    /// Writes a CSR after a successful checked read, applying side effects.
    pub fn csr_write(&mut self, addr: u16, value: u32) {
        self.csrs.write(addr, value);
        if addr == csr::SATP {
            debug!(satp = format_args!("{:#010x}", self.csrs.satp), "satp write, TLBs invalidated");
            self.mmu.invalidate();
            self.reservation = false;
        }
    }
}
