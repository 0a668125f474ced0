//! Interrupt selection.
//!
//! Turns pending and enabled interrupt bits into the single interrupt the core
//! should take, honouring delegation, the global enables of the current
//! privilege level and the fixed priority order.

use crate::common::Trap;
use crate::common::constants::{MEIP_BIT, MSIP_BIT, MTIP_BIT, SEIP_BIT, SSIP_BIT, STIP_BIT};
use crate::core::arch::csr::{MSTATUS_MIE, MSTATUS_SIE};
use crate::core::arch::mode::PrivilegeMode;

/// Interrupt bits in descending priority, with the trap each one raises.
const PRIORITY: [(u32, Trap); 6] = [
    (MEIP_BIT, Trap::MachineExternalInterrupt),
    (MSIP_BIT, Trap::MachineSoftwareInterrupt),
    (MTIP_BIT, Trap::MachineTimerInterrupt),
    (SEIP_BIT, Trap::SupervisorExternalInterrupt),
    (SSIP_BIT, Trap::SupervisorSoftwareInterrupt),
    (STIP_BIT, Trap::SupervisorTimerInterrupt),
];

/// Picks the interrupt to take, if any.
///
/// # Arguments
///
/// * `pending` - `mip & mie`.
/// * `mideleg` - Delegation mask; delegated bits target S-mode.
/// * `mstatus` - For the `MIE`/`SIE` global enables.
/// * `privilege` - Current privilege level.
///
/// # Returns
///
/// The highest-priority interrupt that is enabled at the current level.
pub fn select_interrupt(
    pending: u32,
    mideleg: u32,
    mstatus: u32,
    privilege: PrivilegeMode,
) -> Option<Trap> {
    let m_enabled = privilege < PrivilegeMode::Machine || mstatus & MSTATUS_MIE != 0;
    let s_enabled = privilege < PrivilegeMode::Supervisor
        || (privilege == PrivilegeMode::Supervisor && mstatus & MSTATUS_SIE != 0);

    PRIORITY
        .iter()
        .filter(|(bit, _)| pending & (1 << bit) != 0)
        .find(|(bit, _)| {
            if mideleg & (1 << bit) != 0 {
                s_enabled
            } else {
                m_enabled
            }
        })
        .map(|&(_, trap)| trap)
}
