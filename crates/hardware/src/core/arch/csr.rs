//! Control and Status Register (CSR) definitions and storage.
//!
//! This module implements the CSR storage of the core. It provides:
//! 1. **Address Definitions:** Constants for the machine, supervisor, counter and custom CSRs.
//! 2. **Field Masks:** Bitmasks for `mstatus`, `mip`/`mie`, `satp` and the trap vectors.
//! 3. **Register Storage:** The `Csrs` struct holding architectural state.
//! 4. **Raw Access:** Masked reads and writes with no privilege checks; those live
//!    on the CPU, which also knows the interrupt lines feeding `mip`.

/// Machine vendor ID.
pub const MVENDORID: u16 = 0xF11;
/// Machine architecture ID.
pub const MARCHID: u16 = 0xF12;
/// Machine implementation ID.
pub const MIMPID: u16 = 0xF13;
/// Hart ID.
pub const MHARTID: u16 = 0xF14;

/// Machine status register.
pub const MSTATUS: u16 = 0x300;
/// Machine ISA register.
pub const MISA: u16 = 0x301;
/// Machine exception delegation.
pub const MEDELEG: u16 = 0x302;
/// Machine interrupt delegation.
pub const MIDELEG: u16 = 0x303;
/// Machine interrupt enable.
pub const MIE: u16 = 0x304;
/// Machine trap vector.
pub const MTVEC: u16 = 0x305;
/// Machine counter enable.
pub const MCOUNTEREN: u16 = 0x306;
/// Machine scratch.
pub const MSCRATCH: u16 = 0x340;
/// Machine exception PC.
pub const MEPC: u16 = 0x341;
/// Machine trap cause.
pub const MCAUSE: u16 = 0x342;
/// Machine trap value.
pub const MTVAL: u16 = 0x343;
/// Machine interrupt pending.
pub const MIP: u16 = 0x344;

/// Supervisor status (view of `mstatus`).
pub const SSTATUS: u16 = 0x100;
/// Supervisor interrupt enable (view of `mie`).
pub const SIE: u16 = 0x104;
/// Supervisor trap vector.
pub const STVEC: u16 = 0x105;
/// Supervisor counter enable.
pub const SCOUNTEREN: u16 = 0x106;
/// Supervisor scratch.
pub const SSCRATCH: u16 = 0x140;
/// Supervisor exception PC.
pub const SEPC: u16 = 0x141;
/// Supervisor trap cause.
pub const SCAUSE: u16 = 0x142;
/// Supervisor trap value.
pub const STVAL: u16 = 0x143;
/// Supervisor interrupt pending (view of `mip`).
pub const SIP: u16 = 0x144;
/// Supervisor address translation and protection.
pub const SATP: u16 = 0x180;

/// Machine cycle counter, low word.
pub const MCYCLE: u16 = 0xB00;
/// Machine retired-instruction counter, low word.
pub const MINSTRET: u16 = 0xB02;
/// Machine cycle counter, high word.
pub const MCYCLEH: u16 = 0xB80;
/// Machine retired-instruction counter, high word.
pub const MINSTRETH: u16 = 0xB82;
/// User cycle counter shadow, low word.
pub const CYCLE: u16 = 0xC00;
/// User retired-instruction counter shadow, low word.
pub const INSTRET: u16 = 0xC02;
/// User cycle counter shadow, high word.
pub const CYCLEH: u16 = 0xC80;
/// User retired-instruction counter shadow, high word.
pub const INSTRETH: u16 = 0xC82;

/// External interrupt mask, one bit per line (custom, machine read/write).
pub const IRQ_MASK: u16 = 0xBC0;
/// External interrupt pending, one bit per line (custom, machine read-only).
pub const IRQ_PENDING: u16 = 0xFC0;

/// `mstatus.SIE`.
pub const MSTATUS_SIE: u32 = 1 << 1;
/// `mstatus.MIE`.
pub const MSTATUS_MIE: u32 = 1 << 3;
/// `mstatus.SPIE`.
pub const MSTATUS_SPIE: u32 = 1 << 5;
/// `mstatus.MPIE`.
pub const MSTATUS_MPIE: u32 = 1 << 7;
/// `mstatus.SPP`.
pub const MSTATUS_SPP: u32 = 1 << 8;
/// Shift of `mstatus.MPP`.
pub const MSTATUS_MPP_SHIFT: u32 = 11;
/// `mstatus.MPP` field mask.
pub const MSTATUS_MPP: u32 = 3 << MSTATUS_MPP_SHIFT;
/// `mstatus.MPRV`: data accesses use the privilege in `MPP`.
pub const MSTATUS_MPRV: u32 = 1 << 17;
/// `mstatus.SUM`: supervisor may access user pages.
pub const MSTATUS_SUM: u32 = 1 << 18;
/// `mstatus.MXR`: loads may read execute-only pages.
pub const MSTATUS_MXR: u32 = 1 << 19;
/// `mstatus.TVM`: trap `satp` and `SFENCE.VMA` in S-mode.
pub const MSTATUS_TVM: u32 = 1 << 20;
/// `mstatus.TW`: trap `WFI` below M-mode.
pub const MSTATUS_TW: u32 = 1 << 21;
/// `mstatus.TSR`: trap `SRET` in S-mode.
pub const MSTATUS_TSR: u32 = 1 << 22;

/// Writable bits of `mstatus`.
pub const MSTATUS_WRITE_MASK: u32 = MSTATUS_SIE
    | MSTATUS_MIE
    | MSTATUS_SPIE
    | MSTATUS_MPIE
    | MSTATUS_SPP
    | MSTATUS_MPP
    | MSTATUS_MPRV
    | MSTATUS_SUM
    | MSTATUS_MXR
    | MSTATUS_TVM
    | MSTATUS_TW
    | MSTATUS_TSR;

/// Bits of `mstatus` visible through `sstatus`.
pub const SSTATUS_MASK: u32 = MSTATUS_SIE | MSTATUS_SPIE | MSTATUS_SPP | MSTATUS_SUM | MSTATUS_MXR;

/// Interrupt bits implemented in `mip`/`mie`.
pub const MIP_IMPLEMENTED: u32 = 0xAAA;
/// `mip` bits writable by software (supervisor software, timer, external).
pub const MIP_WRITABLE: u32 = 0x222;
/// `sip` bits writable by supervisor software.
pub const SIP_WRITABLE: u32 = 0x002;
/// Writable `mideleg` bits: only supervisor interrupts are delegable.
pub const MIDELEG_WRITABLE: u32 = 0x222;
/// Writable `medeleg` bits. `ECALL` from M-mode cannot be delegated.
pub const MEDELEG_WRITABLE: u32 = 0xB3FF;

/// `satp.MODE` bit: Sv32 when set, bare when clear.
pub const SATP_MODE_SV32: u32 = 1 << 31;
/// `satp.PPN` field.
pub const SATP_PPN_MASK: u32 = 0x003F_FFFF;

/// Vectored mode bit of `mtvec`/`stvec`.
pub const TVEC_VECTORED: u32 = 1;

/// `misa`: MXL=1 (RV32), extensions A, I, M, S, U.
pub const MISA_VALUE: u32 =
    (1 << 30) | (1 << 0) | (1 << 8) | (1 << 12) | (1 << 18) | (1 << 20);

/// CSR storage.
///
/// Fields hold the architectural values; `mip` holds only the software-writable
/// bits, the line-driven bits are merged in by the CPU when read.
#[derive(Clone, Debug, Default)]
pub struct Csrs {
    /// Machine status register.
    pub mstatus: u32,
    /// Machine exception delegation.
    pub medeleg: u32,
    /// Machine interrupt delegation.
    pub mideleg: u32,
    /// Machine interrupt enable.
    pub mie: u32,
    /// Machine trap vector.
    pub mtvec: u32,
    /// Machine counter enable.
    pub mcounteren: u32,
    /// Machine scratch.
    pub mscratch: u32,
    /// Machine exception PC.
    pub mepc: u32,
    /// Machine trap cause.
    pub mcause: u32,
    /// Machine trap value.
    pub mtval: u32,
    /// Software-writable pending bits (SSIP, STIP, SEIP).
    pub mip: u32,
    /// Supervisor trap vector.
    pub stvec: u32,
    /// Supervisor counter enable.
    pub scounteren: u32,
    /// Supervisor scratch.
    pub sscratch: u32,
    /// Supervisor exception PC.
    pub sepc: u32,
    /// Supervisor trap cause.
    pub scause: u32,
    /// Supervisor trap value.
    pub stval: u32,
    /// Address translation and protection.
    pub satp: u32,
    /// Cycle counter.
    pub mcycle: u64,
    /// Retired-instruction counter.
    pub minstret: u64,
    /// External interrupt mask.
    pub irq_mask: u32,
    /// External interrupt lines, latched one cycle.
    pub irq_pending: u32,
}

impl Csrs {
    /// Creates the reset state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if Sv32 translation is selected.
    pub const fn paging_enabled(&self) -> bool {
        self.satp & SATP_MODE_SV32 != 0
    }

    /// Root page-table physical page number.
    pub const fn root_ppn(&self) -> u32 {
        self.satp & SATP_PPN_MASK
    }

    /// Returns true if `mstatus` has any of `bits` set.
    pub const fn status(&self, bits: u32) -> bool {
        self.mstatus & bits != 0
    }

    /// Reads a CSR with no privilege check.
    ///
    /// `mip`/`sip` return only the software-held bits here; line-driven bits are
    /// merged by the caller.
    ///
    /// # Returns
    ///
    /// `None` if the address is not implemented.
    pub const fn read(&self, addr: u16) -> Option<u32> {
        let val = match addr {
            MVENDORID | MARCHID | MIMPID | MHARTID => 0,
            MSTATUS => self.mstatus,
            MISA => MISA_VALUE,
            MEDELEG => self.medeleg,
            MIDELEG => self.mideleg,
            MIE => self.mie,
            MTVEC => self.mtvec,
            MCOUNTEREN => self.mcounteren,
            MSCRATCH => self.mscratch,
            MEPC => self.mepc,
            MCAUSE => self.mcause,
            MTVAL => self.mtval,
            MIP => self.mip,
            SSTATUS => self.mstatus & SSTATUS_MASK,
            SIE => self.mie & self.mideleg,
            STVEC => self.stvec,
            SCOUNTEREN => self.scounteren,
            SSCRATCH => self.sscratch,
            SEPC => self.sepc,
            SCAUSE => self.scause,
            STVAL => self.stval,
            SIP => self.mip & self.mideleg,
            SATP => self.satp,
            MCYCLE | CYCLE => self.mcycle as u32,
            MCYCLEH | CYCLEH => (self.mcycle >> 32) as u32,
            MINSTRET | INSTRET => self.minstret as u32,
            MINSTRETH | INSTRETH => (self.minstret >> 32) as u32,
            IRQ_MASK => self.irq_mask,
            IRQ_PENDING => self.irq_pending,
            _ => return None,
        };
        Some(val)
    }

    /// Writes a CSR with no privilege check, applying WARL masks.
    ///
    /// Writes to read-only or unknown addresses are ignored; callers reject
    /// them before they get here.
    pub fn write(&mut self, addr: u16, val: u32) {
        match addr {
            MSTATUS => self.mstatus = legal_mpp(val & MSTATUS_WRITE_MASK),
            MEDELEG => self.medeleg = val & MEDELEG_WRITABLE,
            MIDELEG => self.mideleg = val & MIDELEG_WRITABLE,
            MIE => self.mie = val & MIP_IMPLEMENTED,
            MTVEC => self.mtvec = val & !0b10,
            MCOUNTEREN => self.mcounteren = val & 0b101,
            MSCRATCH => self.mscratch = val,
            MEPC => self.mepc = val & !3,
            MCAUSE => self.mcause = val,
            MTVAL => self.mtval = val,
            MIP => self.mip = val & MIP_WRITABLE,
            SSTATUS => self.mstatus = (self.mstatus & !SSTATUS_MASK) | (val & SSTATUS_MASK),
            SIE => self.mie = (self.mie & !self.mideleg) | (val & self.mideleg),
            STVEC => self.stvec = val & !0b10,
            SCOUNTEREN => self.scounteren = val & 0b101,
            SSCRATCH => self.sscratch = val,
            SEPC => self.sepc = val & !3,
            SCAUSE => self.scause = val,
            STVAL => self.stval = val,
            SIP => {
                let mask = SIP_WRITABLE & self.mideleg;
                self.mip = (self.mip & !mask) | (val & mask);
            }
            SATP => self.satp = val & (SATP_MODE_SV32 | SATP_PPN_MASK),
            MCYCLE => self.mcycle = (self.mcycle & !0xFFFF_FFFF) | u64::from(val),
            MCYCLEH => self.mcycle = (self.mcycle & 0xFFFF_FFFF) | (u64::from(val) << 32),
            MINSTRET => self.minstret = (self.minstret & !0xFFFF_FFFF) | u64::from(val),
            MINSTRETH => self.minstret = (self.minstret & 0xFFFF_FFFF) | (u64::from(val) << 32),
            IRQ_MASK => self.irq_mask = val,
            _ => {}
        }
    }
}

/// `MPP` is WARL over {U, S, M}; the reserved encoding becomes U.
const fn legal_mpp(status: u32) -> u32 {
    if (status & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT == 2 {
        status & !MSTATUS_MPP
    } else {
        status
    }
}

/// Returns true for CSRs in the read-only range (`addr[11:10] == 0b11`).
pub const fn is_read_only(addr: u16) -> bool {
    (addr >> 10) & 3 == 3
}

/// Lowest privilege allowed to access a CSR (`addr[9:8]`).
pub const fn required_privilege(addr: u16) -> u32 {
    ((addr >> 8) & 3) as u32
}
