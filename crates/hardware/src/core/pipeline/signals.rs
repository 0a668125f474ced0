//! Micro-op definitions.
//!
//! Decode turns a raw instruction word into a [`MicroOp`], a tagged union that
//! carries exactly the fields its instruction class needs. It provides:
//! 1. **Operation Classification:** ALU, branch, memory, multiply, divide, CSR and system ops.
//! 2. **Memory Control:** Access widths and sign-extension requirements.
//! 3. **Scheduling Queries:** Which stage produces the result, and which ops serialise.

/// Integer ALU operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluOp {
    /// Addition.
    #[default]
    Add,
    /// Subtraction.
    Sub,
    /// Shift left logical.
    Sll,
    /// Set less than (signed).
    Slt,
    /// Set less than unsigned.
    Sltu,
    /// Bitwise XOR.
    Xor,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Bitwise OR.
    Or,
    /// Bitwise AND.
    And,
}

/// Second ALU operand source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The `rs2` register value.
    Reg,
    /// A sign-extended immediate.
    Imm(u32),
}

/// Conditional branch comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchCond {
    /// `BEQ`.
    Eq,
    /// `BNE`.
    Ne,
    /// `BLT`.
    Lt,
    /// `BGE`.
    Ge,
    /// `BLTU`.
    Ltu,
    /// `BGEU`.
    Geu,
}

/// Memory access width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemWidth {
    /// 8-bit access.
    Byte,
    /// 16-bit access.
    Half,
    /// 32-bit access.
    #[default]
    Word,
}

impl MemWidth {
    /// Access size in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }
}

/// Atomic memory operations (the A extension).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtomicOp {
    /// `LR.W`: load and set the reservation.
    Lr,
    /// `SC.W`: store if the reservation is held.
    Sc,
    /// `AMOSWAP.W`.
    Swap,
    /// `AMOADD.W`.
    Add,
    /// `AMOXOR.W`.
    Xor,
    /// `AMOAND.W`.
    And,
    /// `AMOOR.W`.
    Or,
    /// `AMOMIN.W`.
    Min,
    /// `AMOMAX.W`.
    Max,
    /// `AMOMINU.W`.
    Minu,
    /// `AMOMAXU.W`.
    Maxu,
}

/// Multiply variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MulOp {
    /// Low word of the product.
    Mul,
    /// High word, signed x signed.
    Mulh,
    /// High word, signed x unsigned.
    Mulhsu,
    /// High word, unsigned x unsigned.
    Mulhu,
}

/// Divide variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DivOp {
    /// Signed quotient.
    Div,
    /// Unsigned quotient.
    Divu,
    /// Signed remainder.
    Rem,
    /// Unsigned remainder.
    Remu,
}

/// CSR access operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsrOp {
    /// Read/write.
    Rw,
    /// Read and set bits.
    Rs,
    /// Read and clear bits.
    Rc,
}

/// Source of the CSR write operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsrSource {
    /// The `rs1` register value.
    Reg,
    /// The 5-bit zero-extended immediate in the `rs1` field.
    Imm(u32),
}

/// System instructions that are not CSR accesses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemOp {
    /// `ECALL`.
    Ecall,
    /// `EBREAK`.
    Ebreak,
    /// `MRET`.
    Mret,
    /// `SRET`.
    Sret,
    /// `WFI`.
    Wfi,
    /// `SFENCE.VMA`.
    SfenceVma,
    /// `FENCE.I`: flushes the instruction cache.
    FenceI,
    /// Custom MISC-MEM flush of the data cache.
    DcacheFlush,
}

/// A decoded instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MicroOp {
    /// No architectural effect (`FENCE`, or a trapping instruction).
    #[default]
    Nop,
    /// Register-register or register-immediate ALU operation.
    Alu {
        /// Operation.
        op: AluOp,
        /// Second operand.
        src2: Operand,
    },
    /// `LUI`.
    Lui {
        /// Upper immediate.
        imm: u32,
    },
    /// `AUIPC`.
    Auipc {
        /// Upper immediate.
        imm: u32,
    },
    /// `JAL`.
    Jal {
        /// PC-relative offset.
        offset: u32,
    },
    /// `JALR`.
    Jalr {
        /// Offset added to `rs1`.
        offset: u32,
    },
    /// Conditional branch.
    Branch {
        /// Comparison.
        cond: BranchCond,
        /// PC-relative offset.
        offset: u32,
    },
    /// Load.
    Load {
        /// Access width.
        width: MemWidth,
        /// Zero-extend instead of sign-extend.
        unsigned: bool,
        /// Offset added to `rs1`.
        offset: u32,
    },
    /// Store.
    Store {
        /// Access width.
        width: MemWidth,
        /// Offset added to `rs1`.
        offset: u32,
    },
    /// LR/SC or AMO. The address is `rs1` with no offset.
    Atomic {
        /// Operation.
        op: AtomicOp,
    },
    /// Multiply.
    Mul {
        /// Variant.
        op: MulOp,
    },
    /// Divide or remainder.
    Div {
        /// Variant.
        op: DivOp,
    },
    /// CSR access.
    Csr {
        /// Operation.
        op: CsrOp,
        /// CSR address.
        addr: u16,
        /// Write operand source.
        src: CsrSource,
    },
    /// Other system instruction.
    System(SystemOp),
}

impl MicroOp {
    /// True if the result is final at the end of execute and can be bypassed
    /// from the execute and memory stages.
    pub const fn result_in_execute(&self) -> bool {
        matches!(
            self,
            Self::Alu { .. } | Self::Lui { .. } | Self::Auipc { .. } | Self::Jal { .. } | Self::Jalr { .. }
        )
    }

    /// True for instructions that access data memory.
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Store { .. } | Self::Atomic { .. })
    }

    /// True for instructions that run entirely at write-back and then flush
    /// every younger instruction.
    pub const fn is_serializing(&self) -> bool {
        match self {
            Self::Csr { .. } => true,
            Self::System(op) => !matches!(op, SystemOp::Ecall | SystemOp::Ebreak),
            _ => false,
        }
    }

    /// True if the instruction may write `rd`.
    pub const fn writes_rd(&self) -> bool {
        !matches!(self, Self::Nop | Self::Branch { .. } | Self::Store { .. } | Self::System(_))
    }
}
