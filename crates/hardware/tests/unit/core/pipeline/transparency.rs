//! Pipeline Transparency Tests.
//!
//! Random straight-line programs with forward branches run on the pipelined
//! core and on the sequential reference interpreter. Stalls, forwarding,
//! cache misses, redo and misprediction recovery must leave no visible trace:
//! final registers and memory have to match exactly.

use proptest::prelude::*;
use vexsim_core::config::{BranchPredictor, Config};

use crate::common::builder::instruction::*;
use crate::common::harness::{DATA_BASE, PROGRAM_BASE, TestContext};
use crate::common::reference::Reference;

// ══════════════════════════════════════════════════════════
// Program generation
// ══════════════════════════════════════════════════════════

/// Register holding `DATA_BASE`; never a destination.
const BASE_REG: u32 = 10;
const DATA_WORDS: usize = 16;

type RType = fn(u32, u32, u32) -> u32;
type IType = fn(u32, u32, i32) -> u32;
type Shift = fn(u32, u32, u32) -> u32;

const R_OPS: [RType; 10] = [add, sub, sll, slt, sltu, xor, srl, sra, or, and];
const I_OPS: [IType; 6] = [addi, slti, sltiu, xori, ori, andi];
const SHIFT_OPS: [Shift; 3] = [slli, srli, srai];
const M_OPS: [RType; 8] = [mul, mulh, mulhsu, mulhu, div, divu, rem, remu];
const BRANCH_OPS: [IType; 6] = [beq, bne, blt, bge, bltu, bgeu];
const AMO_OPS: [RType; 3] = [amoadd_w, amoswap_w, amomax_w];

fn dst() -> impl Strategy<Value = u32> {
    1u32..BASE_REG
}

fn src() -> impl Strategy<Value = u32> {
    0u32..=BASE_REG
}

fn compute() -> impl Strategy<Value = u32> {
    prop_oneof![
        4 => (0..R_OPS.len(), dst(), src(), src()).prop_map(|(k, d, a, b)| R_OPS[k](d, a, b)),
        4 => (0..I_OPS.len(), dst(), src(), -2048i32..2048).prop_map(|(k, d, a, imm)| I_OPS[k](d, a, imm)),
        2 => (0..SHIFT_OPS.len(), dst(), src(), 0u32..32).prop_map(|(k, d, a, sh)| SHIFT_OPS[k](d, a, sh)),
        1 => (dst(), any::<u32>()).prop_map(|(d, imm)| lui(d, imm)),
        1 => (dst(), 0u32..16).prop_map(|(d, imm)| auipc(d, imm << 12)),
        2 => (0..M_OPS.len(), dst(), src(), src()).prop_map(|(k, d, a, b)| M_OPS[k](d, a, b)),
        2 => (0..BRANCH_OPS.len(), src(), src(), 2i32..4)
            .prop_map(|(k, a, b, skip)| BRANCH_OPS[k](a, b, 4 * skip)),
        1 => (2i32..4).prop_map(|skip| jal(0, 4 * skip)),
    ]
}

fn memory() -> impl Strategy<Value = u32> {
    prop_oneof![
        2 => (dst(), 0i32..DATA_WORDS as i32).prop_map(|(d, w)| lw(d, BASE_REG, 4 * w)),
        1 => (dst(), 0i32..2 * DATA_WORDS as i32, any::<bool>())
            .prop_map(|(d, h, u)| if u { lhu(d, BASE_REG, 2 * h) } else { lh(d, BASE_REG, 2 * h) }),
        1 => (dst(), 0i32..4 * DATA_WORDS as i32, any::<bool>())
            .prop_map(|(d, b, u)| if u { lbu(d, BASE_REG, b) } else { lb(d, BASE_REG, b) }),
        2 => (src(), 0i32..DATA_WORDS as i32).prop_map(|(s, w)| sw(s, BASE_REG, 4 * w)),
        1 => (src(), 0i32..2 * DATA_WORDS as i32).prop_map(|(s, h)| sh(s, BASE_REG, 2 * h)),
        1 => (src(), 0i32..4 * DATA_WORDS as i32).prop_map(|(s, b)| sb(s, BASE_REG, b)),
        1 => (0..AMO_OPS.len(), dst(), src()).prop_map(|(k, d, s)| AMO_OPS[k](d, BASE_REG, s)),
        1 => dst().prop_map(|d| lr_w(d, BASE_REG)),
        1 => (dst(), src()).prop_map(|(d, s)| sc_w(d, BASE_REG, s)),
    ]
}

fn instruction() -> impl Strategy<Value = u32> {
    prop_oneof![3 => compute(), 2 => memory()]
}

/// Register initialisation followed by the random body. Three trailing
/// `nop`s keep every forward branch target inside the program.
fn program(inits: &[u32], body: &[u32]) -> Vec<u32> {
    let mut prog = Vec::new();
    for (i, &value) in inits.iter().enumerate() {
        prog.extend(li(i as u32 + 1, value));
    }
    prog.extend(li(BASE_REG, DATA_BASE));
    prog.extend_from_slice(body);
    prog.extend([nop(), nop(), nop()]);
    prog
}

// ══════════════════════════════════════════════════════════
// Comparison
// ══════════════════════════════════════════════════════════

fn check(config: &Config, inits: &[u32], body: &[u32], data: &[u32]) -> Result<(), TestCaseError> {
    let prog = program(inits, body);

    let mut ctx = TestContext::with_config(config);
    ctx.load_at(DATA_BASE, data);
    ctx.load_program(&prog);
    let end = ctx.end_pc();
    ctx.run_to_end();

    let mut reference = Reference::new(PROGRAM_BASE, 0x2_0000);
    reference.load_words(PROGRAM_BASE, &prog);
    reference.load_words(DATA_BASE, data);
    let mut steps = 0;
    while reference.pc != end {
        prop_assert!(reference.step().is_ok(), "reference stopped at {:#x}", reference.pc);
        steps += 1;
        prop_assert!(steps < 10_000, "reference did not terminate");
    }

    prop_assert_eq!(ctx.cpu().regs.snapshot(), reference.regs);
    for i in 0..DATA_WORDS as u32 {
        let addr = DATA_BASE + 4 * i;
        prop_assert_eq!(Some(ctx.mem_word(addr)), reference.read_word(addr), "word at {:#x} differs", addr);
    }
    Ok(())
}

fn static_config() -> Config {
    let mut config = Config::default();
    config.pipeline.branch_predictor = BranchPredictor::Static;
    config
}

fn slow_memory_config() -> Config {
    let mut config = Config::default();
    config.memory.latency = 5;
    config.cache.dcache.size_bytes = 64;
    config.cache.dcache.line_bytes = 16;
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn pipeline_matches_reference(
        inits in prop::collection::vec(any::<u32>(), 9),
        body in prop::collection::vec(instruction(), 1..40),
        data in prop::collection::vec(any::<u32>(), DATA_WORDS),
    ) {
        check(&Config::default(), &inits, &body, &data)?;
    }

    #[test]
    fn static_prediction_matches_reference(
        inits in prop::collection::vec(any::<u32>(), 9),
        body in prop::collection::vec(instruction(), 1..30),
        data in prop::collection::vec(any::<u32>(), DATA_WORDS),
    ) {
        check(&static_config(), &inits, &body, &data)?;
    }

    #[test]
    fn slow_memory_matches_reference(
        inits in prop::collection::vec(any::<u32>(), 9),
        body in prop::collection::vec(instruction(), 1..30),
        data in prop::collection::vec(any::<u32>(), DATA_WORDS),
    ) {
        check(&slow_memory_config(), &inits, &body, &data)?;
    }
}
