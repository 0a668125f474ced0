//! Load/Store Unit Tests.
//!
//! Lane placement for partial-word stores, extraction for partial-word loads,
//! and the AMO arithmetic.

use rstest::rstest;
use vexsim_core::core::pipeline::signals::{AtomicOp, MemWidth};
use vexsim_core::core::units::lsu::atomic::atomic_alu;
use vexsim_core::core::units::lsu::{
    byte_mask, expand_mask, extract_load, is_aligned, merge_word, store_lanes,
};

// ══════════════════════════════════════════════════════════
// 1. Alignment and masks
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x1000, MemWidth::Word, true)]
#[case(0x1002, MemWidth::Word, false)]
#[case(0x1002, MemWidth::Half, true)]
#[case(0x1003, MemWidth::Half, false)]
#[case(0x1003, MemWidth::Byte, true)]
fn alignment(#[case] addr: u32, #[case] width: MemWidth, #[case] aligned: bool) {
    assert_eq!(is_aligned(addr, width), aligned);
}

#[test]
fn byte_masks_follow_address() {
    assert_eq!(byte_mask(0x1001, MemWidth::Byte), 0b0010);
    assert_eq!(byte_mask(0x1000, MemWidth::Half), 0b0011);
    assert_eq!(expand_mask(0b0101), 0x00FF_00FF);
    assert_eq!(expand_mask(0), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Stores
// ══════════════════════════════════════════════════════════

#[test]
fn store_lanes_place_data() {
    assert_eq!(store_lanes(0x1002, MemWidth::Byte, 0x1234_56AB), 0x00AB_0000);
    assert_eq!(store_lanes(0x1002, MemWidth::Half, 0x1234_BEEF), 0xBEEF_0000);
    assert_eq!(store_lanes(0x1000, MemWidth::Word, 0xCAFE_F00D), 0xCAFE_F00D);
}

#[test]
fn merge_touches_only_enabled_bytes() {
    let old = 0x1122_3344;
    let data = store_lanes(0x1001, MemWidth::Byte, 0xAA);
    assert_eq!(merge_word(old, data, byte_mask(0x1001, MemWidth::Byte)), 0x1122_AA44);
}

// ══════════════════════════════════════════════════════════
// 3. Loads
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x1003, MemWidth::Byte, false, 0xFFFF_FF80)]
#[case(0x1003, MemWidth::Byte, true, 0x80)]
#[case(0x1002, MemWidth::Half, false, 0xFFFF_8070)]
#[case(0x1002, MemWidth::Half, true, 0x8070)]
#[case(0x1000, MemWidth::Half, false, 0x6050)]
#[case(0x1000, MemWidth::Word, false, 0x8070_6050)]
fn extract_extends(
    #[case] addr: u32,
    #[case] width: MemWidth,
    #[case] unsigned: bool,
    #[case] expected: u32,
) {
    assert_eq!(extract_load(0x8070_6050, addr, width, unsigned), expected);
}

// ══════════════════════════════════════════════════════════
// 4. Atomics
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(AtomicOp::Swap, 5, 9, 9)]
#[case(AtomicOp::Add, u32::MAX, 2, 1)]
#[case(AtomicOp::Xor, 0b1100, 0b1010, 0b0110)]
#[case(AtomicOp::And, 0b1100, 0b1010, 0b1000)]
#[case(AtomicOp::Or, 0b1100, 0b1010, 0b1110)]
#[case(AtomicOp::Min, u32::MAX, 1, u32::MAX)]
#[case(AtomicOp::Max, u32::MAX, 1, 1)]
#[case(AtomicOp::Minu, u32::MAX, 1, 1)]
#[case(AtomicOp::Maxu, u32::MAX, 1, u32::MAX)]
fn amo_arithmetic(#[case] op: AtomicOp, #[case] mem: u32, #[case] reg: u32, #[case] expected: u32) {
    assert_eq!(atomic_alu(op, mem, reg), expected);
}
