//! Memory Bus Tests.
//!
//! Routing of RAM, the IO window and error regions, and the timing contract:
//! a command accepted at cycle N answers at N + latency, one beat per cycle,
//! and a port refuses new work while a transaction is in flight.

use pretty_assertions::assert_eq;
use vexsim_core::config::{MemoryConfig, Region};
use vexsim_core::soc::{Bus, BusCommand, BusPort, BusResponse, MemoryBus};

// ══════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════

const RAM: u32 = 0x4000_0000;
const IO: u32 = 0xE000_0000;

fn bus_with_latency(latency: u64) -> MemoryBus {
    MemoryBus::new(&MemoryConfig {
        latency,
        error_regions: vec![Region {
            base: 0x4010_0000,
            size: 0x100,
        }],
        ..MemoryConfig::default()
    })
}

/// Ticks until a beat shows up, returning it and the cycles waited.
fn wait(bus: &mut MemoryBus, port: BusPort) -> (BusResponse, u64) {
    for waited in 0..100 {
        if let Some(rsp) = bus.response(port) {
            return (rsp, waited);
        }
        bus.tick();
    }
    panic!("no response on {port:?}");
}

// ══════════════════════════════════════════════════════════
// 1. Untimed access
// ══════════════════════════════════════════════════════════

#[test]
fn ram_roundtrip_with_mask() {
    let mut bus = bus_with_latency(2);
    assert!(bus.write_word(RAM + 8, 0x1122_3344, 0b1111));
    assert!(bus.write_word(RAM + 8, 0xAA00_0000, 0b1000));
    assert_eq!(bus.read_word(RAM + 8), Some(0xAA22_3344));
}

#[test]
fn io_window_is_backed_by_scratch() {
    let mut bus = bus_with_latency(2);
    assert!(bus.write_word(IO + 4, 0xCAFE, 0b1111));
    assert_eq!(bus.read_word(IO + 4), Some(0xCAFE));
    assert_eq!(bus.read_word(IO + 0x10_0000), Some(0), "beyond the scratch reads zero");
}

#[test]
fn io_write_past_scratch_is_absorbed() {
    let mut bus = bus_with_latency(2);
    assert!(bus.write_word(IO + 0x10_0000, 0xDEAD_BEEF, 0b1111));
    assert_eq!(bus.read_word(IO + 0x10_0000), Some(0));
    assert_eq!(bus.read_word(IO + 0xFFC), Some(0), "the scratch is untouched");
}

#[test]
fn unmapped_and_error_addresses_fail() {
    let mut bus = bus_with_latency(2);
    assert_eq!(bus.read_word(0x1000), None);
    assert_eq!(bus.read_word(0x4010_0010), None);
    assert!(!bus.write_word(0x4010_0010, 1, 0b1111));
}

#[test]
fn load_bytes_rejects_overflow() {
    let mut bus = bus_with_latency(2);
    assert!(bus.load_bytes(RAM, &[1, 2, 3, 4]));
    assert_eq!(bus.read_word(RAM), Some(0x0403_0201));
    assert!(!bus.load_bytes(RAM + 4 * 1024 * 1024 - 2, &[0; 4]));
}

// ══════════════════════════════════════════════════════════
// 2. Timing
// ══════════════════════════════════════════════════════════

#[test]
fn read_answers_after_latency() {
    for latency in [1, 2, 5] {
        let mut bus = bus_with_latency(latency);
        assert!(bus.write_word(RAM, 77, 0b1111));
        assert!(bus.issue(BusPort::Data, BusCommand::read(RAM, 1)));
        let (rsp, waited) = wait(&mut bus, BusPort::Data);
        assert_eq!(waited, latency);
        assert_eq!(rsp, BusResponse { data: 77, error: false });
        assert!(bus.is_idle());
    }
}

#[test]
fn burst_delivers_one_beat_per_cycle() {
    let mut bus = bus_with_latency(2);
    for i in 0..4 {
        assert!(bus.write_word(RAM + 4 * i, i + 10, 0b1111));
    }
    assert!(bus.issue(BusPort::Instruction, BusCommand::read(RAM, 4)));
    let (first, _) = wait(&mut bus, BusPort::Instruction);
    assert_eq!(first.data, 10);
    assert_eq!(bus.response(BusPort::Instruction), None, "only one beat per cycle");
    for expected in 11..14 {
        bus.tick();
        assert_eq!(bus.response(BusPort::Instruction).map(|r| r.data), Some(expected));
    }
}

#[test]
fn busy_port_refuses_commands() {
    let mut bus = bus_with_latency(3);
    assert!(bus.issue(BusPort::Data, BusCommand::read(RAM, 2)));
    assert!(!bus.issue(BusPort::Data, BusCommand::read(RAM, 1)));
    assert!(bus.issue(BusPort::Instruction, BusCommand::read(RAM, 1)), "ports are independent");
    assert_eq!(bus.commands, [1, 1]);
}

#[test]
fn write_applies_at_issue_and_acks_once() {
    let mut bus = bus_with_latency(2);
    assert!(bus.issue(BusPort::Data, BusCommand::write(RAM + 3, 0x5500_0000, 0b1000)));
    assert_eq!(bus.read_word(RAM), Some(0x5500_0000));
    let (ack, waited) = wait(&mut bus, BusPort::Data);
    assert_eq!(waited, 2);
    assert!(!ack.error);
    bus.tick();
    assert_eq!(bus.response(BusPort::Data), None);
}

#[test]
fn error_region_beats_carry_error_flag() {
    let mut bus = bus_with_latency(1);
    assert!(bus.issue(BusPort::Data, BusCommand::read(0x4010_0000 - 8, 4)));
    let mut errors = Vec::new();
    for _ in 0..4 {
        let (rsp, _) = wait(&mut bus, BusPort::Data);
        errors.push(rsp.error);
        bus.tick();
    }
    assert_eq!(errors, vec![false, false, true, true]);
}

#[test]
fn zero_latency_is_raised_to_one() {
    let mut bus = bus_with_latency(0);
    assert!(bus.issue(BusPort::Data, BusCommand::read(RAM, 1)));
    assert_eq!(bus.response(BusPort::Data), None);
    bus.tick();
    assert!(bus.response(BusPort::Data).is_some());
}
