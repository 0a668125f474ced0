//! Cache Fill Tests.
//!
//! A line becomes visible only once its whole burst has landed, a bus error
//! anywhere in the burst poisons the line, and write hits merge by byte.

use pretty_assertions::assert_eq;
use vexsim_core::config::CacheConfig;
use vexsim_core::core::units::cache::{Cache, CacheLookup};
use vexsim_core::soc::{BusCommand, BusResponse};

// ══════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════

/// 8 lines of 16 bytes.
fn small_cache() -> Cache {
    Cache::new(&CacheConfig {
        size_bytes: 128,
        line_bytes: 16,
    })
}

fn beat(data: u32) -> BusResponse {
    BusResponse { data, error: false }
}

fn fill(cache: &mut Cache, pa: u32, words: [u32; 4]) {
    assert!(cache.start_fill(pa));
    cache.command_accepted();
    for w in words {
        cache.receive(beat(w));
    }
}

// ══════════════════════════════════════════════════════════
// 1. Fill protocol
// ══════════════════════════════════════════════════════════

#[test]
fn empty_cache_misses() {
    let cache = small_cache();
    assert_eq!(cache.num_lines(), 8);
    assert_eq!(cache.lookup(0x4000_0000), CacheLookup::Miss);
}

#[test]
fn fill_issues_one_line_burst() {
    let mut cache = small_cache();
    assert!(cache.start_fill(0x4000_0024));
    assert_eq!(cache.bus_command(), Some(BusCommand::read(0x4000_0020, 4)));
    cache.command_accepted();
    assert_eq!(cache.bus_command(), None);
    assert!(cache.fill_in_flight(0x4000_002C));
    assert!(!cache.fill_in_flight(0x4000_0030));
}

#[test]
fn partial_fill_stays_invisible() {
    let mut cache = small_cache();
    assert!(cache.start_fill(0x4000_0000));
    cache.command_accepted();
    for w in [10, 11, 12] {
        cache.receive(beat(w));
        assert_eq!(cache.lookup(0x4000_0000), CacheLookup::Miss);
    }
    cache.receive(beat(13));
    assert_eq!(cache.lookup(0x4000_0000), CacheLookup::Hit(10));
    assert_eq!(cache.lookup(0x4000_000C), CacheLookup::Hit(13));
    assert_eq!(cache.fills, 1);
    assert!(cache.loader_idle());
}

#[test]
fn beats_before_acceptance_are_ignored() {
    let mut cache = small_cache();
    assert!(cache.start_fill(0x4000_0000));
    cache.receive(beat(99));
    cache.command_accepted();
    fill_remaining(&mut cache, [1, 2, 3, 4]);
    assert_eq!(cache.lookup(0x4000_0000), CacheLookup::Hit(1));
}

fn fill_remaining(cache: &mut Cache, words: [u32; 4]) {
    for w in words {
        cache.receive(beat(w));
    }
}

#[test]
fn only_one_fill_at_a_time() {
    let mut cache = small_cache();
    assert!(cache.start_fill(0x4000_0000));
    assert!(!cache.can_start_fill());
    assert!(!cache.start_fill(0x4000_0040));
    assert!(cache.fill_in_flight(0x4000_0000));
}

#[test]
fn error_beat_poisons_line() {
    let mut cache = small_cache();
    assert!(cache.start_fill(0x4000_0000));
    cache.command_accepted();
    cache.receive(beat(1));
    cache.receive(BusResponse { data: 0, error: true });
    cache.receive(beat(3));
    cache.receive(beat(4));
    assert_eq!(cache.lookup(0x4000_0000), CacheLookup::Error);
    assert_eq!(cache.lookup(0x4000_000C), CacheLookup::Error);
}

#[test]
fn conflicting_line_replaces_old_one() {
    let mut cache = small_cache();
    fill(&mut cache, 0x4000_0000, [1, 2, 3, 4]);
    fill(&mut cache, 0x4000_0080, [5, 6, 7, 8]);
    assert_eq!(cache.lookup(0x4000_0000), CacheLookup::Miss);
    assert_eq!(cache.lookup(0x4000_0084), CacheLookup::Hit(6));
}

// ══════════════════════════════════════════════════════════
// 2. Write hits
// ══════════════════════════════════════════════════════════

#[test]
fn write_hit_merges_bytes() {
    let mut cache = small_cache();
    fill(&mut cache, 0x4000_0000, [0x1122_3344, 0, 0, 0]);
    cache.write_hit(0x4000_0000, 0x00AA_0000, 0b0100);
    assert_eq!(cache.lookup(0x4000_0000), CacheLookup::Hit(0x11AA_3344));
}

#[test]
fn write_miss_allocates_nothing() {
    let mut cache = small_cache();
    cache.write_hit(0x4000_0000, 0xFFFF_FFFF, 0b1111);
    assert_eq!(cache.lookup(0x4000_0000), CacheLookup::Miss);
}
