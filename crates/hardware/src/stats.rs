//! Simulation statistics.
//!
//! This module tracks the counters the core updates as it runs. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions and the derived CPI.
//! 2. **Stalls:** Cycles lost per cause, redo flushes and pipeline flushes.
//! 3. **Branch prediction:** Predicted branches and mispredictions.
//! 4. **Memory hierarchy:** Cache hits, misses and fills, TLB hits, misses and walks.
//! 5. **Traps:** Exceptions and interrupts taken.
//!
//! `SimStats` serialises with `serde` for machine-readable reports.

use std::fmt;

use serde::Serialize;

/// Why a stage stalled this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallCause {
    /// Fetch waited for the instruction cache or the ITLB.
    Fetch,
    /// Decode waited for an operand.
    Hazard,
    /// Memory waited for the data cache, the DTLB or the bus.
    Memory,
    /// Memory waited for the divider.
    Divide,
    /// Decode held while an interrupt drains the pipeline.
    Interrupt,
}

/// Performance counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Cycles simulated.
    pub cycles: u64,
    /// Instructions retired without a trap, excluding injected ones.
    pub instructions_retired: u64,

    /// Cycles fetch was stalled on a miss.
    pub stalls_fetch: u64,
    /// Cycles decode was stalled on a data hazard.
    pub stalls_hazard: u64,
    /// Cycles memory was stalled on the cache, TLB or bus.
    pub stalls_memory: u64,
    /// Cycles memory was stalled on the divider.
    pub stalls_divide: u64,
    /// Cycles decode was held for interrupt entry.
    pub stalls_interrupt: u64,
    /// Redo flushes from the memory stage.
    pub redo_count: u64,
    /// Pipeline redirects of any kind.
    pub flushes: u64,

    /// Conditional branches resolved in execute.
    pub branch_predictions: u64,
    /// Redirects from execute because the predicted next PC was wrong.
    pub branch_mispredictions: u64,

    /// Instruction cache hits.
    pub icache_hits: u64,
    /// Instruction cache misses.
    pub icache_misses: u64,
    /// Instruction cache lines filled.
    pub icache_fills: u64,
    /// Data cache hits.
    pub dcache_hits: u64,
    /// Data cache misses.
    pub dcache_misses: u64,
    /// Data cache lines filled.
    pub dcache_fills: u64,

    /// TLB hits across both ports.
    pub tlb_hits: u64,
    /// TLB misses across both ports.
    pub tlb_misses: u64,
    /// Page-table walks started.
    pub walks: u64,

    /// Exceptions taken.
    pub traps_taken: u64,
    /// Interrupts taken.
    pub interrupts_taken: u64,
}

/// Section names accepted by [`SimStats::render_sections`].
pub const STATS_SECTIONS: &[&str] = &["summary", "stalls", "branch", "memory", "traps"];

impl SimStats {
    /// Counts one stall cycle.
    pub fn record_stall(&mut self, cause: StallCause) {
        let counter = match cause {
            StallCause::Fetch => &mut self.stalls_fetch,
            StallCause::Hazard => &mut self.stalls_hazard,
            StallCause::Memory => &mut self.stalls_memory,
            StallCause::Divide => &mut self.stalls_divide,
            StallCause::Interrupt => &mut self.stalls_interrupt,
        };
        *counter += 1;
    }

    /// Cycles per retired instruction, or 0 before the first retire.
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Renders the requested sections; an empty slice renders all of them.
    pub fn render_sections(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let pct = |part: u64, total: u64| {
            if total == 0 { 0.0 } else { 100.0 * part as f64 / total as f64 }
        };
        let cyc = self.cycles;
        let mut out = String::new();
        let mut line = |s: String| {
            out.push_str(&s);
            out.push('\n');
        };

        line("==========================================================".into());
        if want("summary") {
            line(format!("sim_cycles               {cyc}"));
            line(format!("sim_insts                {}", self.instructions_retired));
            line(format!("sim_cpi                  {:.4}", self.cpi()));
            line("----------------------------------------------------------".into());
        }
        if want("stalls") {
            line("STALLS".into());
            line(format!("  stalls.fetch           {} ({:.2}%)", self.stalls_fetch, pct(self.stalls_fetch, cyc)));
            line(format!("  stalls.hazard          {} ({:.2}%)", self.stalls_hazard, pct(self.stalls_hazard, cyc)));
            line(format!("  stalls.memory          {} ({:.2}%)", self.stalls_memory, pct(self.stalls_memory, cyc)));
            line(format!("  stalls.divide          {} ({:.2}%)", self.stalls_divide, pct(self.stalls_divide, cyc)));
            line(format!("  stalls.interrupt       {}", self.stalls_interrupt));
            line(format!("  redo                   {}", self.redo_count));
            line(format!("  flushes                {}", self.flushes));
            line("----------------------------------------------------------".into());
        }
        if want("branch") {
            let total = self.branch_predictions;
            let miss = self.branch_mispredictions;
            line("BRANCH PREDICTION".into());
            line(format!("  bp.lookups             {total}"));
            line(format!("  bp.mispredicts         {miss}"));
            line(format!("  bp.accuracy            {:.2}%", 100.0 - pct(miss, total)));
            line("----------------------------------------------------------".into());
        }
        if want("memory") {
            let mut cache = |name: &str, hits: u64, misses: u64, fills: u64| {
                line(format!(
                    "  {:<6} accesses: {:<10} | hits: {:<10} | fills: {:<8} | miss_rate: {:.2}%",
                    name,
                    hits + misses,
                    hits,
                    fills,
                    pct(misses, hits + misses)
                ));
            };
            cache("L1-I", self.icache_hits, self.icache_misses, self.icache_fills);
            cache("L1-D", self.dcache_hits, self.dcache_misses, self.dcache_fills);
            cache("TLB", self.tlb_hits, self.tlb_misses, self.walks);
            line("----------------------------------------------------------".into());
        }
        if want("traps") {
            line(format!("traps.exceptions         {}", self.traps_taken));
            line(format!("traps.interrupts         {}", self.interrupts_taken));
        }
        line("==========================================================".into());
        out
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_sections(&[]))
    }
}
