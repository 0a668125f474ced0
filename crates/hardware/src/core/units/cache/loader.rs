//! Line loader.
//!
//! One burst fill at a time. The loader issues a single read burst covering a
//! whole line, accumulates the beats and hands the finished line back to the
//! cache, which installs it in one step. A beat with the error flag does not
//! abort the burst; it marks the finished line as erroneous.

use crate::soc::{BusCommand, BusResponse};

/// A line returned by a completed burst.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineFill {
    /// Line base address.
    pub base: u32,
    /// Line words in address order.
    pub words: Vec<u32>,
    /// Some beat reported an error.
    pub error: bool,
}

#[derive(Clone, Debug, Default)]
enum LoaderState {
    #[default]
    Idle,
    Loading {
        base: u32,
        issued: bool,
        words: Vec<u32>,
        error: bool,
    },
}

/// Burst fill state machine for one cache.
#[derive(Clone, Debug)]
pub struct LineLoader {
    state: LoaderState,
    burst_len: usize,
}

impl LineLoader {
    /// Creates an idle loader filling `burst_len` words per line.
    pub const fn new(burst_len: usize) -> Self {
        Self {
            state: LoaderState::Idle,
            burst_len,
        }
    }

    /// Returns true when no fill is in progress.
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, LoaderState::Idle)
    }

    /// Line base address of the fill in progress.
    pub const fn target(&self) -> Option<u32> {
        match &self.state {
            LoaderState::Idle => None,
            LoaderState::Loading { base, .. } => Some(*base),
        }
    }

    /// Begins a fill of the line at `base`. Ignored while a fill is running.
    pub fn start(&mut self, base: u32) {
        if self.is_idle() {
            self.state = LoaderState::Loading {
                base,
                issued: false,
                words: Vec::with_capacity(self.burst_len),
                error: false,
            };
        }
    }

    /// The burst command still waiting for bus acceptance.
    pub const fn pending_command(&self) -> Option<BusCommand> {
        match &self.state {
            LoaderState::Loading {
                base,
                issued: false,
                ..
            } => Some(BusCommand::read(*base, self.burst_len)),
            _ => None,
        }
    }

    /// Records that the bus accepted the burst command.
    pub fn command_accepted(&mut self) {
        if let LoaderState::Loading { issued, .. } = &mut self.state {
            *issued = true;
        }
    }

    /// Accepts one response beat.
    ///
    /// # Returns
    ///
    /// The completed line after the last beat; the loader is idle again.
    pub fn receive(&mut self, rsp: BusResponse) -> Option<LineFill> {
        let LoaderState::Loading {
            base,
            issued: true,
            words,
            error,
        } = &mut self.state
        else {
            return None;
        };
        words.push(rsp.data);
        *error |= rsp.error;
        if words.len() < self.burst_len {
            return None;
        }
        let fill = LineFill {
            base: *base,
            words: std::mem::take(words),
            error: *error,
        };
        self.state = LoaderState::Idle;
        Some(fill)
    }

    /// Abandons any fill. Only used at reset.
    pub fn reset(&mut self) {
        self.state = LoaderState::Idle;
    }
}
