//! Session clock advanced by the 1 Hz ticker.
//!
//! The clock never reads wall time itself; it moves only when `on_tick` is
//! called, so tests drive it deterministically and a cancelled ticker
//! freezes it exactly where it stopped.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockMode {
    /// Counts down from `seconds` to zero; expiry forces the session to end.
    CountDown { seconds: u64 },
    /// Counts up without bound; stopped only by natural completion.
    CountUp,
}

#[derive(Debug)]
pub struct Clock {
    mode: ClockMode,
    ticks: u64,
    running: bool,
}

impl Clock {
    pub fn new(mode: ClockMode) -> Self {
        Self {
            mode,
            ticks: 0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Latches the clock off. A stopped clock ignores further ticks.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance one second. Returns true exactly once, on the tick where a
    /// countdown reaches zero; the clock stops itself at that point.
    pub fn on_tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.ticks += 1;
        match self.mode {
            ClockMode::CountDown { seconds } => {
                if self.ticks >= seconds {
                    self.running = false;
                    true
                } else {
                    false
                }
            }
            ClockMode::CountUp => false,
        }
    }

    /// Remaining whole seconds in countdown mode, clamped at zero.
    pub fn remaining_secs(&self) -> Option<u64> {
        match self.mode {
            ClockMode::CountDown { seconds } => Some(seconds.saturating_sub(self.ticks)),
            ClockMode::CountUp => None,
        }
    }

    /// Elapsed whole seconds: configured duration minus remaining time in
    /// countdown mode, the raw tick count in count-up mode.
    pub fn elapsed_secs(&self) -> u64 {
        match self.mode {
            ClockMode::CountDown { seconds } => self.ticks.min(seconds),
            ClockMode::CountUp => self.ticks,
        }
    }
}
