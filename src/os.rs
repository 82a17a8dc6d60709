//! Millisecond time keeping shared by the control loops.
//!
//! Timestamps are free running `u32` millisecond counters that wrap after
//! about 49.7 days. Deadlines are always compared by subtracting first, so
//! a wrap between start and now does not stall anything.

/// Monotonic millisecond source
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Milliseconds from `since` to `now`, correct across one counter wrap
#[inline]
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// `true` once at least `duration` ms have passed since `since`
#[inline]
pub const fn has_elapsed(now: u32, since: u32, duration: u32) -> bool {
    elapsed_ms(now, since) >= duration
}

/// Tick counter advanced from a periodic interrupt.
///
/// Only the tick handler writes; readers copy the value out. On AVR the
/// counter is wider than the native atomic width, so the hardware wrapper
/// keeps it behind an interrupt mutex instead (see `hal::timer`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter {
    ticks: u32,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self { ticks: 0 }
    }

    #[inline]
    pub fn tick(&mut self, step: u32) {
        self.ticks = self.ticks.wrapping_add(step);
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_wraparound() {
        let start = u32::MAX - 499;
        let now = 1500;
        assert_eq!(elapsed_ms(now, start), 2000);
        assert!(has_elapsed(now, start, 2000));
        assert!(!has_elapsed(now - 1, start, 2000));
    }

    #[test]
    fn exact_deadline_counts_as_elapsed() {
        assert!(has_elapsed(3000, 1000, 2000));
        assert!(!has_elapsed(2999, 1000, 2000));
    }

    #[test]
    fn tick_counter_wraps() {
        let mut counter = TickCounter::new();
        counter.tick(u32::MAX);
        counter.tick(2);
        assert_eq!(counter.get(), 1);
    }
}
